pub mod health;
pub mod auth;
pub mod two_factor;
pub mod forecast;
pub mod stocks;
pub mod contact;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .service(forecast::forecast)
            .service(contact::submit_contact)
            .configure(auth::auth_routes)
            .configure(two_factor::two_factor_routes)
            .configure(stocks::stocks_routes)
    );
}
