mod models;
mod routes;
mod db;
mod config;
mod services;
mod utils;
mod middleware;
use actix_web::{App, HttpServer, web};
use std::sync::Arc;

use crate::services::mailer::{EmailSender, ResendMailer};
use crate::services::market_data::TwelveDataClient;
use crate::services::two_factor_service::{SeaOrmTwoFactorStore, TwoFactorService};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    // Config chargée UNE SEULE FOIS au démarrage : secret manquant = erreur fatale
    let config = config::Config::from_env().expect("Invalid configuration");

    println!("🔌 Connecting to database...");
    let db = db::establish_connection(&config.database_url)
        .await
        .expect("Failed to connect to database");
    println!("✅ Database connected!");

    let mailer: Arc<dyn EmailSender> = Arc::new(ResendMailer::new(
        config.resend_api_key.clone(),
        config.from_email.clone(),
    ));
    let two_factor = TwoFactorService::new(
        Arc::new(SeaOrmTwoFactorStore::new(db.clone())),
        mailer.clone(),
    );
    let market_data = TwelveDataClient::new(config.twelve_data_api_key.clone());

    println!("🚀 Starting server on http://127.0.0.1:8080");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(two_factor.clone()))
            .app_data(web::Data::new(market_data.clone()))
            .app_data(web::Data::new(mailer.clone()))
            .configure(routes::configure_routes)
    })
        .bind(("127.0.0.1", 8080))?
        .run()
        .await
}
