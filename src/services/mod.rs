pub mod mailer;
pub mod market_data;
pub mod two_factor_service;
pub mod forecast_service;
