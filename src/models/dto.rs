//pour les requêtes et réponses structurées
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::two_factor_codes::CodePurpose;

// Requête POST /api/2fa/issue-code
#[derive(Debug, Deserialize, Validate)]
pub struct IssueCodeRequest {
    #[validate(email)]
    pub email: String,
    pub purpose: CodePurpose,
}

// Requête POST /api/2fa/verify-code
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyCodeRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(equal = 6))]
    pub code: String,
}

// Requête POST /api/forecast
// horizon explicite OU period ('Days'|'Weeks'|'Seasons'|'Occasions')
#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub ticker: String,
    pub period: Option<String>,
    pub horizon: Option<usize>,
}

// 1 point de prévision : {time, predicted_price}
#[derive(Debug, Serialize)]
pub struct ForecastPoint {
    pub time: String,
    pub predicted_price: f64,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub ticker: String,
    pub current_price: f64,
    pub forecast_data: Vec<ForecastPoint>,
}

// Requête POST /api/contact
#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub subject: String,
    pub message_type: String,
    #[validate(length(min = 1))]
    pub message: String,
}

// Réponse quote GET /api/stocks/{ticker}
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub ticker: String,
    pub current_price: f64,
    pub percent_change: f64,
}
