use actix_web::{post, web, HttpResponse};
use chrono::{Days, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::models::dto::{ForecastPoint, ForecastRequest, ForecastResponse};
use crate::services::forecast_service::ForecastService;
use crate::services::market_data::{round_price, TwelveDataClient};

/// POST /api/forecast - Prévision heuristique de prix (PUBLIC)
#[post("/forecast")]
pub async fn forecast(
    body: web::Json<ForecastRequest>,
    market_data: web::Data<TwelveDataClient>,
) -> HttpResponse {
    println!("📈 Generating forecast for {} (period: {:?})", body.ticker, body.period);

    // 1. Horizon : explicite ou déduit de la période sélectionnée
    let horizon = body
        .horizon
        .unwrap_or_else(|| period_to_horizon(body.period.as_deref()));

    // 2. Historique des clôtures (du plus récent au plus ancien)
    let closes = match market_data.daily_closes(&body.ticker).await {
        Ok(closes) => closes,
        Err(e) => {
            eprintln!("❌ Error fetching history for {}: {}", body.ticker, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }));
        }
    };
    let current_price = closes[0];

    // 3. Génération (aléa depuis l'entropie en production)
    let mut rng = StdRng::from_entropy();
    let predictions = match ForecastService::forecast(&closes, horizon, &mut rng) {
        Ok(predictions) => predictions,
        // Entrée invalide : rien de partiel n'est retourné
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": e.to_string()
            }));
        }
    };

    // 4. Un point par jour futur : {time, predicted_price}
    let today = Utc::now().date_naive();
    let forecast_data: Vec<ForecastPoint> = predictions
        .iter()
        .enumerate()
        .map(|(i, predicted)| ForecastPoint {
            time: today
                .checked_add_days(Days::new(i as u64 + 1))
                .map(|d| d.to_string())
                .unwrap_or_default(),
            predicted_price: round_price(*predicted),
        })
        .collect();

    HttpResponse::Ok().json(ForecastResponse {
        ticker: body.ticker.to_uppercase(),
        current_price: round_price(current_price),
        forecast_data,
    })
}

/// Mapping période -> nombre de jours prédits (défaut: 7)
fn period_to_horizon(period: Option<&str>) -> usize {
    match period {
        Some("Days") => 7,
        Some("Weeks") => 28,    // 4 semaines
        Some("Seasons") => 90,  // ~3 mois
        Some("Occasions") => 180, // ~6 mois
        _ => 7,
    }
}
