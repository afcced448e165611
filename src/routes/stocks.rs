use actix_web::{get, web, HttpResponse};

use crate::models::dto::QuoteResponse;
use crate::services::market_data::{round_price, MarketDataError, TwelveDataClient};

/// GET /api/stocks/{ticker} - Dernier cours + variation vs clôture précédente
#[get("/{ticker}")]
pub async fn get_quote(
    path: web::Path<String>,
    market_data: web::Data<TwelveDataClient>,
) -> HttpResponse {
    let ticker = path.into_inner();

    match market_data.daily_closes(&ticker).await {
        Ok(closes) => {
            // closes[0] = clôture la plus récente
            let current_price = closes[0];
            let previous_close = if closes.len() > 1 { closes[1] } else { current_price };
            let percent_change = if previous_close != 0.0 {
                (current_price - previous_close) / previous_close * 100.0
            } else {
                0.0
            };

            HttpResponse::Ok().json(QuoteResponse {
                ticker: ticker.to_uppercase(),
                current_price: round_price(current_price),
                percent_change: round_price(percent_change),
            })
        }
        Err(MarketDataError::NoData) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Stock {} not found", ticker)
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": e.to_string()
        })),
    }
}

pub fn stocks_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stocks")
            .service(get_quote)
    );
}
