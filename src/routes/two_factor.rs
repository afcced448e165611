use actix_web::{post, web, HttpResponse};
use validator::Validate;

use crate::models::dto::{IssueCodeRequest, VerifyCodeRequest};
use crate::services::two_factor_service::TwoFactorService;

/// POST /api/2fa/issue-code - Génère et envoie un code 2FA (PUBLIC)
#[post("/issue-code")]
pub async fn issue_code(
    body: web::Json<IssueCodeRequest>,
    service: web::Data<TwoFactorService>,
) -> HttpResponse {
    // 1. Valider le format de l'email
    if body.validate().is_err() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Invalid email address"
        }));
    }

    // 2. Émettre le code (stockage + envoi email)
    match service.issue_code(&body.email, body.purpose).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "2FA code sent successfully"
        })),
        Err(e) => {
            eprintln!("❌ Error in issue-code: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// POST /api/2fa/verify-code - Vérifie un code soumis (PUBLIC)
#[post("/verify-code")]
pub async fn verify_code(
    body: web::Json<VerifyCodeRequest>,
    service: web::Data<TwoFactorService>,
) -> HttpResponse {
    // 1. Valider le format (email + code à 6 caractères)
    if body.validate().is_err() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Invalid code"
        }));
    }

    // 2. Vérifier le code contre le stockage
    match service.verify_code(&body.email, &body.code).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Code verified successfully"
        })),
        // Mauvais code / code expiré : échec métier, pas une erreur serveur
        Err(e) if e.is_user_error() => HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": e.to_string()
        })),
        Err(e) => {
            eprintln!("❌ Error in verify-code: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

pub fn two_factor_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/2fa")
            .service(issue_code)
            .service(verify_code)
    );
}
