use actix_web::{post, web, HttpResponse};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::Arc;
use validator::Validate;

use crate::models::contact_submissions::ActiveModel as ContactActiveModel;
use crate::models::dto::ContactRequest;
use crate::services::mailer::{self, EmailSender};

/// POST /api/contact - Formulaire de contact (PUBLIC)
#[post("/contact")]
pub async fn submit_contact(
    body: web::Json<ContactRequest>,
    db: web::Data<DatabaseConnection>,
    email_sender: web::Data<Arc<dyn EmailSender>>,
) -> HttpResponse {
    // 1. Valider les champs du formulaire
    if body.validate().is_err() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid contact form submission"
        }));
    }

    println!("📨 Contact form submission from: {}", body.email);

    // 2. Stocker la soumission
    let submission = ContactActiveModel {
        name: Set(body.name.clone()),
        email: Set(body.email.clone()),
        subject: Set(body.subject.clone()),
        message_type: Set(body.message_type.clone()),
        message: Set(body.message.clone()),
        ..Default::default()
    };

    if let Err(e) = submission.insert(db.get_ref()).await {
        return HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to store contact submission: {}", e)
        }));
    }

    // 3. Envoyer l'email de confirmation au visiteur
    let html = mailer::contact_confirmation_html(
        &body.name,
        &body.subject,
        &body.message_type,
        &body.message,
    );

    if let Err(e) = email_sender
        .send(&body.email, "We received your message!", &html)
        .await
    {
        return HttpResponse::InternalServerError().json(serde_json::json!({
            "error": e.to_string()
        }));
    }

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Contact form submitted successfully"
    }))
}
