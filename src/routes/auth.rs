use actix_web::{post, get, web, HttpResponse};
use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, ColumnTrait, Set, ActiveModelTrait};
use serde::{Deserialize, Serialize};

use crate::models::users::{Entity as Users, Column as UserColumn, ActiveModel as UserActiveModel};
use crate::utils::{password, jwt};
use crate::middleware::AuthUser;

// DTO pour l'inscription
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

// DTO pour la connexion
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// DTO pour changer le mot de passe
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// Réponse après login/register
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
}

// Réponse pour /auth/me
#[derive(Serialize)]
pub struct MeResponse {
    pub email: String,
}

/// POST /auth/register - Créer un compte (PUBLIC)
/// Le frontend enchaîne ensuite sur POST /api/2fa/issue-code (purpose=signup)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Vérifier si l'email est déjà pris
    let existing_user = Users::find()
        .filter(UserColumn::Email.eq(&body.email))
        .one(db.get_ref())
        .await;

    match existing_user {
        Ok(Some(_)) => {
            return HttpResponse::Conflict().json(serde_json::json!({
                "error": "Email already registered"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
        _ => {}
    }

    // 2. Hash le mot de passe
    let password_hash = match password::hash_password(&body.password) {
        Ok(hash) => hash,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to hash password: {}", e)
            }));
        }
    };

    // 3. Créer l'utilisateur
    let new_user = UserActiveModel {
        email: Set(body.email.clone()),
        password_hash: Set(Some(password_hash)),
        created_at: Set(Some(Utc::now())),
        ..Default::default()
    };

    let user = match new_user.insert(db.get_ref()).await {
        Ok(user) => user,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to create user: {}", e)
            }));
        }
    };

    // 4. Générer le JWT
    let token = match jwt::generate_token(&user.email) {
        Ok(token) => token,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to generate token: {}", e)
            }));
        }
    };

    // 5. Retourner la réponse
    HttpResponse::Created().json(AuthResponse {
        token,
        email: user.email,
    })
}

/// POST /auth/login - Se connecter (PUBLIC)
/// Le frontend enchaîne ensuite sur POST /api/2fa/issue-code (purpose=login)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Trouver l'utilisateur
    let user = Users::find()
        .filter(UserColumn::Email.eq(&body.email))
        .one(db.get_ref())
        .await;

    let user = match user {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid email or password"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    // 2. Vérifier le mot de passe
    let password_hash = match user.password_hash {
        Some(ref hash) => hash,
        None => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid email or password"
            }));
        }
    };

    let is_valid = match password::verify_password(&body.password, password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Password verification error: {}", e)
            }));
        }
    };

    if !is_valid {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid email or password"
        }));
    }

    // 3. Générer le JWT
    let token = match jwt::generate_token(&user.email) {
        Ok(token) => token,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to generate token: {}", e)
            }));
        }
    };

    // 4. Retourner la réponse
    HttpResponse::Ok().json(AuthResponse {
        token,
        email: user.email,
    })
}

/// GET /auth/me - Vérifier le token (PROTÉGÉE)
#[get("/me")]
pub async fn me(auth_user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse {
        email: auth_user.email,
    })
}

/// POST /auth/change-password - Changer son mot de passe (PROTÉGÉE)
#[post("/change-password")]
pub async fn change_password(
    auth_user: AuthUser,
    body: web::Json<ChangePasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Récupérer l'utilisateur
    let user = match Users::find()
        .filter(UserColumn::Email.eq(&auth_user.email))
        .one(db.get_ref())
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "User not found"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    // 2. Vérifier l'ancien mot de passe
    let current_password_hash = match user.password_hash {
        Some(ref hash) => hash,
        None => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "User has no password"
            }));
        }
    };

    let is_valid = match password::verify_password(&body.current_password, current_password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Password verification error: {}", e)
            }));
        }
    };

    if !is_valid {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Current password is incorrect"
        }));
    }

    // 3. Hasher le nouveau mot de passe
    let new_password_hash = match password::hash_password(&body.new_password) {
        Ok(hash) => hash,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to hash password: {}", e)
            }));
        }
    };

    // 4. Mettre à jour le mot de passe dans la BD
    let mut active_model: UserActiveModel = user.into();
    active_model.password_hash = Set(Some(new_password_hash));

    match active_model.update(db.get_ref()).await {
        Ok(_) => {
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": "Password changed successfully"
            }))
        }
        Err(e) => {
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to update password: {}", e)
            }))
        }
    }
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(me)
            .service(change_password)
    );
}
