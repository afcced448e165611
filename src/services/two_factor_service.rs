// ============================================================================
// SERVICE : TWO FACTOR
// ============================================================================
//
// Description:
//   Émission et vérification des codes 2FA à 6 chiffres.
//
//   Cycle de vie d'un code:
//     issue_code  -> delete des anciens codes non vérifiés + insert (txn)
//                 -> envoi de l'email
//     verify_code -> lookup (email, code, verified=false)
//                 -> contrôle d'expiration contre l'horloge serveur
//                 -> UPDATE conditionnel verified=false -> true
//
// Points d'attention:
//   - Au plus UN code non vérifié vivant par email : le delete-then-insert
//     est exécuté dans une transaction
//   - Deux vérifications concurrentes du même code : le UPDATE conditionnel
//     (WHERE verified = false) ne laisse passer qu'un seul gagnant
//   - Un code expiré est supprimé au moment où on le détecte
//   - Mauvais code = échec métier (InvalidCode), jamais une panique
//
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use std::sync::Arc;
use thiserror::Error;

use crate::models::two_factor_codes::{self, CodePurpose, Entity as TwoFactorCodes};
use crate::services::mailer::{self, DeliveryError, EmailSender};

/// Fenêtre de validité d'un code : 2 minutes
pub const CODE_TTL_SECONDS: i64 = 120;

#[derive(Debug, Error)]
pub enum TwoFactorError {
    #[error("Invalid code")]
    InvalidCode,

    #[error("Code expired")]
    Expired,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

impl TwoFactorError {
    /// Échec de validation côté user (400) ou panne d'infrastructure (500) ?
    pub fn is_user_error(&self) -> bool {
        matches!(self, TwoFactorError::InvalidCode | TwoFactorError::Expired)
    }
}

#[derive(Debug, Clone)]
pub struct StoredCode {
    pub id: i32,
    pub email: String,
    pub code: String,
    pub purpose: String,
    pub verified: bool,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCode {
    pub email: String,
    pub code: String,
    pub purpose: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// trait = Interface (le coeur est testable sans PostgreSQL)
#[async_trait]
pub trait TwoFactorStore: Send + Sync {
    /// Supprime les codes non vérifiés de cet email puis insère le nouveau,
    /// atomiquement : l'email finit avec exactement un code vivant.
    async fn replace_code(&self, new_code: NewCode) -> Result<(), String>;

    /// Cherche le code non vérifié correspondant à (email, code)
    async fn find_live(&self, email: &str, code: &str) -> Result<Option<StoredCode>, String>;

    /// UPDATE conditionnel verified=false -> true.
    /// Retourne false si une requête concurrente a déjà vérifié ce code.
    async fn mark_verified(&self, id: i32) -> Result<bool, String>;

    async fn delete_code(&self, id: i32) -> Result<(), String>;
}

pub struct SeaOrmTwoFactorStore {
    db: DatabaseConnection,
}

impl SeaOrmTwoFactorStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TwoFactorStore for SeaOrmTwoFactorStore {
    async fn replace_code(&self, new_code: NewCode) -> Result<(), String> {
        let txn = self.db.begin().await.map_err(|e| e.to_string())?;

        // 1. Invalider les anciens codes non vérifiés de cet email
        TwoFactorCodes::delete_many()
            .filter(two_factor_codes::Column::Email.eq(&new_code.email))
            .filter(two_factor_codes::Column::Verified.eq(false))
            .exec(&txn)
            .await
            .map_err(|e| e.to_string())?;

        // 2. Insérer le nouveau code
        let model = two_factor_codes::ActiveModel {
            email: Set(new_code.email),
            code: Set(new_code.code),
            purpose: Set(new_code.purpose),
            verified: Set(false),
            expires_at: Set(new_code.expires_at),
            created_at: Set(Some(new_code.created_at)),
            ..Default::default()
        };
        model.insert(&txn).await.map_err(|e| e.to_string())?;

        txn.commit().await.map_err(|e| e.to_string())
    }

    async fn find_live(&self, email: &str, code: &str) -> Result<Option<StoredCode>, String> {
        let found = TwoFactorCodes::find()
            .filter(two_factor_codes::Column::Email.eq(email))
            .filter(two_factor_codes::Column::Code.eq(code))
            .filter(two_factor_codes::Column::Verified.eq(false))
            .one(&self.db)
            .await
            .map_err(|e| e.to_string())?;

        Ok(found.map(|m| StoredCode {
            id: m.id,
            email: m.email,
            code: m.code,
            purpose: m.purpose,
            verified: m.verified,
            expires_at: m.expires_at,
        }))
    }

    async fn mark_verified(&self, id: i32) -> Result<bool, String> {
        // UPDATE ... SET verified = true WHERE id = ? AND verified = false
        // rows_affected décide du gagnant en cas de course
        let result = TwoFactorCodes::update_many()
            .col_expr(two_factor_codes::Column::Verified, Expr::value(true))
            .filter(two_factor_codes::Column::Id.eq(id))
            .filter(two_factor_codes::Column::Verified.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| e.to_string())?;

        Ok(result.rows_affected == 1)
    }

    async fn delete_code(&self, id: i32) -> Result<(), String> {
        TwoFactorCodes::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Code émis, retourné à l'appelant (le code lui-même part par email)
#[derive(Debug)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TwoFactorService {
    store: Arc<dyn TwoFactorStore>,
    mailer: Arc<dyn EmailSender>,
}

impl TwoFactorService {
    pub fn new(store: Arc<dyn TwoFactorStore>, mailer: Arc<dyn EmailSender>) -> Self {
        Self { store, mailer }
    }

    /// Génère, stocke et envoie un code 2FA pour (email, purpose)
    pub async fn issue_code(
        &self,
        email: &str,
        purpose: CodePurpose,
    ) -> Result<IssuedCode, TwoFactorError> {
        println!("🔑 Generating 2FA code for: {} type: {}", email, purpose.as_str());

        // 1. Code aléatoire uniforme à 6 chiffres
        let code = generate_code();

        // 2. Fenêtre de validité figée à la création
        let created_at = Utc::now();
        let expires_at = created_at + Duration::seconds(CODE_TTL_SECONDS);

        // 3. Remplacer l'ancien code (invariant : un seul code vivant par email)
        self.store
            .replace_code(NewCode {
                email: email.to_string(),
                code: code.clone(),
                purpose: purpose.as_str().to_string(),
                expires_at,
                created_at,
            })
            .await
            .map_err(TwoFactorError::Storage)?;

        // 4. Envoyer l'email avec le contenu propre à l'action
        self.mailer
            .send(
                email,
                mailer::code_email_subject(purpose),
                &mailer::code_email_html(&code, purpose),
            )
            .await?;

        Ok(IssuedCode { code, expires_at })
    }

    /// Vérifie un code soumis. Un code n'est accepté qu'une seule fois.
    pub async fn verify_code(&self, email: &str, submitted: &str) -> Result<(), TwoFactorError> {
        println!("🔎 Verifying 2FA code for: {}", email);

        // 1. Chercher le code non vérifié correspondant
        let stored = self
            .store
            .find_live(email, submitted)
            .await
            .map_err(TwoFactorError::Storage)?
            .ok_or(TwoFactorError::InvalidCode)?;

        // 2. Expiration contre l'horloge serveur, jamais celle du client
        if Utc::now() > stored.expires_at {
            // Nettoyage opportuniste : la ligne ne doit pas rester vivante
            self.store
                .delete_code(stored.id)
                .await
                .map_err(TwoFactorError::Storage)?;
            return Err(TwoFactorError::Expired);
        }

        // 3. Flip atomique : un seul gagnant si deux requêtes arrivent ensemble
        let won = self
            .store
            .mark_verified(stored.id)
            .await
            .map_err(TwoFactorError::Storage)?;

        if !won {
            return Err(TwoFactorError::InvalidCode);
        }

        println!("✅ 2FA code verified for: {}", email);
        Ok(())
    }
}

/// Génère un code uniforme dans [100000, 999999] (toujours 6 chiffres)
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI32, Ordering};

    struct InMemoryStore {
        codes: Mutex<Vec<StoredCode>>,
        next_id: AtomicI32,
    }

    impl InMemoryStore {
        fn new() -> Self {
            Self {
                codes: Mutex::new(Vec::new()),
                next_id: AtomicI32::new(1),
            }
        }

        fn insert_raw(&self, email: &str, code: &str, expires_at: DateTime<Utc>) -> i32 {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.codes.lock().unwrap().push(StoredCode {
                id,
                email: email.to_string(),
                code: code.to_string(),
                purpose: "login".to_string(),
                verified: false,
                expires_at,
            });
            id
        }
    }

    #[async_trait]
    impl TwoFactorStore for InMemoryStore {
        async fn replace_code(&self, new_code: NewCode) -> Result<(), String> {
            let mut codes = self.codes.lock().unwrap();
            codes.retain(|c| !(c.email == new_code.email && !c.verified));
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            codes.push(StoredCode {
                id,
                email: new_code.email,
                code: new_code.code,
                purpose: new_code.purpose,
                verified: false,
                expires_at: new_code.expires_at,
            });
            Ok(())
        }

        async fn find_live(&self, email: &str, code: &str) -> Result<Option<StoredCode>, String> {
            let codes = self.codes.lock().unwrap();
            Ok(codes
                .iter()
                .find(|c| c.email == email && c.code == code && !c.verified)
                .cloned())
        }

        async fn mark_verified(&self, id: i32) -> Result<bool, String> {
            // Compare-and-set sous le même lock, comme le UPDATE conditionnel SQL
            let mut codes = self.codes.lock().unwrap();
            match codes.iter_mut().find(|c| c.id == id && !c.verified) {
                Some(code) => {
                    code.verified = true;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn delete_code(&self, id: i32) -> Result<(), String> {
            self.codes.lock().unwrap().retain(|c| c.id != id);
            Ok(())
        }
    }

    struct FakeMailer {
        fail: bool,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl FakeMailer {
        fn new() -> Self {
            Self { fail: false, sent: Mutex::new(Vec::new()) }
        }

        fn failing() -> Self {
            Self { fail: true, sent: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl EmailSender for FakeMailer {
        async fn send(&self, to: &str, subject: &str, _body_html: &str) -> Result<(), DeliveryError> {
            if self.fail {
                return Err(DeliveryError::Transport("connection refused".to_string()));
            }
            self.sent.lock().unwrap().push((to.to_string(), subject.to_string()));
            Ok(())
        }
    }

    fn service_with(store: Arc<InMemoryStore>, mailer: Arc<FakeMailer>) -> TwoFactorService {
        TwoFactorService::new(store, mailer)
    }

    #[test]
    fn test_generated_code_is_six_digits() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            let value: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[tokio::test]
    async fn test_issue_then_verify() {
        let store = Arc::new(InMemoryStore::new());
        let mailer = Arc::new(FakeMailer::new());
        let service = service_with(store, mailer.clone());

        let issued = service
            .issue_code("user@tradex.com", CodePurpose::Login)
            .await
            .unwrap();

        assert!(issued.expires_at > Utc::now());
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);

        service.verify_code("user@tradex.com", &issued.code).await.unwrap();
    }

    #[tokio::test]
    async fn test_wrong_code_is_invalid() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_with(store, Arc::new(FakeMailer::new()));

        let issued = service
            .issue_code("user@tradex.com", CodePurpose::Login)
            .await
            .unwrap();

        let wrong = if issued.code == "111111" { "222222" } else { "111111" };
        let err = service.verify_code("user@tradex.com", wrong).await.unwrap_err();
        assert!(matches!(err, TwoFactorError::InvalidCode));
    }

    #[tokio::test]
    async fn test_second_issue_invalidates_first() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_with(store, Arc::new(FakeMailer::new()));

        let first = service
            .issue_code("user@tradex.com", CodePurpose::Signup)
            .await
            .unwrap();
        let second = service
            .issue_code("user@tradex.com", CodePurpose::Signup)
            .await
            .unwrap();

        let err = service
            .verify_code("user@tradex.com", &first.code)
            .await
            .unwrap_err();
        assert!(matches!(err, TwoFactorError::InvalidCode));

        service.verify_code("user@tradex.com", &second.code).await.unwrap();
    }

    #[tokio::test]
    async fn test_verify_twice_fails() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_with(store, Arc::new(FakeMailer::new()));

        let issued = service
            .issue_code("user@tradex.com", CodePurpose::Login)
            .await
            .unwrap();

        service.verify_code("user@tradex.com", &issued.code).await.unwrap();
        let err = service
            .verify_code("user@tradex.com", &issued.code)
            .await
            .unwrap_err();
        assert!(matches!(err, TwoFactorError::InvalidCode));
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected_and_deleted() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_with(store.clone(), Arc::new(FakeMailer::new()));

        let expired_at = Utc::now() - Duration::seconds(1);
        store.insert_raw("user@tradex.com", "123456", expired_at);

        let err = service
            .verify_code("user@tradex.com", "123456")
            .await
            .unwrap_err();
        assert!(matches!(err, TwoFactorError::Expired));

        // La ligne expirée a été nettoyée
        assert!(store.codes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_verification_single_winner() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_with(store, Arc::new(FakeMailer::new()));

        let issued = service
            .issue_code("user@tradex.com", CodePurpose::Login)
            .await
            .unwrap();

        let s1 = service.clone();
        let s2 = service.clone();
        let code1 = issued.code.clone();
        let code2 = issued.code.clone();

        let h1 = tokio::spawn(async move { s1.verify_code("user@tradex.com", &code1).await });
        let h2 = tokio::spawn(async move { s2.verify_code("user@tradex.com", &code2).await });

        let r1 = h1.await.unwrap();
        let r2 = h2.await.unwrap();

        let successes = [&r1, &r2].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one concurrent verification must win");
    }

    #[tokio::test]
    async fn test_delivery_failure_is_surfaced() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_with(store, Arc::new(FakeMailer::failing()));

        let err = service
            .issue_code("user@tradex.com", CodePurpose::Login)
            .await
            .unwrap_err();
        assert!(matches!(err, TwoFactorError::Delivery(_)));
        assert!(!err.is_user_error());
    }
}
