// ============================================================================
// MODÈLE : TWO FACTOR CODES
// ============================================================================
//
// Description:
//   Modèle de la table two_factor_codes correspondant EXACTEMENT
//   à la structure SQL créée par la migration.
//
// Colonnes de la table two_factor_codes:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - email (VARCHAR, NOT NULL) - identité du destinataire
//   - code (VARCHAR(6), NOT NULL) - code numérique à 6 chiffres
//   - purpose (VARCHAR, NOT NULL) - 'login' | 'signup' | 'reset-password'
//   - verified (BOOLEAN, DEFAULT FALSE, NOT NULL)
//   - expires_at (TIMESTAMPTZ, NOT NULL) - created_at + 2 minutes
//   - created_at (TIMESTAMPTZ, DEFAULT CURRENT_TIMESTAMP)
//
// Workflow:
//   1. Frontend appelle POST /api/2fa/issue-code {email, purpose}
//   2. Backend supprime les anciens codes non vérifiés de cet email
//   3. Backend génère un code aléatoire [100000, 999999] et l'insère
//   4. Backend envoie l'email contenant le code
//   5. User saisit le code avant la fin du compte à rebours (120s)
//   6. Frontend appelle POST /api/2fa/verify-code {email, code}
//   7. Backend vérifie: code existe, not expired, not verified
//   8. Backend met verified = true (UPDATE conditionnel, une seule fois)
//
// Points d'attention:
//   - Un code ne peut être vérifié qu'une fois (verified = true)
//   - Code expire après 2 minutes (120 secondes)
//   - Au plus UN code non vérifié vivant par email (delete-then-insert)
//   - expires_at est immuable après création; l'expiration est comparée
//     à l'horloge serveur au moment de la vérification
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "two_factor_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub email: String,

    pub code: String,

    pub purpose: String,

    pub verified: bool,

    pub expires_at: DateTimeUtc,

    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Action privilégiée que le code 2FA protège.
/// Change uniquement le contenu de l'email, pas la logique de validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodePurpose {
    Login,
    Signup,
    ResetPassword,
}

impl CodePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodePurpose::Login => "login",
            CodePurpose::Signup => "signup",
            CodePurpose::ResetPassword => "reset-password",
        }
    }
}
