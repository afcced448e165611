// ============================================================================
// MODÈLE : CONTACT SUBMISSIONS
// ============================================================================
//
// Description:
//   Modèle de la table contact_submissions (formulaire de contact public).
//
// Colonnes de la table contact_submissions:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - name (VARCHAR, NOT NULL)
//   - email (VARCHAR, NOT NULL)
//   - subject (VARCHAR, NOT NULL)
//   - message_type (VARCHAR, NOT NULL) - 'question', 'bug', 'feedback', etc.
//   - message (TEXT, NOT NULL)
//   - created_at (TIMESTAMPTZ, DEFAULT CURRENT_TIMESTAMP)
//
// Workflow:
//   1. Visiteur soumet le formulaire via POST /api/contact
//   2. Backend insère la soumission dans cette table
//   3. Backend envoie un email de confirmation au visiteur
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact_submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub email: String,

    pub subject: String,

    pub message_type: String,

    pub message: String,

    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
