// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - dto : Data Transfer Objects pour les requêtes/réponses API
//   - users : Utilisateurs (auth email + password)
//   - two_factor_codes : Codes 2FA à 6 chiffres (expire 2 minutes)
//   - contact_submissions : Soumissions du formulaire de contact
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les relations entre tables sont définies dans chaque modèle
//
// ============================================================================

pub mod health;
pub mod dto;
pub mod users;
pub mod two_factor_codes;
pub mod contact_submissions;
