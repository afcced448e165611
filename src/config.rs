// ============================================================================
// CONFIGURATION
// ============================================================================
//
// Description:
//   Toutes les variables d'environnement requises sont lues UNE FOIS au
//   démarrage du process. Une valeur absente est une erreur de configuration
//   fatale (pas une erreur par requête).
//
// Variables requises:
//   - DATABASE_URL         : connexion PostgreSQL
//   - RESEND_API_KEY       : clé API Resend (envoi des emails 2FA/contact)
//   - FROM_EMAIL           : adresse expéditeur des emails
//   - TWELVE_DATA_API_KEY  : clé API Twelve Data (données de marché)
//
// Variables optionnelles:
//   - JWT_SECRET : clé de signature JWT (fallback insecure avec warning,
//     voir utils/jwt.rs)
//
// ============================================================================

use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub resend_api_key: String,
    pub from_email: String,
    pub twelve_data_api_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            database_url: require("DATABASE_URL")?,
            resend_api_key: require("RESEND_API_KEY")?,
            from_email: require("FROM_EMAIL")?,
            twelve_data_api_key: require("TWELVE_DATA_API_KEY")?,
        })
    }
}

fn require(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}
