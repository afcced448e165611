// ============================================================================
// SERVICE : MAILER
// ============================================================================
//
// Description:
//   Canal de notification email. Le coeur du backend ne dépend que du trait
//   EmailSender (send to/subject/html) : l'implémentation Resend est
//   injectée au démarrage, les tests utilisent un faux mailer en mémoire.
//
// Points d'attention:
//   - Timeout borné (5s) sur l'appel Resend : échec rapide plutôt que de
//     bloquer la requête d'émission de code
//   - FROM_EMAIL peut être "addr@x.com" ou "TradeX <addr@x.com>"
//
// ============================================================================

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::models::two_factor_codes::CodePurpose;

const RESEND_URL: &str = "https://api.resend.com/emails";
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Email transport error: {0}")]
    Transport(String),

    #[error("Email send failed ({0})")]
    Rejected(u16),
}

// trait = Interface
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body_html: &str) -> Result<(), DeliveryError>;
}

pub struct ResendMailer {
    api_key: String,
    from_email: String,
    client: reqwest::Client,
}

impl ResendMailer {
    pub fn new(api_key: String, from_email: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self { api_key, from_email, client }
    }

    /// Formate l'expéditeur "TradeX <addr>" si FROM_EMAIL est une adresse nue
    fn from_field(&self) -> String {
        if self.from_email.contains('<') {
            self.from_email.clone()
        } else {
            format!("TradeX <{}>", self.from_email)
        }
    }
}

#[async_trait]
impl EmailSender for ResendMailer {
    async fn send(&self, to: &str, subject: &str, body_html: &str) -> Result<(), DeliveryError> {
        let response = self.client
            .post(RESEND_URL)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from_field(),
                "to": [to],
                "subject": subject,
                "html": body_html,
            }))
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            eprintln!("❌ Resend API error: {}", response.status());
            return Err(DeliveryError::Rejected(response.status().as_u16()));
        }

        println!("✅ Email sent to {}", to);
        Ok(())
    }
}

/// Sujet de l'email selon l'action protégée par le code
pub fn code_email_subject(purpose: CodePurpose) -> &'static str {
    match purpose {
        CodePurpose::Login => "Your TradeX Login Code",
        CodePurpose::Signup => "Verify Your TradeX Account",
        CodePurpose::ResetPassword => "Reset Your TradeX Password",
    }
}

/// Corps HTML de l'email contenant le code 2FA
pub fn code_email_html(code: &str, purpose: CodePurpose) -> String {
    let action = match purpose {
        CodePurpose::Login => "login",
        CodePurpose::Signup => "signup",
        CodePurpose::ResetPassword => "password reset",
    };

    format!(
        r#"<!DOCTYPE html>
<html>
  <body style="font-family: 'Segoe UI', Arial, sans-serif; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
      <div style="background: linear-gradient(135deg, #2563eb 0%, #0ea5e9 100%); color: white; padding: 30px; border-radius: 10px 10px 0 0; text-align: center;">
        <h1 style="margin: 0;">🔐 Verification Code</h1>
      </div>
      <div style="background: #f8f9fa; padding: 30px; border-radius: 0 0 10px 10px;">
        <p>Enter this code to complete your {action}:</p>
        <div style="background: white; padding: 25px; border-radius: 10px; text-align: center; border: 2px dashed #2563eb;">
          <div style="font-size: 36px; font-weight: bold; letter-spacing: 8px; color: #2563eb; font-family: 'Courier New', monospace;">{code}</div>
          <p style="color: #666; font-size: 14px;">Valid for 2 minutes</p>
        </div>
        <p><strong>⚠️ Security Notice:</strong> Never share this code with anyone.
        TradeX will never ask for this code via phone or email.</p>
        <p>If you didn't request this code, please ignore this email or contact support.</p>
      </div>
      <div style="text-align: center; color: #666; font-size: 12px;">
        <p>© 2025 TradeX. All rights reserved.</p>
      </div>
    </div>
  </body>
</html>"#
    )
}

/// Email de confirmation envoyé après une soumission du formulaire de contact
pub fn contact_confirmation_html(name: &str, subject: &str, message_type: &str, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <body style="font-family: 'Segoe UI', Arial, sans-serif; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
      <div style="background: linear-gradient(135deg, #2563eb 0%, #0ea5e9 100%); color: white; padding: 30px; border-radius: 10px 10px 0 0; text-align: center;">
        <h1 style="margin: 0;">Thank You, {name}!</h1>
      </div>
      <div style="background: #f8f9fa; padding: 30px; border-radius: 0 0 10px 10px;">
        <p>We have received your message and appreciate you taking the time to contact us.</p>
        <div style="background: white; padding: 20px; border-radius: 8px; border-left: 4px solid #2563eb;">
          <strong>Subject:</strong> {subject}<br>
          <strong>Type:</strong> {message_type}<br>
          <strong>Message:</strong> {message}
        </div>
        <p>Our team will review your inquiry and get back to you as soon as possible.</p>
        <p>Best regards,<br><strong>The TradeX Team</strong></p>
      </div>
      <div style="text-align: center; color: #666; font-size: 12px;">
        <p>© 2025 TradeX. All rights reserved.</p>
      </div>
    </div>
  </body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_email_contains_code() {
        let html = code_email_html("123456", CodePurpose::Login);
        assert!(html.contains("123456"));
        assert!(html.contains("login"));
    }

    #[test]
    fn test_subject_per_purpose() {
        assert_eq!(code_email_subject(CodePurpose::Login), "Your TradeX Login Code");
        assert_eq!(code_email_subject(CodePurpose::Signup), "Verify Your TradeX Account");
        assert_eq!(code_email_subject(CodePurpose::ResetPassword), "Reset Your TradeX Password");
    }
}
