use chrono::{Duration, Utc};
use mongodb::bson::doc;
use mongodb::{Client, Collection};

use crate::database::db::DB_NAME;
use crate::otp::model::{Otp, OtpKind};
use crate::user::model::Role;
use crate::utils::email::EmailService;
use crate::utils::error::CustomError;
use crate::utils::helpers::{
    OTP_EXPIRATION_MINUTES, generate_otp_code, validate_business_email, validate_email_format,
    validate_not_disposable, validate_phone_number,
};
use crate::utils::whatsapp::WhatsappService;

pub struct OtpService {
    collection: Collection<Otp>,
}

impl OtpService {
    pub fn new(client: &Client) -> Self {
        let collection = client.database(DB_NAME).collection::<Otp>("otps");
        OtpService { collection }
    }

    fn validate_identifier(
        identifier: &str,
        kind: OtpKind,
        role: Option<&Role>,
    ) -> Result<(), CustomError> {
        match kind {
            OtpKind::Email | OtpKind::Reset => {
                validate_email_format(identifier)?;
                validate_not_disposable(identifier)?;
                if role.is_some_and(|r| r.requires_business_email()) {
                    validate_business_email(identifier)?;
                }
                Ok(())
            }
            OtpKind::Whatsapp => validate_phone_number(identifier),
        }
    }

    /// Generate, persist and deliver a new OTP. Any previous pending
    /// codes for the same identifier/kind pair are discarded.
    pub async fn request_otp(
        &self,
        identifier: &str,
        kind: OtpKind,
        role: Option<&Role>,
    ) -> Result<(), CustomError> {
        Self::validate_identifier(identifier, kind, role)?;

        let code = generate_otp_code();

        self.collection
            .delete_many(doc! { "identifier": identifier, "kind": kind.as_str() })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let otp = Otp {
            id: None,
            identifier: identifier.to_string(),
            kind,
            code: code.clone(),
            expires_at: Utc::now() + Duration::minutes(OTP_EXPIRATION_MINUTES),
            verified: false,
            created_at: Utc::now(),
        };

        self.collection
            .insert_one(otp)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        self.deliver(identifier, kind, &code).await
    }

    async fn deliver(&self, identifier: &str, kind: OtpKind, code: &str) -> Result<(), CustomError> {
        match kind {
            OtpKind::Email => {
                let email_service = EmailService::new().map_err(|e| {
                    CustomError::InternalServerError(format!("Email service error: {}", e))
                })?;
                email_service.send_otp_email(identifier, code).await.map_err(|e| {
                    CustomError::InternalServerError(format!("Failed to send email: {}", e))
                })
            }
            OtpKind::Reset => {
                let email_service = EmailService::new().map_err(|e| {
                    CustomError::InternalServerError(format!("Email service error: {}", e))
                })?;
                email_service
                    .send_password_reset_email(identifier, code)
                    .await
                    .map_err(|e| {
                        CustomError::InternalServerError(format!("Failed to send email: {}", e))
                    })
            }
            OtpKind::Whatsapp => {
                let whatsapp = WhatsappService::new().map_err(|e| {
                    CustomError::InternalServerError(format!("WhatsApp service error: {}", e))
                })?;
                whatsapp.send_otp(identifier, code).await.map_err(|e| {
                    CustomError::InternalServerError(format!("Failed to send WhatsApp OTP: {}", e))
                })
            }
        }
    }

    /// Mark an OTP verified. Exact code match against an unexpired,
    /// unverified record; anything else is a 400.
    pub async fn verify_otp(
        &self,
        identifier: &str,
        kind: OtpKind,
        code: &str,
    ) -> Result<(), CustomError> {
        let otp = self
            .collection
            .find_one(doc! {
                "identifier": identifier,
                "kind": kind.as_str(),
                "verified": false,
            })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .ok_or_else(|| CustomError::BadRequestError("Invalid OTP code".to_string()))?;

        if !otp.accepts(code, Utc::now()) {
            if otp.expires_at <= Utc::now() {
                return Err(CustomError::BadRequestError("OTP has expired".to_string()));
            }
            return Err(CustomError::BadRequestError("Invalid OTP code".to_string()));
        }

        self.collection
            .update_one(
                doc! { "_id": otp.id },
                doc! { "$set": { "verified": true } },
            )
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        Ok(())
    }

    /// Check a verified record exists without consuming it
    pub async fn is_verified(&self, identifier: &str, kind: OtpKind) -> Result<bool, CustomError> {
        let count = self
            .collection
            .count_documents(doc! {
                "identifier": identifier,
                "kind": kind.as_str(),
                "verified": true,
            })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;
        Ok(count > 0)
    }

    /// Consume a verified record: registration's final step deletes it
    /// so a verification cannot be reused.
    pub async fn consume_verified(
        &self,
        identifier: &str,
        kind: OtpKind,
    ) -> Result<(), CustomError> {
        let result = self
            .collection
            .delete_one(doc! {
                "identifier": identifier,
                "kind": kind.as_str(),
                "verified": true,
            })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        if result.deleted_count == 0 {
            return Err(CustomError::BadRequestError(format!(
                "{} is not verified",
                kind.as_str()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_and_agency_otp_require_company_email() {
        let check = |role: &Role| {
            OtpService::validate_identifier("owner@gmail.com", OtpKind::Email, Some(role))
        };
        assert!(check(&Role::Brand).is_err());
        assert!(check(&Role::Agency).is_err());
        assert!(check(&Role::Influencer).is_ok());
    }

    #[test]
    fn role_is_irrelevant_for_whatsapp_otp() {
        let result =
            OtpService::validate_identifier("+919876543210", OtpKind::Whatsapp, Some(&Role::Brand));
        assert!(result.is_ok());
    }
}
