use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::{Client, Collection};

use crate::database::RedisService;
use crate::database::db::DB_NAME;
use crate::middleware::auth::{create_token, create_token_with_session};
use crate::otp::model::OtpKind;
use crate::otp::service::OtpService;
use crate::user::model::{
    MediaKit, MediaKitRequest, RegisterRequest, Role, UpdateProfileRequest, User, UserStatus,
    UserView,
};
use crate::utils::error::CustomError;
use crate::utils::helpers::validate_business_email;
use crate::utils::model::{PageQuery, Paginated};
use crate::utils::{hashing, password_validation};

/// Registration requires both prior verification steps on record.
fn check_otp_verifications(email_verified: bool, phone_verified: bool) -> Result<(), CustomError> {
    if !email_verified {
        return Err(CustomError::BadRequestError(
            "Email is not verified".to_string(),
        ));
    }
    if !phone_verified {
        return Err(CustomError::BadRequestError(
            "Phone number is not verified".to_string(),
        ));
    }
    Ok(())
}

pub struct UserService {
    collection: Collection<User>,
}

impl UserService {
    pub fn new(client: &Client) -> Self {
        let collection = client.database(DB_NAME).collection::<User>("users");
        UserService { collection }
    }

    async fn email_exists(&self, email: &str) -> Result<bool, mongodb::error::Error> {
        let count = self
            .collection
            .count_documents(doc! { "email": email })
            .await?;
        Ok(count > 0)
    }

    async fn phone_exists(&self, phone_number: &str) -> Result<bool, mongodb::error::Error> {
        let count = self
            .collection
            .count_documents(doc! { "phone_number": phone_number })
            .await?;
        Ok(count > 0)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, mongodb::error::Error> {
        let count = self
            .collection
            .count_documents(doc! { "username": username })
            .await?;
        Ok(count > 0)
    }

    /// Final registration step. Requires both the email OTP and the
    /// WhatsApp OTP for the phone to have been verified beforehand;
    /// both records are consumed on success.
    pub async fn register(
        &self,
        req: RegisterRequest,
        otp_service: &OtpService,
    ) -> Result<ObjectId, CustomError> {
        let role = Role::parse(&req.role)
            .filter(|r| *r != Role::Admin)
            .ok_or_else(|| CustomError::BadRequestError("Invalid role".to_string()))?;

        if !req.terms_accepted {
            return Err(CustomError::BadRequestError(
                "Terms and conditions must be accepted".to_string(),
            ));
        }

        // Re-checked here: the OTP step only sees the role when the
        // client chooses to send it
        if role.requires_business_email() {
            validate_business_email(&req.email)?;
        }

        if self.email_exists(&req.email).await.map_err(|_| {
            CustomError::InternalServerError("Failed to check email existence".to_string())
        })? {
            return Err(CustomError::ConflictError(
                "Email already exists".to_string(),
            ));
        }

        if self.phone_exists(&req.phone_number).await.map_err(|_| {
            CustomError::InternalServerError("Failed to check phone number existence".to_string())
        })? {
            return Err(CustomError::ConflictError(
                "Phone number already exists".to_string(),
            ));
        }

        if let Some(username) = &req.username {
            if self.username_exists(username).await.map_err(|_| {
                CustomError::InternalServerError("Failed to check username existence".to_string())
            })? {
                return Err(CustomError::ConflictError(
                    "Username already exists".to_string(),
                ));
            }
        }

        // Both verification steps must have happened
        let email_verified = otp_service.is_verified(&req.email, OtpKind::Email).await?;
        let phone_verified = otp_service
            .is_verified(&req.phone_number, OtpKind::Whatsapp)
            .await?;
        check_otp_verifications(email_verified, phone_verified)?;

        password_validation::validate_password(&req.password)?;

        let hashed_password = hashing::hash_password(&req.password)
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let new_user = User {
            id: None,
            name: req.name,
            username: req.username,
            email: req.email.clone(),
            phone_number: req.phone_number.clone(),
            password: hashed_password,
            role,
            status: role.initial_status(),
            terms_accepted: true,
            address: None,
            bio: None,
            categories: Vec::new(),
            commercials: None,
            social_connections: Vec::new(),
            platform_metrics: Vec::new(),
            media_kit: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let result = self
            .collection
            .insert_one(new_user)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let user_id = result.inserted_id.as_object_id().ok_or_else(|| {
            CustomError::InternalServerError("Failed to get inserted ID".to_string())
        })?;

        // A verification is accepted once; delete both records now
        otp_service.consume_verified(&req.email, OtpKind::Email).await?;
        otp_service
            .consume_verified(&req.phone_number, OtpKind::Whatsapp)
            .await?;

        Ok(user_id)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, CustomError> {
        let user = self
            .collection
            .find_one(doc! { "email": email })
            .await
            .map_err(|_| CustomError::InternalServerError("Database error".to_string()))?
            .ok_or_else(|| CustomError::UnauthorizedError("Invalid credentials".to_string()))?;

        if !hashing::verify_password(password, &user.password)
            .map_err(|_| CustomError::InternalServerError("Invalid credentials".to_string()))?
        {
            return Err(CustomError::UnauthorizedError(
                "Invalid credentials".to_string(),
            ));
        }

        Ok(user)
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        redis_service: Option<&RedisService>,
    ) -> Result<(String, UserView), CustomError> {
        let user = self.authenticate(email, password).await?;

        if user.status == UserStatus::Rejected {
            return Err(CustomError::UnauthorizedError(
                "This account has been rejected".to_string(),
            ));
        }

        let user_id = user
            .id
            .as_ref()
            .ok_or_else(|| CustomError::InternalServerError("User ID missing".to_string()))?
            .to_hex();

        let token = if let Some(redis) = redis_service {
            create_token_with_session(&user_id, &user.role, redis).await?
        } else {
            create_token(&user_id, &user.role)?
        };

        Ok((token, user.into()))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<User, CustomError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;

        self.collection
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .ok_or_else(|| CustomError::NotFoundError("User not found".to_string()))
    }

    pub async fn update_profile(
        &self,
        id: &str,
        req: UpdateProfileRequest,
    ) -> Result<UserView, CustomError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;

        let mut set = doc! { "updated_at": Utc::now().to_rfc3339() };
        if let Some(name) = req.name {
            set.insert("name", name);
        }
        if let Some(bio) = req.bio {
            set.insert("bio", bio);
        }
        if let Some(address) = req.address {
            let address_doc = mongodb::bson::to_bson(&address)
                .map_err(|e| CustomError::InternalServerError(e.to_string()))?;
            set.insert("address", address_doc);
        }
        if let Some(categories) = req.categories {
            set.insert("categories", categories);
        }
        if let Some(commercials) = req.commercials {
            let commercials_doc = mongodb::bson::to_bson(&commercials)
                .map_err(|e| CustomError::InternalServerError(e.to_string()))?;
            set.insert("commercials", commercials_doc);
        }

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": set })
            .return_document(mongodb::options::ReturnDocument::After)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .ok_or_else(|| CustomError::NotFoundError("User not found".to_string()))?;

        Ok(updated.into())
    }

    /// Upsert media kit sections; the custom URL slug must be unique
    /// across all users.
    pub async fn update_media_kit(
        &self,
        id: &str,
        req: MediaKitRequest,
    ) -> Result<MediaKit, CustomError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;

        let user = self.find_by_id(id).await?;
        let mut media_kit = user.media_kit.unwrap_or_default();

        if let Some(custom_url) = &req.custom_url {
            let slug = custom_url.trim().to_lowercase();
            if slug.is_empty()
                || !slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            {
                return Err(CustomError::ValidationError(
                    "Custom URL may only contain letters, numbers and hyphens".to_string(),
                ));
            }

            let taken = self
                .collection
                .count_documents(doc! {
                    "media_kit.custom_url": &slug,
                    "_id": { "$ne": object_id },
                })
                .await
                .map_err(|e| CustomError::InternalServerError(e.to_string()))?;
            if taken > 0 {
                return Err(CustomError::ConflictError(
                    "Custom URL is already taken".to_string(),
                ));
            }

            media_kit.custom_url = Some(slug);
        }

        if let Some(about_me) = req.about_me {
            media_kit.about_me = Some(about_me);
        }
        if let Some(contact) = req.contact {
            media_kit.contact = Some(contact);
        }
        if let Some(links) = req.links {
            media_kit.links = links;
        }
        if let Some(rates) = req.rates {
            media_kit.rates = Some(rates);
        }
        if let Some(collaborations) = req.collaborations {
            media_kit.collaborations = collaborations;
        }

        let media_kit_doc = mongodb::bson::to_bson(&media_kit)
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        self.collection
            .update_one(
                doc! { "_id": object_id },
                doc! { "$set": {
                    "media_kit": media_kit_doc,
                    "updated_at": Utc::now().to_rfc3339(),
                }},
            )
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        Ok(media_kit)
    }

    pub async fn find_by_custom_url(&self, slug: &str) -> Result<User, CustomError> {
        self.collection
            .find_one(doc! { "media_kit.custom_url": slug.to_lowercase() })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .ok_or_else(|| CustomError::NotFoundError("Media kit not found".to_string()))
    }

    pub async fn forgot_password(
        &self,
        email: &str,
        otp_service: &OtpService,
    ) -> Result<(), CustomError> {
        // Confirm the account exists before sending anything
        let count = self
            .collection
            .count_documents(doc! { "email": email })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;
        if count == 0 {
            return Err(CustomError::NotFoundError("User not found".to_string()));
        }

        otp_service.request_otp(email, OtpKind::Reset, None).await
    }

    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
        otp_service: &OtpService,
    ) -> Result<(), CustomError> {
        otp_service.verify_otp(email, OtpKind::Reset, code).await?;
        otp_service.consume_verified(email, OtpKind::Reset).await?;

        password_validation::validate_password(new_password)?;
        let hashed = hashing::hash_password(new_password)
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        self.collection
            .update_one(
                doc! { "email": email },
                doc! { "$set": {
                    "password": hashed,
                    "updated_at": Utc::now().to_rfc3339(),
                }},
            )
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        Ok(())
    }

    // ============================================
    // Admin operations
    // ============================================

    pub async fn list_users(
        &self,
        role: Option<Role>,
        status: Option<UserStatus>,
        query: &PageQuery,
    ) -> Result<Paginated<UserView>, CustomError> {
        let mut filter = Document::new();
        if let Some(role) = role {
            filter.insert("role", role.as_str());
        }
        if let Some(status) = status {
            filter.insert("status", status.as_str());
        }

        let total = self
            .collection
            .count_documents(filter.clone())
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let (_, limit) = query.resolve();
        let users: Vec<User> = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .skip(query.skip())
            .limit(limit as i64)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        Ok(Paginated::new(
            users.into_iter().map(UserView::from).collect(),
            query,
            total,
        ))
    }

    pub async fn set_status(&self, id: &str, status: UserStatus) -> Result<UserView, CustomError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;

        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": object_id },
                doc! { "$set": {
                    "status": status.as_str(),
                    "updated_at": Utc::now().to_rfc3339(),
                }},
            )
            .return_document(mongodb::options::ReturnDocument::After)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .ok_or_else(|| CustomError::NotFoundError("User not found".to_string()))?;

        Ok(updated.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_needs_both_verifications() {
        assert!(check_otp_verifications(true, true).is_ok());
        assert!(check_otp_verifications(false, true).is_err());
        assert!(check_otp_verifications(true, false).is_err());
        assert!(check_otp_verifications(false, false).is_err());
    }

    #[test]
    fn missing_email_verification_is_reported_first() {
        let err = check_otp_verifications(false, false).unwrap_err();
        assert!(matches!(err, CustomError::BadRequestError(msg) if msg.contains("Email")));
    }
}
