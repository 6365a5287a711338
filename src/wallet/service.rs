use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};

use crate::database::db::DB_NAME;
use crate::utils::error::CustomError;
use crate::utils::uploads::{FileUpload, FileValidator, UploadService};
use crate::wallet::model::{Balance, Kyc, KycDetails};

pub struct KycService {
    collection: Collection<Kyc>,
}

impl KycService {
    pub fn new(client: &Client) -> Self {
        let collection = client.database(DB_NAME).collection::<Kyc>("kyc");
        KycService { collection }
    }

    fn parse_user_id(user_id: &str) -> Result<ObjectId, CustomError> {
        ObjectId::parse_str(user_id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))
    }

    pub async fn find_for_user(&self, user_id: &str) -> Result<Kyc, CustomError> {
        let user_id = Self::parse_user_id(user_id)?;

        self.collection
            .find_one(doc! { "user_id": user_id })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .ok_or_else(|| CustomError::NotFoundError("KYC not submitted yet".to_string()))
    }

    /// Submit or resubmit identity documents. Resubmission is allowed
    /// while unverified; a verified record is frozen.
    pub async fn submit(
        &self,
        user_id: &str,
        pancard: FileUpload,
        aadhar: FileUpload,
        details: KycDetails,
    ) -> Result<Kyc, CustomError> {
        let user_oid = Self::parse_user_id(user_id)?;

        if let Ok(existing) = self.find_for_user(user_id).await {
            if existing.verified {
                return Err(CustomError::BadRequestError(
                    "KYC is already verified".to_string(),
                ));
            }
        }

        let (bank, upi_id) = details
            .payout_destination()
            .map_err(CustomError::ValidationError)?;

        let validator = FileValidator::kyc_documents();
        let upload_service = UploadService::new().map_err(CustomError::InternalServerError)?;

        let pancard_upload = upload_service
            .upload_document(pancard, "kyc/pancard", &validator)
            .await
            .map_err(CustomError::BadRequestError)?;
        let aadhar_upload = upload_service
            .upload_document(aadhar, "kyc/aadhar", &validator)
            .await
            .map_err(CustomError::BadRequestError)?;

        // Keep any balance accumulated before resubmission
        let balance = self
            .find_for_user(user_id)
            .await
            .map(|k| k.balance)
            .unwrap_or_default();

        let kyc = Kyc {
            id: None,
            user_id: user_oid,
            pancard_url: pancard_upload.secure_url,
            aadhar_url: aadhar_upload.secure_url,
            bank,
            upi_id,
            verified: false,
            balance,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        self.collection
            .delete_one(doc! { "user_id": user_oid })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let result = self
            .collection
            .insert_one(kyc)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let _ = result.inserted_id;
        self.find_for_user(user_id).await
    }

    /// Admin verification decision
    pub async fn set_verified(&self, user_id: &str, verified: bool) -> Result<Kyc, CustomError> {
        let user_oid = Self::parse_user_id(user_id)?;

        self.collection
            .find_one_and_update(
                doc! { "user_id": user_oid },
                doc! { "$set": {
                    "verified": verified,
                    "updated_at": Utc::now().to_rfc3339(),
                }},
            )
            .return_document(mongodb::options::ReturnDocument::After)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .ok_or_else(|| CustomError::NotFoundError("KYC not submitted yet".to_string()))
    }

    pub async fn balance(&self, user_id: &str) -> Result<Balance, CustomError> {
        Ok(self.find_for_user(user_id).await?.balance)
    }

    /// Credit a payout into the available balance. Requires a verified
    /// KYC record.
    pub async fn credit(&self, user_id: &str, amount: f64) -> Result<Balance, CustomError> {
        if amount <= 0.0 {
            return Err(CustomError::ValidationError(
                "Amount must be positive".to_string(),
            ));
        }

        let kyc = self.find_for_user(user_id).await?;
        if !kyc.verified {
            return Err(CustomError::BadRequestError(
                "KYC must be verified before crediting".to_string(),
            ));
        }

        let user_oid = Self::parse_user_id(user_id)?;
        let updated = self
            .collection
            .find_one_and_update(
                doc! { "user_id": user_oid },
                doc! {
                    "$inc": { "balance.available": amount },
                    "$set": { "updated_at": Utc::now().to_rfc3339() },
                },
            )
            .return_document(mongodb::options::ReturnDocument::After)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .ok_or_else(|| CustomError::NotFoundError("KYC not submitted yet".to_string()))?;

        Ok(updated.balance)
    }
}
