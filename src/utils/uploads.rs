use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::env;

/// Cloudinary configuration loaded from environment variables
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl CloudinaryConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            cloud_name: env::var("CLOUDINARY_CLOUD_NAME")
                .map_err(|_| "CLOUDINARY_CLOUD_NAME is required")?,
            api_key: env::var("CLOUDINARY_API_KEY")
                .map_err(|_| "CLOUDINARY_API_KEY is required")?,
            api_secret: env::var("CLOUDINARY_API_SECRET")
                .map_err(|_| "CLOUDINARY_API_SECRET is required")?,
        })
    }

    pub fn upload_url(&self, resource_type: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/{}/upload",
            self.cloud_name, resource_type
        )
    }

    /// Generate a signature for authenticated uploads
    pub fn generate_signature(&self, params: &str, timestamp: i64) -> String {
        let to_sign = format!("{}&timestamp={}{}", params, timestamp, self.api_secret);
        let mut hasher = Sha1::new();
        hasher.update(to_sign.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Response from Cloudinary upload API
#[derive(Debug, Deserialize, Serialize)]
pub struct CloudinaryUploadResponse {
    pub public_id: String,
    pub format: String,
    pub resource_type: String,
    pub bytes: u64,
    pub url: String,
    pub secure_url: String,
}

#[derive(Debug, Deserialize)]
pub struct CloudinaryError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CloudinaryErrorResponse {
    pub error: CloudinaryError,
}

/// A file received from a multipart request
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl FileUpload {
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit('.')
            .next()
            .map(|ext| ext.to_lowercase())
    }
}

/// Validation rules for KYC document uploads
#[derive(Debug, Clone)]
pub struct FileValidator {
    pub allowed_extensions: Vec<String>,
    pub max_file_size: usize,
}

impl FileValidator {
    /// Identity documents: images or PDF scans, max 5MB
    pub fn kyc_documents() -> Self {
        Self {
            allowed_extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "pdf".to_string(),
            ],
            max_file_size: 5 * 1024 * 1024,
        }
    }

    pub fn validate(&self, file: &FileUpload) -> Result<(), String> {
        let extension = file.extension().ok_or("File has no extension")?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(format!(
                "Invalid file type '{}'. Allowed types: {}",
                extension,
                self.allowed_extensions.join(", ")
            ));
        }

        if file.data.is_empty() {
            return Err("File is empty".to_string());
        }

        if file.size() > self.max_file_size {
            return Err(format!(
                "File too large. Maximum size: {} bytes, file size: {} bytes",
                self.max_file_size,
                file.size()
            ));
        }

        Ok(())
    }

    /// Cloudinary resource type for a file name
    pub fn resource_type(file_name: &str) -> &'static str {
        let extension = file_name
            .rsplit('.')
            .next()
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "svg" | "bmp" => "image",
            _ => "raw",
        }
    }
}

/// Upload service for Cloudinary
pub struct UploadService {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl UploadService {
    pub fn new() -> Result<Self, String> {
        let config = CloudinaryConfig::from_env()?;
        let client = reqwest::Client::new();
        Ok(Self { config, client })
    }

    /// Upload a validated document, returning the hosted URL
    pub async fn upload_document(
        &self,
        file: FileUpload,
        folder: &str,
        validator: &FileValidator,
    ) -> Result<CloudinaryUploadResponse, String> {
        validator.validate(&file)?;

        let resource_type = FileValidator::resource_type(&file.file_name);
        let timestamp = chrono::Utc::now().timestamp();
        let upload_url = self.config.upload_url(resource_type);

        let params = format!("folder={}", folder);
        let signature = self.config.generate_signature(&params, timestamp);

        let file_part = Part::bytes(file.data)
            .file_name(file.file_name.clone())
            .mime_str("application/octet-stream")
            .map_err(|e| format!("Failed to create file part: {}", e))?;

        let form = Form::new()
            .part("file", file_part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("signature", signature)
            .text("folder", folder.to_string());

        let response = self
            .client
            .post(&upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("Failed to send upload request: {}", e))?;

        if response.status().is_success() {
            response
                .json::<CloudinaryUploadResponse>()
                .await
                .map_err(|e| format!("Failed to parse upload response: {}", e))
        } else {
            let error_response = response
                .json::<CloudinaryErrorResponse>()
                .await
                .map_err(|e| format!("Failed to parse error response: {}", e))?;
            Err(format!(
                "Cloudinary upload failed: {}",
                error_response.error.message
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, bytes: usize) -> FileUpload {
        FileUpload {
            file_name: name.to_string(),
            data: vec![0u8; bytes],
        }
    }

    #[test]
    fn kyc_validator_accepts_images_and_pdfs() {
        let v = FileValidator::kyc_documents();
        assert!(v.validate(&file("pancard.jpg", 2048)).is_ok());
        assert!(v.validate(&file("aadhar.PDF", 2048)).is_ok());
    }

    #[test]
    fn kyc_validator_rejects_bad_files() {
        let v = FileValidator::kyc_documents();
        assert!(v.validate(&file("script.exe", 2048)).is_err());
        assert!(v.validate(&file("noext", 2048)).is_err());
        assert!(v.validate(&file("empty.png", 0)).is_err());
        assert!(v.validate(&file("huge.png", 6 * 1024 * 1024)).is_err());
    }

    #[test]
    fn resource_type_by_extension() {
        assert_eq!(FileValidator::resource_type("a.jpeg"), "image");
        assert_eq!(FileValidator::resource_type("doc.pdf"), "raw");
    }

    #[test]
    fn signature_is_stable_hex() {
        let config = CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
        };
        let a = config.generate_signature("folder=kyc", 1700000000);
        let b = config.generate_signature("folder=kyc", 1700000000);
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
