use serde_json::json;
use std::env;

/// WhatsApp OTP delivery via the provider's HTTP API
pub struct WhatsappService {
    api_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl WhatsappService {
    pub fn new() -> Result<Self, String> {
        Ok(Self {
            api_url: env::var("WHATSAPP_API_URL").map_err(|_| "WHATSAPP_API_URL is required")?,
            api_key: env::var("WHATSAPP_API_KEY").map_err(|_| "WHATSAPP_API_KEY is required")?,
            client: reqwest::Client::new(),
        })
    }

    /// Send an OTP message to a phone number
    pub async fn send_otp(&self, phone: &str, otp_code: &str) -> Result<(), String> {
        let payload = json!({
            "to": phone,
            "type": "template",
            "template": {
                "name": "otp_verification",
                "params": [otp_code]
            }
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| format!("Failed to send WhatsApp message: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("WhatsApp provider returned {}: {}", status, body));
        }

        Ok(())
    }
}
