use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_holder: String,
    pub account_number: String,
    pub ifsc: String,
}

/// Wallet balance in rupees. `pending` covers payouts awaiting
/// settlement; `available` can be withdrawn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Balance {
    #[serde(default)]
    pub available: f64,
    #[serde(default)]
    pub pending: f64,
}

/// One-to-one with an influencer. Identity documents are stored as
/// Cloudinary URLs, never raw bytes.
#[derive(Debug, Serialize, Deserialize)]
pub struct Kyc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub pancard_url: String,
    pub aadhar_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank: Option<BankDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
    pub verified: bool,
    #[serde(default)]
    pub balance: Balance,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Text fields extracted from the multipart KYC submission
#[derive(Debug, Default)]
pub struct KycDetails {
    pub account_holder: Option<String>,
    pub account_number: Option<String>,
    pub ifsc: Option<String>,
    pub upi_id: Option<String>,
}

impl KycDetails {
    /// Either a complete bank account or a UPI id must be supplied
    pub fn payout_destination(&self) -> Result<(Option<BankDetails>, Option<String>), String> {
        let bank = match (&self.account_holder, &self.account_number, &self.ifsc) {
            (Some(holder), Some(number), Some(ifsc)) => Some(BankDetails {
                account_holder: holder.clone(),
                account_number: number.clone(),
                ifsc: ifsc.clone(),
            }),
            (None, None, None) => None,
            _ => return Err("Incomplete bank details".to_string()),
        };

        if bank.is_none() && self.upi_id.is_none() {
            return Err("Provide bank details or a UPI id".to_string());
        }

        Ok((bank, self.upi_id.clone()))
    }
}

#[derive(Deserialize)]
pub struct CreditRequest {
    pub amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_bank_details_accepted() {
        let details = KycDetails {
            account_holder: Some("Jane".into()),
            account_number: Some("1234567890".into()),
            ifsc: Some("HDFC0000123".into()),
            upi_id: None,
        };
        let (bank, upi) = details.payout_destination().unwrap();
        assert!(bank.is_some());
        assert!(upi.is_none());
    }

    #[test]
    fn upi_only_accepted() {
        let details = KycDetails {
            upi_id: Some("jane@upi".into()),
            ..Default::default()
        };
        let (bank, upi) = details.payout_destination().unwrap();
        assert!(bank.is_none());
        assert_eq!(upi.as_deref(), Some("jane@upi"));
    }

    #[test]
    fn partial_bank_details_rejected() {
        let details = KycDetails {
            account_number: Some("1234567890".into()),
            ..Default::default()
        };
        assert!(details.payout_destination().is_err());
    }

    #[test]
    fn no_destination_rejected() {
        assert!(KycDetails::default().payout_destination().is_err());
    }
}
