use rand::Rng;
use regex::Regex;

use crate::utils::error::CustomError;

/// Generate a 6-digit OTP code
pub fn generate_otp_code() -> String {
    let mut rng = rand::rng();
    let code: u32 = rng.random_range(100000..999999);
    code.to_string()
}

/// OTP expiration time in minutes
pub const OTP_EXPIRATION_MINUTES: i64 = 10;

/// Domains rejected for throwaway signups and for brand/agency accounts
const DISPOSABLE_DOMAINS: &[&str] = &[
    "mailinator.com",
    "guerrillamail.com",
    "10minutemail.com",
    "tempmail.com",
    "throwawaymail.com",
    "yopmail.com",
    "trashmail.com",
];

const FREE_MAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "hotmail.com",
    "icloud.com",
    "aol.com",
    "proton.me",
    "protonmail.com",
    "rediffmail.com",
];

pub fn validate_email_format(email: &str) -> Result<(), CustomError> {
    let re = Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .map_err(|e| CustomError::InternalServerError(e.to_string()))?;
    if !re.is_match(email) {
        return Err(CustomError::ValidationError(
            "Invalid email address".to_string(),
        ));
    }
    Ok(())
}

fn email_domain(email: &str) -> Option<&str> {
    email.rsplit_once('@').map(|(_, domain)| domain)
}

/// Reject throwaway email providers
pub fn validate_not_disposable(email: &str) -> Result<(), CustomError> {
    let domain = email_domain(email)
        .ok_or_else(|| CustomError::ValidationError("Invalid email address".to_string()))?
        .to_lowercase();
    if DISPOSABLE_DOMAINS.contains(&domain.as_str()) {
        return Err(CustomError::ValidationError(
            "Disposable email addresses are not allowed".to_string(),
        ));
    }
    Ok(())
}

/// Brand and agency accounts must sign up with a company email
pub fn validate_business_email(email: &str) -> Result<(), CustomError> {
    let domain = email_domain(email)
        .ok_or_else(|| CustomError::ValidationError("Invalid email address".to_string()))?
        .to_lowercase();
    if FREE_MAIL_DOMAINS.contains(&domain.as_str()) {
        return Err(CustomError::ValidationError(
            "Please use your company email address".to_string(),
        ));
    }
    Ok(())
}

/// Phone numbers are stored as digits with an optional leading +
pub fn validate_phone_number(phone: &str) -> Result<(), CustomError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.len() < 8 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CustomError::ValidationError(
            "Invalid phone number".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_code_is_six_digits() {
        for _ in 0..50 {
            let code = generate_otp_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn email_format_accepts_normal_addresses() {
        assert!(validate_email_format("jane@acme.co.in").is_ok());
        assert!(validate_email_format("a.b+tag@example.com").is_ok());
    }

    #[test]
    fn email_format_rejects_garbage() {
        assert!(validate_email_format("not-an-email").is_err());
        assert!(validate_email_format("missing@tld").is_err());
        assert!(validate_email_format("@example.com").is_err());
    }

    #[test]
    fn disposable_domains_are_rejected() {
        assert!(validate_not_disposable("x@mailinator.com").is_err());
        assert!(validate_not_disposable("x@YOPMAIL.com").is_err());
        assert!(validate_not_disposable("x@acme.com").is_ok());
    }

    #[test]
    fn business_email_rejects_free_providers() {
        assert!(validate_business_email("brand@gmail.com").is_err());
        assert!(validate_business_email("brand@acme.io").is_ok());
    }

    #[test]
    fn phone_number_validation() {
        assert!(validate_phone_number("+919876543210").is_ok());
        assert!(validate_phone_number("9876543210").is_ok());
        assert!(validate_phone_number("12345").is_err());
        assert!(validate_phone_number("+91-98765").is_err());
    }
}
