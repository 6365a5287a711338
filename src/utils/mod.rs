pub mod crypto;
pub mod email;
pub mod error;
pub mod hashing;
pub mod helpers;
pub mod model;
pub mod password_validation;
pub mod uploads;
pub mod whatsapp;
