use serde::Deserialize;

use crate::user::model::{Role, UserStatus};

#[derive(Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl UserListQuery {
    pub fn role_filter(&self) -> Result<Option<Role>, String> {
        match self.role.as_deref() {
            None => Ok(None),
            Some(raw) => Role::parse(raw)
                .map(Some)
                .ok_or_else(|| format!("Unknown role: {}", raw)),
        }
    }

    pub fn status_filter(&self) -> Result<Option<UserStatus>, String> {
        match self.status.as_deref() {
            None => Ok(None),
            Some("pending") => Ok(Some(UserStatus::Pending)),
            Some("approved") => Ok(Some(UserStatus::Approved)),
            Some("rejected") => Ok(Some(UserStatus::Rejected)),
            Some(raw) => Err(format!("Unknown status: {}", raw)),
        }
    }
}

#[derive(Deserialize)]
pub struct StatusDecisionRequest {
    /// "approved" or "rejected"
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_role_and_status_filters() {
        let query = UserListQuery {
            role: Some("influencer".to_string()),
            status: Some("pending".to_string()),
            page: None,
            limit: None,
        };
        assert_eq!(query.role_filter().unwrap(), Some(Role::Influencer));
        assert_eq!(query.status_filter().unwrap(), Some(UserStatus::Pending));
    }

    #[test]
    fn rejects_unknown_filters() {
        let query = UserListQuery {
            role: Some("superuser".to_string()),
            status: Some("frozen".to_string()),
            page: None,
            limit: None,
        };
        assert!(query.role_filter().is_err());
        assert!(query.status_filter().is_err());
    }

    #[test]
    fn absent_filters_mean_no_constraint() {
        let query = UserListQuery {
            role: None,
            status: None,
            page: None,
            limit: None,
        };
        assert_eq!(query.role_filter().unwrap(), None);
        assert_eq!(query.status_filter().unwrap(), None);
    }
}
