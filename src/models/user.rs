use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow, JsonSchema)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub password: String,
    pub email: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, JsonSchema)]
pub struct UserCreateRequest {
    #[validate(custom(function = "validate_no_nul"))]
    pub first_name: Option<String>,
    #[validate(custom(function = "validate_no_nul"))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, message = "nickname is required"), custom(function = "validate_no_nul"))]
    pub nickname: String,
    #[validate(length(min = 1, message = "password is required"), custom(function = "validate_no_nul"))]
    pub password: String,
    #[validate(length(min = 1, message = "email is required"), custom(function = "validate_no_nul"))]
    pub email: String,
    #[validate(custom(function = "validate_no_nul"))]
    pub country: Option<String>,
}

/// Partial update. `None` leaves the stored value untouched, `Some("")` clears it.
#[derive(Deserialize, Debug, Clone, Default, Validate, JsonSchema)]
pub struct UserUpdateRequest {
    #[validate(custom(function = "validate_no_nul"))]
    pub first_name: Option<String>,
    #[validate(custom(function = "validate_no_nul"))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, message = "nickname cannot be cleared"), custom(function = "validate_no_nul"))]
    pub nickname: Option<String>,
    #[validate(length(min = 1, message = "password cannot be cleared"), custom(function = "validate_no_nul"))]
    pub password: Option<String>,
    #[validate(length(min = 1, message = "email cannot be cleared"), custom(function = "validate_no_nul"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_no_nul"))]
    pub country: Option<String>,
}

/// Postgres text columns cannot store NUL.
fn validate_no_nul(value: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        return Err(ValidationError::new("nul_character").with_message("must not contain NUL characters".into()));
    }
    Ok(())
}

impl UserCreateRequest {
    /// Builds the record to persist, stamping identity and timestamps.
    pub fn to_user(&self, id: Uuid, now: DateTime<Utc>) -> User {
        User {
            id,
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            nickname: self.nickname.clone(),
            password: self.password.clone(),
            email: self.email.clone(),
            country: self.country.clone().unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl UserUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.nickname.is_none()
            && self.password.is_none()
            && self.email.is_none()
            && self.country.is_none()
    }

    /// Merges the present fields onto `user` and refreshes `updated_at`.
    pub fn apply_to(&self, user: &mut User, now: DateTime<Utc>) {
        let fields = [
            (&self.first_name, &mut user.first_name),
            (&self.last_name, &mut user.last_name),
            (&self.nickname, &mut user.nickname),
            (&self.password, &mut user.password),
            (&self.email, &mut user.email),
            (&self.country, &mut user.country),
        ];
        for (patch, stored) in fields {
            if let Some(value) = patch {
                stored.clone_from(value);
            }
        }
        user.updated_at = now;
    }
}

/// One page of users together with the pagination it was resolved with.
#[derive(Serialize, Deserialize, Debug, JsonSchema)]
pub struct UsersPage {
    #[serde(rename = "objects")]
    pub users: Vec<User>,
    pub page: i64,
    pub per_page: i64,
    pub total_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_user;
    use chrono::Duration;

    #[test]
    fn test_create_request_defaults_optional_fields_to_empty() {
        let request: UserCreateRequest = serde_json::from_value(serde_json::json!({
            "nickname": "genie",
            "password": "Jumanji",
            "email": "rwilliams@hollywood.fake"
        }))
        .unwrap();

        let now = Utc::now();
        let id = Uuid::new_v4();
        let user = request.to_user(id, now);
        assert_eq!(user.id, id);
        assert_eq!(user.first_name, "");
        assert_eq!(user.country, "");
        assert_eq!(user.created_at, now);
        assert_eq!(user.updated_at, now);
    }

    #[test]
    fn test_requests_reject_nul_characters() {
        let request = UserCreateRequest {
            first_name: None,
            last_name: None,
            nickname: "has\0tur".to_string(),
            password: "Carcosa".to_string(),
            email: "hastur@lost.space".to_string(),
            country: Some("U\0S".to_string()),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("nickname"));
        assert!(errors.field_errors().contains_key("country"));

        let patch = UserUpdateRequest {
            last_name: Some("\0".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().unwrap_err().field_errors().contains_key("last_name"));
    }

    #[test]
    fn test_create_request_rejects_empty_required_fields() {
        let request = UserCreateRequest {
            first_name: None,
            last_name: None,
            nickname: String::new(),
            password: "Carcosa".to_string(),
            email: "hastur@lost.space".to_string(),
            country: None,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("nickname"));
    }

    #[test]
    fn test_create_request_missing_required_field_fails_to_parse() {
        let parsed = serde_json::from_value::<UserCreateRequest>(serde_json::json!({
            "first_name": "Robin",
            "last_name": "Williams",
            "OPS": "OPS"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_update_request_emptiness() {
        assert!(UserUpdateRequest::default().is_empty());

        let patch: UserUpdateRequest = serde_json::from_value(serde_json::json!({ "country": "FR" })).unwrap();
        assert!(!patch.is_empty());

        // updated_at is owned by the service and never read from the payload
        let patch: UserUpdateRequest = serde_json::from_value(serde_json::json!({ "updated_at": "2020-01-01T00:00:00Z" })).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_update_request_null_is_treated_as_absent() {
        let patch: UserUpdateRequest = serde_json::from_value(serde_json::json!({ "country": null })).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_update_request_rejects_clearing_required_fields() {
        let patch = UserUpdateRequest {
            email: Some(String::new()),
            ..UserUpdateRequest::default()
        };
        assert!(patch.validate().is_err());

        let patch = UserUpdateRequest {
            country: Some(String::new()),
            ..UserUpdateRequest::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_apply_to_only_overwrites_present_fields() {
        let mut user = sample_user("hastur", "hastur@lost.space", "UK");
        let original = user.clone();
        let later = original.updated_at + Duration::seconds(5);

        let patch = UserUpdateRequest {
            country: Some("FR".to_string()),
            ..UserUpdateRequest::default()
        };
        patch.apply_to(&mut user, later);

        assert_eq!(user.country, "FR");
        assert_eq!(user.updated_at, later);
        assert_eq!(user.created_at, original.created_at);
        assert_eq!(
            User {
                country: original.country.clone(),
                updated_at: original.updated_at,
                ..user.clone()
            },
            original
        );
    }

    #[test]
    fn test_users_page_serializes_objects_envelope() {
        let page = UsersPage {
            users: vec![sample_user("genie", "rwilliams@hollywood.fake", "US")],
            page: 1,
            per_page: 100,
            total_count: 1,
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["page"], 1);
        assert_eq!(json["per_page"], 100);
        assert_eq!(json["total_count"], 1);
        assert_eq!(json["objects"][0]["nickname"], "genie");
        assert!(json["objects"][0].get("created_at").is_some());
    }
}
