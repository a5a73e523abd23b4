use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;

/// Full user row, digest included. Only login needs the digest.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[sqlx(rename = "password")]
    pub password_hash: String, // Argon2 digest, not exposed in JSON
    pub profile_picture: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Public projection of a user: every column except the password.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            profile_picture: u.profile_picture,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Insert payload. `password_hash` must already be a digest.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub profile_picture: Option<String>,
}

impl NewUser {
    /// Rejects empty required columns, mirroring the NOT NULL constraints.
    pub fn check_required(&self) -> Result<(), UserError> {
        if self.name.is_empty() {
            return Err(UserError::MissingField("name"));
        }
        if self.email.is_empty() {
            return Err(UserError::MissingField("email"));
        }
        if self.password_hash.is_empty() {
            return Err(UserError::MissingField("password"));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("email already registered: {0}")]
    DuplicateEmail(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample() -> User {
        User {
            id: 7,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            profile_picture: Some("ada.png".into()),
            created_at: datetime!(2024-01-02 03:04:05 UTC),
            updated_at: datetime!(2024-01-02 03:04:05 UTC),
        }
    }

    #[test]
    fn user_json_omits_password_and_uses_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["profilePicture"], "ada.png");
        assert_eq!(json["createdAt"], "2024-01-02T03:04:05Z");
    }

    #[test]
    fn profile_projection_keeps_public_fields() {
        let profile = UserProfile::from(sample());
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("ada@example.com"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn missing_profile_picture_serializes_as_null() {
        let mut user = sample();
        user.profile_picture = None;
        let json = serde_json::to_value(UserProfile::from(user)).unwrap();
        assert!(json["profilePicture"].is_null());
    }

    #[test]
    fn check_required_names_the_empty_field() {
        let mut new = NewUser {
            name: "Ada".into(),
            email: String::new(),
            password_hash: "digest".into(),
            profile_picture: None,
        };
        assert!(matches!(new.check_required(), Err(UserError::MissingField("email"))));
        new.email = "ada@example.com".into();
        assert!(new.check_required().is_ok());
    }
}
