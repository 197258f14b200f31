//! User model, actor identity and bearer token claims

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Short user representation (users are owned by the identity provider)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserShort {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl UserShort {
    /// "First Last", falling back to the username when both are blank
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// SQL expression producing the same display name as [`UserShort::display_name`]
/// for a `users` table aliased as `alias`.
pub fn display_name_sql(alias: &str) -> String {
    format!(
        "COALESCE(NULLIF(TRIM({a}.first_name || ' ' || {a}.last_name), ''), {a}.username)",
        a = alias
    )
}

/// The user performing an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Actor {
    pub id: i32,
    pub name: String,
}

/// JWT claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    /// Display name of the user
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn actor(&self) -> Actor {
        Actor {
            id: self.user_id,
            name: self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn user(first: &str, last: &str) -> UserShort {
        UserShort {
            id: 1,
            username: "jane.smith".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(user("Jane", "Smith").display_name(), "Jane Smith");
        assert_eq!(user("Jane", "").display_name(), "Jane");
        assert_eq!(user("", "").display_name(), "jane.smith");
    }

    #[test]
    fn test_token_roundtrip() {
        let now = Utc::now();
        let claims = UserClaims {
            sub: "jane.smith".to_string(),
            user_id: 7,
            name: "Jane Smith".to_string(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };
        let token = claims.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.actor(), Actor { id: 7, name: "Jane Smith".to_string() });
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }
}
