use serde::{Deserialize, Deserializer, Serialize};

/// User identity returned by the verify endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyData {
    pub user: VerifiedUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token: String,
}

/// Sign-in payload. The service returns the issued token wrapped in a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInData {
    #[serde(default)]
    pub token: Vec<TokenRecord>,
}

impl SignInData {
    pub fn first_token(&self) -> Option<&str> {
        self.token
            .first()
            .map(|t| t.token.as_str())
            .filter(|t| !t.is_empty())
    }
}

/// Profile update payload carrying the re-issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileData {
    pub token: String,
}

/// Accept an identifier sent either as a JSON string or a JSON number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verified_user_numeric_id() {
        let json = r#"{"id": 42, "name": "Ada Lovelace", "username": "ada"}"#;
        let user: VerifiedUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.username, "ada");
    }

    #[test]
    fn test_verified_user_string_id() {
        let json = r#"{"id": "7f3c", "name": "Grace", "username": "grace"}"#;
        let user: VerifiedUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "7f3c");
    }

    #[test]
    fn test_sign_in_first_token() {
        let json = r#"{"token": [{"token": "abc123"}, {"token": "older"}]}"#;
        let data: SignInData = serde_json::from_str(json).unwrap();
        assert_eq!(data.first_token(), Some("abc123"));

        let empty: SignInData = serde_json::from_str(r#"{"token": []}"#).unwrap();
        assert_eq!(empty.first_token(), None);
    }
}
