use serde::{Deserialize, Serialize};

/// Status value the service uses to flag a failed request.
const ERROR_STATUS: &str = "error";

/// Response wrapper shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some(ERROR_STATUS)
    }

    /// Message from the service, or `fallback` when none was sent
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope() {
        let json = r#"{"status":"error","message":"Username already exists"}"#;
        let env: Envelope<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert!(env.is_error());
        assert!(env.data.is_none());
        assert_eq!(env.message_or("failed"), "Username already exists");
    }

    #[test]
    fn test_success_envelope_without_message() {
        let json = r#"{"status":"success","data":[1,2,3]}"#;
        let env: Envelope<Vec<i32>> = serde_json::from_str(json).unwrap();
        assert!(!env.is_error());
        assert_eq!(env.data, Some(vec![1, 2, 3]));
        assert_eq!(env.message_or("Done"), "Done");
    }
}
