use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// Plain `{"message": ...}` body used by probes, catchers and errors.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn to_json(&self) -> String {
        serde_json::json!({ "message": self.message }).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_json_escapes_message() {
        let body = MessageResponse::new(r#"Invalid payload received: "nickname""#).to_json();
        let parsed: MessageResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.message, r#"Invalid payload received: "nickname""#);
    }
}
