use serde::{Deserialize, Serialize};

/// Identity record returned by the backend's `/me` endpoint.
///
/// Only a handful of fields are read by the client; anything else the
/// backend sends is kept so the stored record round-trips unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserRecord {
    /// Best available name for display.
    pub fn display_name(&self) -> String {
        self.full_name
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or("unknown user")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallbacks() {
        let user: UserRecord = serde_json::from_str(r#"{"id": 7, "username": "ops", "email": "ops@example.com"}"#)
            .expect("parse user");
        assert_eq!(user.display_name(), "ops");

        let user: UserRecord = serde_json::from_str(r#"{"email": "ops@example.com"}"#).expect("parse user");
        assert_eq!(user.display_name(), "ops@example.com");

        assert_eq!(UserRecord::default().display_name(), "unknown user");
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let json = r#"{"id": "u-1", "username": "ops", "is_active": true}"#;
        let user: UserRecord = serde_json::from_str(json).expect("parse user");
        assert_eq!(user.extra.get("is_active"), Some(&serde_json::Value::Bool(true)));

        let back = serde_json::to_value(&user).expect("serialize user");
        assert_eq!(back["is_active"], serde_json::Value::Bool(true));
        assert_eq!(back["id"], serde_json::Value::String("u-1".into()));
    }
}
