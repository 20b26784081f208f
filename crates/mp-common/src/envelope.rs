//! Response envelopes used by every backend endpoint.

use serde::{Deserialize, Deserializer, Serialize};

use crate::pagination::PageMeta;

mod bool_or_string {
    use serde::{Deserialize, Deserializer};

    /// The backend has sent `success` both as a JSON bool and as `"true"`.
    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum BoolOrString {
            Bool(bool),
            Str(String),
        }

        match Option::<BoolOrString>::deserialize(deserializer)? {
            Some(BoolOrString::Bool(b)) => Ok(Some(b)),
            Some(BoolOrString::Str(s)) => Ok(Some(s.eq_ignore_ascii_case("true"))),
            None => Ok(None),
        }
    }
}

/// Standard `{ success, data, message }` wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default, deserialize_with = "bool_or_string::deserialize_opt")]
    pub success: Option<bool>,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: Some(true),
            data: Some(data),
            message: None,
        }
    }

    /// A missing `success` field counts as success; only an explicit `false` fails.
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(true)
    }
}

/// Paginated collection: `{ data: [..], pagination: {..} }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    #[serde(default, deserialize_with = "bool_or_string::deserialize_opt")]
    pub success: Option<bool>,
    pub data: Vec<T>,
    pub pagination: PageMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of an error response. Only `message` is relied upon.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

impl<'de> Deserialize<'de> for ErrorBody {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Tolerate non-string messages (some validation errors send arrays).
        let value = serde_json::Value::deserialize(deserializer)?;
        let message = match value.get("message") {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(serde_json::Value::Array(items)) => {
                let parts: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(", "))
                }
            }
            _ => None,
        };
        Ok(Self { message })
    }
}

impl ErrorBody {
    /// Parse a raw response body, yielding the server message if there is one.
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_as_string() {
        let resp: ApiResponse<u32> =
            serde_json::from_value(json!({"success": "true", "data": 7})).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.data, Some(7));

        let resp: ApiResponse<u32> =
            serde_json::from_value(json!({"success": false, "message": "nope"})).unwrap();
        assert!(!resp.is_success());
        assert!(resp.data.is_none());
    }

    #[test]
    fn test_collection_shape() {
        let coll: Collection<String> = serde_json::from_value(json!({
            "data": ["a", "b"],
            "pagination": {"page": 1, "limit": 20, "total": 2, "totalPages": 1}
        }))
        .unwrap();
        assert_eq!(coll.data.len(), 2);
        assert_eq!(coll.pagination.total_pages, 1);
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            ErrorBody::message_from(r#"{"message":"Insufficient balance"}"#).as_deref(),
            Some("Insufficient balance")
        );
        assert_eq!(
            ErrorBody::message_from(r#"{"message":["amount required","term required"]}"#)
                .as_deref(),
            Some("amount required, term required")
        );
        assert!(ErrorBody::message_from(r#"{"message":"  "}"#).is_none());
        assert!(ErrorBody::message_from("<html>bad gateway</html>").is_none());
    }
}
