//! Wire envelope for the gateway's request/reply convention.
//!
//! The daemon owns the real protocol; this module only models the client's
//! view of it: one request object per call, one reply object back, where a
//! zero `code` means `data` is a tabular payload and any other code means
//! `data` is a human-readable refusal message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of a tabular gateway payload: field name → value, passed through
/// verbatim with no locally-defined schema.
pub type Record = serde_json::Map<String, Value>;

/// A single request to the gateway.
#[derive(Debug, Serialize)]
pub struct Request<'a> {
    pub id: u64,
    pub method: &'a str,
    pub params: &'a Value,
}

/// A single reply from the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct Reply {
    #[serde(default)]
    pub id: u64,
    pub code: i64,
    #[serde(default)]
    pub data: Value,
}

impl Reply {
    /// A successful reply carrying `data` (typically an array of row objects).
    pub fn success(data: Value) -> Self {
        Reply { id: 0, code: 0, data }
    }

    /// A refusal carrying the daemon's message.
    pub fn failure(code: i64, message: &str) -> Self {
        Reply {
            id: 0,
            code,
            data: Value::String(message.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// The refusal message for a non-zero code.
    pub fn message(&self) -> String {
        match &self.data {
            Value::String(s) => s.clone(),
            Value::Null => format!("gateway refused request (code {})", self.code),
            other => other.to_string(),
        }
    }

    /// Map the code-plus-payload convention to a tagged result: ordered rows
    /// on success, the daemon's message on refusal.
    ///
    /// An empty or absent payload is a success with zero rows, never an
    /// error. A bare object payload counts as a single row.
    pub fn into_rows(self) -> std::result::Result<Vec<Record>, String> {
        if self.code != 0 {
            return Err(self.message());
        }
        match self.data {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(record) => Some(record),
                    _ => None,
                })
                .collect()),
            Value::Object(record) => Ok(vec![record]),
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_rows_preserve_count_and_keys() {
        let reply = Reply::success(json!([
            { "code": "HK.00700", "last_price": 612.5 },
            { "code": "US.AAPL", "last_price": 231.1 },
        ]));

        let rows = reply.into_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains_key("code"));
        assert!(rows[1].contains_key("last_price"));
    }

    #[test]
    fn empty_payload_is_zero_rows_not_an_error() {
        assert!(Reply::success(json!([])).into_rows().unwrap().is_empty());
        assert!(Reply::success(Value::Null).into_rows().unwrap().is_empty());
    }

    #[test]
    fn bare_object_payload_is_one_row() {
        let rows = Reply::success(json!({ "max_cash_buy": 400 }))
            .into_rows()
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn nonzero_code_surfaces_the_message() {
        let err = Reply::failure(1001, "unknown symbol").into_rows().unwrap_err();
        assert_eq!(err, "unknown symbol");
    }

    #[test]
    fn nonzero_code_without_message_still_errors() {
        let reply = Reply {
            id: 7,
            code: 1002,
            data: Value::Null,
        };
        let err = reply.into_rows().unwrap_err();
        assert!(err.contains("1002"));
    }

    #[test]
    fn reply_deserializes_with_missing_data() {
        let reply: Reply = serde_json::from_str(r#"{ "id": 3, "code": 0 }"#).unwrap();
        assert!(reply.is_success());
        assert!(reply.into_rows().unwrap().is_empty());
    }
}
