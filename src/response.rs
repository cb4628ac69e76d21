use std::collections::BTreeMap;

use serde::Serialize;

/// API Gateway proxy shaped result returned by both handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl HandlerResponse {
    pub fn ok<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status_code: 200,
            body: serde_json::to_string_pretty(payload)?,
            headers: BTreeMap::new(),
        })
    }

    pub fn with_json_headers(mut self) -> Self {
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.headers
            .insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        self
    }
}
