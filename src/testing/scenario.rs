//! Request scenarios against a router, without starting a server.
//!
//! # Example
//!
//! ```rust,ignore
//! use ledgerdesk::testing;
//!
//! let body: serde_json::Value = testing::get(router, "/api/invoices")
//!     .with_query(&[("status", "paid"), ("per_page", "5")])
//!     .execute()
//!     .await
//!     .assert_ok()
//!     .json()
//!     .await;
//! ```

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;

/// Test request builder.
pub struct Scenario {
    app: Router,
    request: Request<Body>,
}

impl Scenario {
    pub fn new(app: Router) -> Self {
        Self {
            app,
            request: Request::builder()
                .method(Method::GET)
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        *self.request.method_mut() = method;
        self
    }

    pub fn uri(mut self, uri: &str) -> Self {
        *self.request.uri_mut() = uri.parse().unwrap();
        self
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        use axum::http::HeaderName;
        self.request.headers_mut().insert(
            HeaderName::from_bytes(key.as_bytes()).unwrap(),
            value.parse().unwrap(),
        );
        self
    }

    /// Append percent-encoded query parameters, keeping any already present.
    pub fn with_query(mut self, params: &[(&str, &str)]) -> Self {
        let uri = self.request.uri().clone();
        let mut query_parts = vec![];

        if let Some(query) = uri.query() {
            query_parts.push(query.to_string());
        }
        for (key, value) in params {
            query_parts.push(format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            ));
        }

        let path = uri.path();
        let new_uri = if query_parts.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, query_parts.join("&"))
        };
        *self.request.uri_mut() = new_uri.parse().unwrap();
        self
    }

    pub fn json_body<T: Serialize>(mut self, body: &T) -> Self {
        let json = serde_json::to_string(body).unwrap();
        *self.request.body_mut() = Body::from(json);
        self.request
            .headers_mut()
            .insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        self
    }

    pub async fn execute(self) -> ScenarioAssert {
        let response = self.app.oneshot(self.request).await.unwrap();
        ScenarioAssert { response }
    }
}

/// Assertions over a scenario's response.
pub struct ScenarioAssert {
    response: axum::response::Response,
}

impl ScenarioAssert {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.response.status(),
            expected,
            "Expected status {}, got {}",
            expected,
            self.response.status()
        );
        self
    }

    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn assert_bad_request(self) -> Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    pub fn assert_unprocessable(self) -> Self {
        self.assert_status(StatusCode::UNPROCESSABLE_ENTITY)
    }

    pub fn assert_header(self, key: &str, expected: &str) -> Self {
        let value = self.header_value(key);
        assert_eq!(value, expected, "Header '{}' value mismatch", key);
        self
    }

    pub fn assert_header_contains(self, key: &str, fragment: &str) -> Self {
        let value = self.header_value(key);
        assert!(
            value.contains(fragment),
            "Header '{}' is '{}', expected it to contain '{}'",
            key,
            value,
            fragment
        );
        self
    }

    fn header_value(&self, key: &str) -> String {
        self.response
            .headers()
            .get(key)
            .unwrap_or_else(|| panic!("Header '{}' not found", key))
            .to_str()
            .unwrap()
            .to_string()
    }

    pub fn assert_json(self) -> Self {
        self.assert_header_contains(header::CONTENT_TYPE.as_str(), "application/json")
    }

    pub async fn body_bytes(self) -> Vec<u8> {
        axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    pub async fn body_string(self) -> String {
        String::from_utf8(self.body_bytes().await).unwrap()
    }

    pub async fn json<T: for<'de> Deserialize<'de>>(self) -> T {
        let bytes = self.body_bytes().await;
        serde_json::from_slice(&bytes).expect("Failed to parse JSON response")
    }

    /// Assert the value at a dotted path (`data.items.0.number`) equals `expected`.
    pub async fn assert_json_path(self, path: &str, expected: serde_json::Value) -> Self {
        let status = self.response.status();
        let bytes = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let actual = json_path_get(&json, path)
            .unwrap_or_else(|| panic!("Path '{}' not found in JSON: {}", path, json));
        assert_eq!(actual, &expected, "JSON path '{}' value mismatch", path);

        let mut response = axum::response::Response::new(Body::from(bytes));
        *response.status_mut() = status;
        Self { response }
    }

    pub fn response(self) -> axum::response::Response {
        self.response
    }
}

fn json_path_get<'a>(json: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = json;
    for part in path.split('.') {
        current = match part.parse::<usize>() {
            Ok(index) => current.get(index)?,
            Err(_) => current.get(part)?,
        };
    }
    Some(current)
}

pub fn get(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::GET).uri(uri)
}

pub fn post(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::POST).uri(uri)
}

pub fn put(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::PUT).uri(uri)
}

pub fn patch(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::PATCH).uri(uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, routing::get as axum_get};
    use serde_json::json;
    use std::collections::HashMap;

    async fn echo(
        axum::extract::Query(params): axum::extract::Query<HashMap<String, String>>,
    ) -> Json<serde_json::Value> {
        Json(json!({ "params": params }))
    }

    #[tokio::test]
    async fn test_query_is_percent_encoded() {
        let app = Router::new().route("/echo", axum_get(echo));

        get(app, "/echo?page=2")
            .with_query(&[("search", "Chloé & fils")])
            .execute()
            .await
            .assert_ok()
            .assert_json()
            .assert_json_path("params.search", json!("Chloé & fils"))
            .await
            .assert_json_path("params.page", json!("2"))
            .await;
    }

    #[test]
    fn test_json_path_get() {
        let value = json!({ "data": { "items": [{ "number": "FAC-1" }] } });
        assert_eq!(
            json_path_get(&value, "data.items.0.number"),
            Some(&json!("FAC-1"))
        );
        assert_eq!(json_path_get(&value, "data.missing"), None);
    }
}
