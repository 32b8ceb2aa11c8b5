use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use super::models::{ApiError, Balance};
use crate::api::BalanceSource;
use tracing::{debug, warn};

/// Wise API client scoped to a single profile
pub struct WiseClient {
    http_client: HttpClient,
    api_key: String,
    profile_id: String,
    base_url: String,
    log_raw_body: bool,
}

impl WiseClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.wise.com";

    /// Create a new client against `base_url`, normally [`Self::DEFAULT_BASE_URL`]
    pub fn with_base_url(api_key: String, profile_id: String, base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            profile_id,
            base_url: base_url.trim_end_matches('/').to_string(),
            log_raw_body: false,
        }
    }

    /// Log every upstream body at debug level.
    ///
    /// Bodies contain account balances, so this stays off unless asked for.
    pub fn log_raw_body(mut self, enabled: bool) -> Self {
        self.log_raw_body = enabled;
        self
    }

    /// Create default headers with authorization
    fn create_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let auth_value = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| ApiError::Request(format!("Failed to create auth header: {}", e)))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    fn balances_url(&self) -> String {
        format!(
            "{}/v4/profiles/{}/balances?types=STANDARD",
            self.base_url, self.profile_id
        )
    }

    /// Map a non-success status to an error, keeping the upstream body for the logs
    fn error_for_status(status: reqwest::StatusCode, body_text: String) -> ApiError {
        let status_code = status.as_u16();

        match status_code {
            401 => ApiError::Unauthorized(body_text),
            403 => ApiError::Forbidden(body_text),
            404 => ApiError::NotFound(body_text),
            429 => {
                warn!("Rate limited by Wise API");
                ApiError::RateLimited(body_text)
            }
            500..=599 => {
                warn!("Wise server error {}: {}", status_code, body_text);
                ApiError::Server(status_code, body_text)
            }
            _ => ApiError::Http(status_code, body_text),
        }
    }

    /// GET /v4/profiles/{profile_id}/balances?types=STANDARD
    ///
    /// Retrieves the standard (non-savings) balances of the configured profile,
    /// in the order Wise returns them.
    ///
    /// # Returns
    /// * `Ok(Vec<Balance>)` - Balances of the profile, possibly empty
    /// * `Err(ApiError)` - Network, status or payload error
    pub async fn get_balances(&self) -> Result<Vec<Balance>, ApiError> {
        let url = self.balances_url();
        let headers = self.create_headers()?;

        let response = self.http_client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| ApiError::Request(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(format!("Failed to read response body: {}", e)))?;

        if self.log_raw_body {
            debug!("Raw JSON response: {}", body_text);
        } else {
            debug!("Wise responded {} with {} bytes", status, body_text.len());
        }

        if !status.is_success() {
            return Err(Self::error_for_status(status, body_text));
        }

        serde_json::from_str::<Vec<Balance>>(&body_text)
            .map_err(|e| ApiError::Deserialization(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl BalanceSource for WiseClient {
    async fn fetch_balances(&self) -> Result<Vec<Balance>, ApiError> {
        self.get_balances().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap as AxumHeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;

    const BODY: &str = r#"[
        {"currency":"USD","totalWorth":{"value":12.5}},
        {"currency":"EUR","totalWorth":{"value":3.0}}
    ]"#;

    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Mock upstream that only answers when called the way Wise expects
    async fn strict_balances(
        Path(profile_id): Path<String>,
        Query(query): Query<HashMap<String, String>>,
        headers: AxumHeaderMap,
    ) -> (StatusCode, String) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if auth != "Bearer secret-key" {
            return (StatusCode::UNAUTHORIZED, r#"{"error":"invalid_token"}"#.to_string());
        }
        if profile_id != "42" || query.get("types").map(String::as_str) != Some("STANDARD") {
            return (StatusCode::NOT_FOUND, "no such profile".to_string());
        }
        (StatusCode::OK, BODY.to_string())
    }

    fn client_for(base_url: String, api_key: &str) -> WiseClient {
        WiseClient::with_base_url(api_key.to_string(), "42".to_string(), base_url)
    }

    #[tokio::test]
    async fn test_get_balances_sends_bearer_and_profile() {
        let app = Router::new().route("/v4/profiles/:profile_id/balances", get(strict_balances));
        let base = spawn_upstream(app).await;

        let balances = client_for(base, "secret-key").get_balances().await.unwrap();

        assert_eq!(
            balances,
            vec![Balance::new("USD", 12.5), Balance::new("EUR", 3.0)]
        );
    }

    #[tokio::test]
    async fn test_get_balances_trailing_slash_in_base() {
        let app = Router::new().route("/v4/profiles/:profile_id/balances", get(strict_balances));
        let base = spawn_upstream(app).await;

        let balances = client_for(format!("{}/", base), "secret-key")
            .log_raw_body(true)
            .get_balances()
            .await
            .unwrap();

        assert_eq!(balances.len(), 2);
    }

    #[tokio::test]
    async fn test_wrong_key_maps_to_unauthorized() {
        let app = Router::new().route("/v4/profiles/:profile_id/balances", get(strict_balances));
        let base = spawn_upstream(app).await;

        let err = client_for(base, "wrong-key").get_balances().await.unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_malformed_body_is_deserialization_error() {
        let app = Router::new().route(
            "/v4/profiles/:profile_id/balances",
            get(|| async { r#"{"not":"an array"}"# }),
        );
        let base = spawn_upstream(app).await;

        let err = client_for(base, "secret-key").get_balances().await.unwrap_err();

        assert!(matches!(err, ApiError::Deserialization(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_balance_without_total_worth_is_zero() {
        let app = Router::new().route(
            "/v4/profiles/:profile_id/balances",
            get(|| async { r#"[{"currency":"EUR"},{"currency":"USD","totalWorth":{"value":1.5}}]"# }),
        );
        let base = spawn_upstream(app).await;

        let balances = client_for(base, "secret-key").get_balances().await.unwrap();

        assert_eq!(
            balances,
            vec![Balance::new("EUR", 0.0), Balance::new("USD", 1.5)]
        );
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let app = Router::new().route(
            "/v4/profiles/:profile_id/balances",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let base = spawn_upstream(app).await;

        let err = client_for(base, "secret-key").get_balances().await.unwrap_err();

        match err {
            ApiError::Server(code, body) => {
                assert_eq!(code, 502);
                assert_eq!(body, "upstream down");
            }
            other => panic!("expected server error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_request_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = client_for(format!("http://127.0.0.1:{}", port), "secret-key")
            .get_balances()
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Request(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_invalid_api_key_characters() {
        let err = client_for("http://127.0.0.1:1".to_string(), "bad\nkey")
            .get_balances()
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Request(_)), "got {:?}", err);
    }
}
