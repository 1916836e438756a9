//! HTTP Session Gateway
//!
//! `GET /getUsername` and `POST /logout`, both authorised with the bearer
//! token. HTTP status codes are not inspected; the JSON body decides. Calls are
//! single-shot with no client timeout.

use agrolens_core::{
    precondition_error, AgroError, AgroResult, AuthToken, BackendConfig, ErrorContext,
    SessionGateway, UserId,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::debug;

const USERNAME_ENDPOINT: &str = "getUsername";
const LOGOUT_ENDPOINT: &str = "logout";

const USERNAME_MISSING: &str = "Failed to fetch username";
const USERNAME_NETWORK: &str = "Failed to fetch username.";
const USER_ID_MISSING: &str = "User ID is not available.";
const LOGOUT_REJECTED: &str = "Logout failed.";
const LOGOUT_NETWORK: &str = "Logout failed. Please try again.";

#[derive(Debug, Deserialize)]
struct UsernameResponse {
    username: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct LogoutRequest<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct LogoutResponse {
    success: Option<bool>,
    message: Option<String>,
}

/// Gateway backed by `reqwest`
pub struct HttpSessionGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSessionGateway {
    pub fn new(config: &BackendConfig) -> AgroResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|e| AgroError::Config {
                message: format!("Invalid user agent: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_gateway").with_operation("create_client"),
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AgroError::Config {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_gateway").with_operation("create_client"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn bearer(token: &AuthToken) -> AgroResult<HeaderValue> {
        HeaderValue::from_str(&token.bearer()).map_err(|e| AgroError::Precondition {
            message: format!("Token is not a valid header value: {}", e),
            field: Some("authToken".to_string()),
            context: ErrorContext::new("http_gateway"),
        })
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(
        request: reqwest::RequestBuilder,
        generic_message: &str,
        operation: &str,
    ) -> AgroResult<T> {
        let network = |e: reqwest::Error| AgroError::Network {
            message: generic_message.to_string(),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_gateway").with_operation(operation),
        };

        let response = request.send().await.map_err(network)?;
        debug!(operation, status = %response.status(), "Backend responded");
        response.json::<T>().await.map_err(network)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn application_error(message: Option<String>, fallback: &str, operation: &str) -> AgroError {
    AgroError::Application {
        message: non_empty(message).unwrap_or_else(|| fallback.to_string()),
        context: ErrorContext::new("http_gateway").with_operation(operation),
    }
}

#[async_trait]
impl SessionGateway for HttpSessionGateway {
    async fn resolve_display_name(&self, token: &AuthToken) -> AgroResult<String> {
        let request = self
            .client
            .get(self.endpoint(USERNAME_ENDPOINT))
            .header(AUTHORIZATION, Self::bearer(token)?);

        let body: UsernameResponse =
            Self::read_json(request, USERNAME_NETWORK, "resolve_display_name").await?;

        match non_empty(body.username) {
            Some(name) => Ok(name),
            None => Err(application_error(
                body.message,
                USERNAME_MISSING,
                "resolve_display_name",
            )),
        }
    }

    async fn terminate_session(
        &self,
        token: &AuthToken,
        user_id: Option<&UserId>,
    ) -> AgroResult<()> {
        let Some(user_id) = user_id else {
            return Err(precondition_error!(USER_ID_MISSING, "use_id", "http_gateway"));
        };

        let request = self
            .client
            .post(self.endpoint(LOGOUT_ENDPOINT))
            .header(AUTHORIZATION, Self::bearer(token)?)
            .json(&LogoutRequest {
                user_id: user_id.as_str(),
            });

        let body: LogoutResponse =
            Self::read_json(request, LOGOUT_NETWORK, "terminate_session").await?;

        if body.success == Some(true) {
            Ok(())
        } else {
            Err(application_error(
                body.message,
                LOGOUT_REJECTED,
                "terminate_session",
            ))
        }
    }
}
