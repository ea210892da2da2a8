//! Typed HTTP wrapper over the backend's area endpoints.

use shared::protocol::{
    ErrorBody, ExitRequest, ExitResponse, JoinResponse, MoveRequest, MoveResponse,
    SessionResponse, StateResponse, SESSION_TOKEN_HEADER,
};
use shared::{Direction, MapDef};

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server rejected the request ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("no session established")]
    NoSession,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ApiClientError> {
        let token = self.token.as_ref().ok_or(ApiClientError::NoSession)?;
        Ok(request.header(SESSION_TOKEN_HEADER, token))
    }

    /// Decode a success body, or surface the server's error message.
    async fn check<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| status.to_string());
        Err(ApiClientError::Server {
            status: status.as_u16(),
            message,
        })
    }

    /// Establish an anonymous session; subsequent calls carry its token.
    pub async fn start_session(&mut self) -> Result<SessionResponse, ApiClientError> {
        let response = self.http.post(self.url("/api/session")).send().await?;
        let session: SessionResponse = Self::check(response).await?;
        self.token = Some(session.token.clone());
        Ok(session)
    }

    pub async fn map(&self) -> Result<MapDef, ApiClientError> {
        let response = self.http.get(self.url("/api/area/map")).send().await?;
        Self::check(response).await
    }

    pub async fn join(&self) -> Result<JoinResponse, ApiClientError> {
        let request = self.authed(self.http.post(self.url("/api/area/join")))?;
        Self::check(request.send().await?).await
    }

    pub async fn send_move(&self, direction: Direction) -> Result<MoveResponse, ApiClientError> {
        let request = self
            .authed(self.http.post(self.url("/api/area/move")))?
            .json(&MoveRequest {
                direction: direction.name().to_string(),
            });
        Self::check(request.send().await?).await
    }

    pub async fn state(&self) -> Result<StateResponse, ApiClientError> {
        let request = self.authed(self.http.get(self.url("/api/area/state")))?;
        Self::check(request.send().await?).await
    }

    /// Report a final position from local mode.
    pub async fn exit(
        &self,
        x: i32,
        y: i32,
        area_def_id: i64,
    ) -> Result<ExitResponse, ApiClientError> {
        let request = self
            .authed(self.http.post(self.url("/api/area/exit")))?
            .json(&ExitRequest { x, y, area_def_id });
        Self::check(request.send().await?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = ApiClient::new("http://localhost:8080/");
        assert_eq!(api.url("/api/area/map"), "http://localhost:8080/api/area/map");
    }

    #[test]
    fn test_requests_require_a_session() {
        let api = ApiClient::new("http://localhost:8080");
        assert!(api.token().is_none());
        let result = api.authed(api.http.post(api.url("/api/area/join")));
        assert!(matches!(result, Err(ApiClientError::NoSession)));
    }
}
