use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::TranscriptError;

/// Status and body of an upstream reply
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound HTTP calls made by the pipeline
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET an HTML page with the browser-like header set
    async fn get_page(&self, url: &str) -> Result<UpstreamResponse, TranscriptError>;

    /// POST a JSON document
    async fn post_json(&self, url: &str, body: &Value) -> Result<UpstreamResponse, TranscriptError>;
}

/// Production transport backed by a single reqwest client
pub struct ReqwestTransport {
    client: reqwest::Client,
    page_headers: HeaderMap,
    api_headers: HeaderMap,
}

impl ReqwestTransport {
    /// Build the client and the static header sets once
    pub fn new(upstream: &UpstreamConfig) -> anyhow::Result<Self> {
        let user_agent = HeaderValue::from_str(&upstream.user_agent)?;
        let accept_language = HeaderValue::from_str(&upstream.accept_language)?;

        let mut page_headers = HeaderMap::new();
        page_headers.insert(USER_AGENT, user_agent.clone());
        page_headers.insert(ACCEPT_LANGUAGE, accept_language.clone());
        page_headers.insert(ACCEPT, HeaderValue::from_str(&upstream.accept)?);

        let mut api_headers = HeaderMap::new();
        api_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        api_headers.insert(USER_AGENT, user_agent);
        api_headers.insert(ACCEPT_LANGUAGE, accept_language);

        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            page_headers,
            api_headers,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_page(&self, url: &str) -> Result<UpstreamResponse, TranscriptError> {
        let response = self
            .client
            .get(url)
            .headers(self.page_headers.clone())
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(UpstreamResponse { status, body })
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<UpstreamResponse, TranscriptError> {
        let response = self
            .client
            .post(url)
            .headers(self.api_headers.clone())
            .body(serde_json::to_vec(body)?)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(UpstreamResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_success_range() {
        assert!(UpstreamResponse::new(200, "").is_success());
        assert!(UpstreamResponse::new(204, "").is_success());
        assert!(!UpstreamResponse::new(302, "").is_success());
        assert!(!UpstreamResponse::new(429, "").is_success());
    }

    #[test]
    fn test_header_sets_follow_config() {
        let config = Config::default();
        let transport = ReqwestTransport::new(&config.upstream).unwrap();

        assert_eq!(
            transport.page_headers.get(USER_AGENT).unwrap(),
            config.upstream.user_agent.as_str()
        );
        assert_eq!(
            transport.page_headers.get(ACCEPT).unwrap(),
            config.upstream.accept.as_str()
        );
        assert!(transport.api_headers.get(ACCEPT).is_none());
        assert_eq!(
            transport.api_headers.get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_rejects_invalid_header_value() {
        let mut config = Config::default();
        config.upstream.user_agent = "bad\nagent".to_string();
        assert!(ReqwestTransport::new(&config.upstream).is_err());
    }

    #[tokio::test]
    async fn test_connection_error_omits_request_url() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!(
            "http://{}/youtubei/v1/get_transcript?key=SECRETKEY",
            listener.local_addr().unwrap()
        );
        drop(listener);

        let transport = ReqwestTransport::new(&Config::default().upstream).unwrap();
        let err = transport
            .post_json(&url, &serde_json::json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, TranscriptError::Transport(_)));
        let message = err.to_string();
        assert!(!message.contains("SECRETKEY"), "leaked: {}", message);
        assert!(!message.contains("127.0.0.1"), "leaked: {}", message);
    }
}
