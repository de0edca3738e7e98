use crate::error::{scrape_error, SyncResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Where the events listing markup comes from
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch the raw listing page
    async fn fetch_page(&self) -> SyncResult<String>;
}

/// Fetches the listing page over HTTP(S)
pub struct HttpEventSource {
    client: Client,
    url: String,
}

impl HttpEventSource {
    pub fn new(url: impl Into<String>) -> SyncResult<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Like `new`, with a custom whole-request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn fetch_page(&self) -> SyncResult<String> {
        info!("Fetching events page {}", self.url);

        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(scrape_error(&format!("HTTP {} for {}", status, self.url)));
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::sync_driver::RetryPolicy;
    use crate::error::{Error, NetworkErrorKind};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_page_returns_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&mock_server)
            .await;

        let source = HttpEventSource::new(format!("{}/events", mock_server.uri())).unwrap();

        assert_eq!(source.fetch_page().await.unwrap(), "<html></html>");
    }

    #[tokio::test]
    async fn test_fetch_page_status_error_is_not_network() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let source = HttpEventSource::new(format!("{}/events", mock_server.uri())).unwrap();

        let err = source.fetch_page().await.unwrap_err();
        assert!(matches!(err, Error::Scrape(_)));
        assert_eq!(err.network_kind(), None);
    }

    #[tokio::test]
    async fn test_slow_response_is_retryable_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html></html>")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let source = HttpEventSource::with_timeout(
            format!("{}/events", mock_server.uri()),
            Duration::from_millis(100),
        )
        .unwrap();

        let err = source.fetch_page().await.unwrap_err();
        assert_eq!(err.network_kind(), Some(NetworkErrorKind::Timeout));
        assert!(RetryPolicy::default().is_retryable(&err));
    }

    #[tokio::test]
    async fn test_refused_connection_is_connect_error() {
        // Grab a free port, then close it so nothing is listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpEventSource::new(format!("http://{}/events", addr)).unwrap();

        let err = source.fetch_page().await.unwrap_err();
        assert_eq!(err.network_kind(), Some(NetworkErrorKind::Connect));
        assert!(!RetryPolicy::default().is_retryable(&err));
    }
}
