use crate::collector::{Collector, DeliveryError};
use crate::{Result, SyncError};
use panelcount_core::{CollectorEndpoint, DeliveryPayload};
use std::time::Duration;

const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: "panelcount".to_string(),
        }
    }
}

#[cfg_attr(not(feature = "http"), allow(dead_code))]
fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(feature = "http")]
mod imp {
    use super::{
        truncate_body, Collector, CollectorEndpoint, DeliveryError, DeliveryPayload, HttpOptions,
        Result, SyncError,
    };
    use reqwest::Client;
    use std::time::Duration;
    use url::Url;

    const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    #[derive(Debug, Clone)]
    pub struct HttpCollector {
        name: String,
        url: Url,
        client: Client,
    }

    impl HttpCollector {
        pub fn new(endpoint: &CollectorEndpoint, options: &HttpOptions) -> Result<Self> {
            let base = Url::parse(&endpoint.base_url)?;
            if !matches!(base.scheme(), "http" | "https") {
                return Err(SyncError::Parse(format!(
                    "collector {} url must use http or https",
                    endpoint.name
                )));
            }
            let url = base.join(&endpoint.path)?;
            let client = Client::builder()
                .user_agent(options.user_agent.as_str())
                .timeout(options.timeout)
                .connect_timeout(options.timeout.min(CONNECT_TIMEOUT))
                .build()?;
            Ok(Self {
                name: endpoint.name.clone(),
                url,
                client,
            })
        }

        pub fn url(&self) -> &str {
            self.url.as_str()
        }
    }

    impl Collector for HttpCollector {
        fn name(&self) -> &str {
            &self.name
        }

        async fn deliver(
            &self,
            payload: &DeliveryPayload,
        ) -> std::result::Result<(), DeliveryError> {
            payload
                .validate()
                .map_err(|err| DeliveryError::Invalid(err.to_string()))?;
            let response = self
                .client
                .post(self.url.clone())
                .json(payload)
                .send()
                .await
                .map_err(|err| DeliveryError::Transport(err.to_string()))?;

            let status = response.status();
            if status.is_success() {
                return Ok(());
            }
            let body = response.text().await.unwrap_or_default();
            Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body: truncate_body(&body),
            })
        }
    }
}

#[cfg(not(feature = "http"))]
mod imp {
    use super::{
        Collector, CollectorEndpoint, DeliveryError, DeliveryPayload, HttpOptions, Result,
        SyncError,
    };

    #[derive(Debug, Clone)]
    pub struct HttpCollector {
        name: String,
    }

    impl HttpCollector {
        pub fn new(_endpoint: &CollectorEndpoint, _options: &HttpOptions) -> Result<Self> {
            Err(SyncError::Unavailable(
                "http delivery requires the http feature".to_string(),
            ))
        }

        pub fn url(&self) -> &str {
            ""
        }
    }

    impl Collector for HttpCollector {
        fn name(&self) -> &str {
            &self.name
        }

        async fn deliver(
            &self,
            _payload: &DeliveryPayload,
        ) -> std::result::Result<(), DeliveryError> {
            Err(DeliveryError::Transport(
                "http delivery requires the http feature".to_string(),
            ))
        }
    }
}

pub use imp::HttpCollector;

#[cfg(test)]
mod tests {
    use super::truncate_body;

    #[test]
    fn truncates_long_error_bodies() {
        let body = "x".repeat(500);
        let out = truncate_body(&body);
        assert_eq!(out.len(), 203);
        assert!(out.ends_with("..."));
        assert_eq!(truncate_body("  bad request \n"), "bad request");
    }

    #[cfg(not(feature = "http"))]
    #[test]
    fn constructor_reports_missing_http_feature() {
        use super::{HttpCollector, HttpOptions};
        use crate::SyncError;
        use panelcount_core::CollectorEndpoint;

        let endpoint =
            CollectorEndpoint::new("panel", "http://127.0.0.1:8080", None).expect("endpoint");
        let err = HttpCollector::new(&endpoint, &HttpOptions::default()).expect_err("no http");
        assert!(matches!(err, SyncError::Unavailable(_)));
    }
}
