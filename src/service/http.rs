//! HTTP client for the remote config store.
//!
//! # Responsibilities
//! - `GET` the configs resource and decode a [`DraftPayload`]
//! - `POST` a draft and decode the `{success}` reply
//! - Bound every attempt with a timeout; retry fetches on transient failures

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::timeout;
use url::Url;

use crate::config::{RetryConfig, ServiceConfig};
use crate::draft::{ConfigDraft, DraftPayload, MethodRegistry};
use crate::observability::metrics;
use crate::resilience::backoff::fetch_backoff;
use crate::resilience::retries::{is_retryable, max_fetch_attempts, AttemptFailure};
use crate::service::{ConfigService, ServiceError, SubmitResponse};

/// reqwest-backed [`ConfigService`].
#[derive(Clone)]
pub struct HttpConfigService {
    client: Client,
    endpoint: Url,
    methods_endpoint: Url,
    timeout_duration: Duration,
    retries: RetryConfig,
}

impl HttpConfigService {
    /// Build a client for `{base_url}{configs_path}`.
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let invalid = |e: &dyn std::fmt::Display| {
            ServiceError::Network(format!("invalid store URL '{}': {}", config.base_url, e))
        };
        let base = Url::parse(&config.base_url).map_err(|e| invalid(&e))?;
        if base.cannot_be_a_base() {
            return Err(invalid(&"not a hierarchical URL"));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| ServiceError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: resource_url(&base, &config.configs_path),
            methods_endpoint: resource_url(&base, &config.methods_path),
            timeout_duration: Duration::from_secs(config.timeout_secs),
            retries: config.retries.clone(),
        })
    }

    /// Resource URL every fetch and submit goes to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn methods_endpoint(&self) -> &Url {
        &self.methods_endpoint
    }

    /// Method catalog served next to the configs resource.
    pub async fn methods(&self) -> Result<MethodRegistry, ServiceError> {
        let request = self.client.get(self.methods_endpoint.clone()).send();
        let response = match timeout(self.timeout_duration, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(ServiceError::Network(e.to_string())),
            Err(_) => {
                return Err(ServiceError::Network(format!(
                    "methods request timed out after {} seconds",
                    self.timeout_duration.as_secs()
                )))
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Network(format!("store returned status {status}")));
        }

        let body = match timeout(self.timeout_duration, response.text()).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => return Err(ServiceError::Network(e.to_string())),
            Err(_) => {
                return Err(ServiceError::Network(
                    "timed out reading methods response".to_string(),
                ))
            }
        };
        MethodRegistry::from_json_str(&body).map_err(|e| ServiceError::Parse(e.to_string()))
    }

    async fn fetch_once(&self) -> Result<String, (AttemptFailure, ServiceError)> {
        let request = self.client.get(self.endpoint.clone()).send();
        let response = match timeout(self.timeout_duration, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return Err((AttemptFailure::Transport, ServiceError::Network(e.to_string())))
            }
            Err(_) => {
                return Err((
                    AttemptFailure::Transport,
                    ServiceError::Network(format!(
                        "fetch timed out after {} seconds",
                        self.timeout_duration.as_secs()
                    )),
                ))
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err((
                AttemptFailure::Status(status),
                ServiceError::Network(format!("store returned status {status}")),
            ));
        }

        match timeout(self.timeout_duration, response.text()).await {
            Ok(Ok(body)) => Ok(body),
            Ok(Err(e)) => Err((AttemptFailure::Transport, ServiceError::Network(e.to_string()))),
            Err(_) => Err((
                AttemptFailure::Transport,
                ServiceError::Network("timed out reading fetch response".to_string()),
            )),
        }
    }
}

#[async_trait]
impl ConfigService for HttpConfigService {
    async fn fetch(&self) -> Result<DraftPayload, ServiceError> {
        let max_attempts = max_fetch_attempts(&self.retries);
        let mut attempts = 0;

        let body = loop {
            attempts += 1;
            match self.fetch_once().await {
                Ok(body) => break body,
                Err((failure, err)) => {
                    if attempts < max_attempts && is_retryable(failure) {
                        let delay = fetch_backoff(attempts, &self.retries);
                        tracing::info!(
                            endpoint = %self.endpoint,
                            attempt = attempts,
                            delay = ?delay,
                            error = %err,
                            "Retrying config fetch"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(endpoint = %self.endpoint, attempts, error = %err, "Config fetch failed");
                    metrics::record_service_call("fetch", "network_error");
                    return Err(err);
                }
            }
        };

        match serde_json::from_str::<DraftPayload>(&body) {
            Ok(payload) => {
                metrics::record_service_call("fetch", "ok");
                Ok(payload)
            }
            Err(e) => {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "Config fetch returned malformed payload");
                metrics::record_service_call("fetch", "parse_error");
                Err(ServiceError::Parse(e.to_string()))
            }
        }
    }

    async fn submit(&self, draft: &ConfigDraft) -> Result<SubmitResponse, ServiceError> {
        let request = self.client.post(self.endpoint.clone()).json(draft).send();
        let response = match timeout(self.timeout_duration, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                metrics::record_service_call("submit", "network_error");
                return Err(ServiceError::Network(e.to_string()));
            }
            Err(_) => {
                metrics::record_service_call("submit", "network_error");
                return Err(ServiceError::Network(format!(
                    "submit timed out after {} seconds",
                    self.timeout_duration.as_secs()
                )));
            }
        };

        let status = response.status();
        let body = match timeout(self.timeout_duration, response.text()).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                metrics::record_service_call("submit", "network_error");
                return Err(ServiceError::Network(e.to_string()));
            }
            Err(_) => {
                metrics::record_service_call("submit", "network_error");
                return Err(ServiceError::Network(
                    "timed out reading submit response".to_string(),
                ));
            }
        };

        if !status.is_success() {
            tracing::warn!(endpoint = %self.endpoint, status = %status, body = %body, "Config submit failed");
            metrics::record_service_call("submit", "network_error");
            return Err(ServiceError::Network(format!("store returned status {status}")));
        }

        match serde_json::from_str::<SubmitResponse>(&body) {
            Ok(reply) => {
                metrics::record_service_call(
                    "submit",
                    if reply.success { "ok" } else { "rejected" },
                );
                Ok(reply)
            }
            Err(e) => {
                metrics::record_service_call("submit", "parse_error");
                Err(ServiceError::Parse(e.to_string()))
            }
        }
    }
}

/// `path` appended to the path of `base`, keeping any prefix the store is
/// mounted under.
fn resource_url(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let joined = format!("{}{}", base.path().trim_end_matches('/'), path);
    url.set_path(&joined);
    url
}

impl std::fmt::Debug for HttpConfigService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConfigService")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .field("max_attempts", &max_fetch_attempts(&self.retries))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_url_and_path() {
        let config = ServiceConfig {
            base_url: "http://store.local:7777".into(),
            ..ServiceConfig::default()
        };
        let service = HttpConfigService::new(&config).unwrap();
        assert_eq!(service.endpoint().as_str(), "http://store.local:7777/api/configs");
    }

    #[test]
    fn base_url_path_prefix_is_kept() {
        let config = ServiceConfig {
            base_url: "http://store.local:7777/atm".into(),
            ..ServiceConfig::default()
        };
        let service = HttpConfigService::new(&config).unwrap();
        assert_eq!(service.endpoint().as_str(), "http://store.local:7777/atm/api/configs");
        assert_eq!(
            service.methods_endpoint().as_str(),
            "http://store.local:7777/atm/api/methods"
        );

        let config = ServiceConfig {
            base_url: "http://store.local:7777/atm/".into(),
            ..ServiceConfig::default()
        };
        let service = HttpConfigService::new(&config).unwrap();
        assert_eq!(service.endpoint().as_str(), "http://store.local:7777/atm/api/configs");
    }

    #[test]
    fn non_hierarchical_base_url_is_rejected() {
        let config = ServiceConfig {
            base_url: "mailto:store@example.com".into(),
            ..ServiceConfig::default()
        };
        assert!(HttpConfigService::new(&config).is_err());
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = ServiceConfig {
            base_url: "not a url".into(),
            ..ServiceConfig::default()
        };
        let err = HttpConfigService::new(&config).unwrap_err();
        assert!(err.to_string().contains("invalid store URL"));
    }

    #[tokio::test]
    async fn unreachable_store_is_a_network_error() {
        let config = ServiceConfig {
            base_url: "http://127.0.0.1:1".into(),
            timeout_secs: 2,
            retries: RetryConfig {
                enabled: false,
                ..RetryConfig::default()
            },
            ..ServiceConfig::default()
        };
        let service = HttpConfigService::new(&config).unwrap();
        let result = service.fetch().await;
        assert!(matches!(result, Err(ServiceError::Network(_))));
    }
}
