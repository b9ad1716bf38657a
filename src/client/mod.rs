//! Client layer: orchestrates transport calls and maps transport ↔ domain.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::domain::{ApiKey, ApiSecret, SendSms, SendSmsResponse, StatusCode, ValidationError};

/// Fixed Nexmo endpoint for sending SMS with a JSON response.
pub const DEFAULT_ENDPOINT: &str = "https://rest.nexmo.com/sms/json";

/// Timeout applied to the whole HTTP round-trip unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
pub(crate) struct HttpResponse {
    status: u16,
    body: String,
}

pub(crate) trait HttpTransport: Send + Sync {
    fn get<'a>(
        &'a self,
        url: Url,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn get<'a>(
        &'a self,
        url: Url,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self.client.get(url).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone)]
/// Account credentials for Nexmo API calls.
pub struct Auth {
    key: ApiKey,
    secret: ApiSecret,
}

impl Auth {
    /// Validate that both the key and the secret are non-empty.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            key: ApiKey::new(key)?,
            secret: ApiSecret::new(secret)?,
        })
    }

    pub fn key(&self) -> &ApiKey {
        &self.key
    }

    fn push_query_params(&self, params: &mut Vec<(String, String)>) {
        params.push((ApiKey::FIELD.to_owned(), self.key.as_str().to_owned()));
        params.push((ApiSecret::FIELD.to_owned(), self.secret.as_str().to_owned()));
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`NexmoClient`].
///
/// This error preserves:
/// - missing configuration (no credentials to sign the request with),
/// - HTTP-level failures (non-2xx status or transport failures),
/// - gateway-level failures (first message `status != "0"`),
/// - validation/parse failures.
pub enum NexmoError {
    /// No usable key/secret pair is available; the gateway was not contacted.
    #[error("gateway credentials are not configured")]
    NotConfigured,

    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status code returned by the server.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The gateway rejected the message. Status codes are not distinguished further.
    #[error("gateway rejected message with status {status_code}")]
    Api {
        status_code: StatusCode,
        error_text: Option<String>,
        raw: String,
    },

    /// Response body could not be parsed as the expected format.
    #[error("parse error: {source}")]
    Parse {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
        body: String,
    },

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl NexmoError {
    /// `true` for failures where no HTTP response was received at all.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Response body associated with the failure, if the gateway answered.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::Api { raw, .. } => Some(raw.as_str()),
            Self::Parse { body, .. } => Some(body.as_str()),
            Self::HttpStatus { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
/// Builder for [`NexmoClient`].
///
/// Use this when you need to customize the endpoint, timeout, or user-agent.
pub struct NexmoClientBuilder {
    endpoint: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl Default for NexmoClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NexmoClientBuilder {
    /// Create a builder with the default endpoint and [`DEFAULT_TIMEOUT`].
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: None,
        }
    }

    /// Override the endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Wait for the gateway without any time limit.
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`NexmoClient`], rejecting endpoints that are not absolute URLs.
    pub fn build(self) -> Result<NexmoClient, NexmoError> {
        Url::parse(&self.endpoint).map_err(|_| ValidationError::InvalidEndpoint {
            input: self.endpoint.clone(),
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| NexmoError::Transport(Box::new(err)))?;

        Ok(NexmoClient {
            endpoint: self.endpoint,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// High-level Nexmo SMS client.
///
/// Each call issues exactly one `GET` against the endpoint. Nothing is retried.
pub struct NexmoClient {
    endpoint: String,
    http: Arc<dyn HttpTransport>,
}

impl NexmoClient {
    /// Create a client using the default endpoint and timeout.
    pub fn new() -> Result<Self, NexmoError> {
        NexmoClientBuilder::new().build()
    }

    /// Start building a client with custom settings.
    pub fn builder() -> NexmoClientBuilder {
        NexmoClientBuilder::new()
    }

    #[cfg(test)]
    pub(crate) fn with_transport(
        endpoint: impl Into<String>,
        http: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one SMS signed with `auth`.
    ///
    /// Errors:
    /// - [`NexmoError::Transport`] when the gateway cannot be reached,
    /// - [`NexmoError::HttpStatus`] for non-2xx HTTP responses,
    /// - [`NexmoError::Parse`] when the body is not a message-result document,
    /// - [`NexmoError::Api`] when the first message status is not `"0"`.
    pub async fn send_sms(
        &self,
        auth: &Auth,
        request: SendSms,
    ) -> Result<SendSmsResponse, NexmoError> {
        let mut params = Vec::<(String, String)>::new();
        auth.push_query_params(&mut params);
        params.extend(crate::transport::encode_send_sms_query(&request));

        let url = Url::parse_with_params(&self.endpoint, &params).map_err(|_| {
            ValidationError::InvalidEndpoint {
                input: self.endpoint.clone(),
            }
        })?;

        debug!(endpoint = %self.endpoint, to = request.recipient().raw(), "sending SMS");
        let response = self.http.get(url).await.map_err(|err| {
            warn!(error = %err, "gateway unreachable");
            NexmoError::Transport(err)
        })?;
        debug!(status = response.status, "gateway responded");

        if !(200..=299).contains(&response.status) {
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(NexmoError::HttpStatus {
                status: response.status,
                body,
            });
        }

        let parsed = match crate::transport::decode_send_sms_json_response(&response.body) {
            Ok(parsed) => parsed,
            Err(err) => {
                return Err(NexmoError::Parse {
                    source: Box::new(err),
                    body: response.body,
                });
            }
        };

        let rejected = parsed
            .first()
            .filter(|message| !message.status.is_accepted())
            .map(|message| (message.status.clone(), message.error_text.clone()));
        if let Some((status_code, error_text)) = rejected {
            return Err(NexmoError::Api {
                status_code,
                error_text,
                raw: parsed.raw,
            });
        }

        Ok(parsed)
    }
}
