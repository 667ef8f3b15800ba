// # HTTP DNS Provider
//
// Record updater against a generic JSON-API DNS provider.
//
// ## API shape
//
// The provider exposes name-addressed A-record endpoints, authenticated by
// an API key pair carried in the request body:
//
// - Edit by name:  `POST {endpoint}/{domain}/A/{subdomain}` with
//   `{ "apikey", "secretapikey", "content": "<ip>", "ttl": "600" }`.
//   The subdomain path segment is empty for apex records.
// - Create:        `POST {endpoint}/{domain}/A` with the same body plus
//   `"name": "<subdomain>"`, used when the edit call reports that no
//   record matched.
//
// Responses are JSON `{ "status": "...", "id": ..., "message": "..." }`.
// Only an explicit `"SUCCESS"` status counts as success; `"NOT_FOUND"` (or
// HTTP 404) means no record matched; everything else is a failure. The
// decoded variants never leave this crate as raw JSON; the engine sees
// `UpsertOutcome` or an error.
//
// ## Responsibility boundary
//
// One upsert per invocation, no retries, no caching, no state access.
// Cross-target aggregation and retry-next-cycle are owned by the engine.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use dyndns_core::addr::IpAddress;
use dyndns_core::config::RecordTarget;
use dyndns_core::error::{Error, Result};
use dyndns_core::traits::{RecordUpdater, UpsertOutcome};

/// Fixed TTL applied to every maintained record, in seconds.
/// Sent as a string, which is how the provider API expects it.
const RECORD_TTL: &str = "600";

/// Timeout for provider API requests
const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Decoded provider response
#[derive(Debug, Clone, PartialEq, Eq)]
enum ApiResponse {
    /// The provider confirmed the operation
    Success { record_id: Option<String> },
    /// No record matched the name/type pair
    NotFound,
    /// Anything else: bad credentials, malformed content, server error
    Failure { reason: String },
}

/// Raw provider response body
#[derive(Debug, Deserialize)]
struct ApiBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Map an HTTP status plus response body onto the explicit variants.
fn decode_response(http_status: u16, body: &str) -> ApiResponse {
    if http_status == 404 {
        return ApiResponse::NotFound;
    }

    let parsed: ApiBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            return ApiResponse::Failure {
                reason: format!("unparsable provider response (HTTP {}): {}", http_status, e),
            };
        }
    };

    match parsed.status.as_deref() {
        Some("SUCCESS") => ApiResponse::Success {
            record_id: parsed.id.as_ref().and_then(record_id_string),
        },
        Some("NOT_FOUND") => ApiResponse::NotFound,
        other => ApiResponse::Failure {
            reason: parsed.message.unwrap_or_else(|| match other {
                Some(status) => format!("provider returned status {}", status),
                None => format!("provider returned HTTP {} with no status field", http_status),
            }),
        },
    }
}

/// Record ids arrive as either a JSON string or a number.
fn record_id_string(id: &serde_json::Value) -> Option<String> {
    id.as_str()
        .map(str::to_string)
        .or_else(|| id.as_u64().map(|n| n.to_string()))
}

/// Record updater backed by the provider's JSON API
pub struct HttpDnsProvider {
    endpoint: String,
    api_key: String,
    secret_key: String,
    client: reqwest::Client,
}

// Credentials never appear in Debug output.
impl std::fmt::Debug for HttpDnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDnsProvider")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<REDACTED>")
            .field("secret_key", &"<REDACTED>")
            .finish()
    }
}

impl HttpDnsProvider {
    /// Create a provider client.
    ///
    /// Credentials are not verified here; placeholder keys are accepted and
    /// fail at the first update attempt with the provider's own error.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .map_err(|e| Error::provider(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            client,
        })
    }

    fn edit_url(&self, target: &RecordTarget) -> String {
        format!("{}/{}/A/{}", self.endpoint, target.domain, target.subdomain)
    }

    fn create_url(&self, target: &RecordTarget) -> String {
        format!("{}/{}/A", self.endpoint, target.domain)
    }

    /// POST a JSON body and decode whatever comes back.
    async fn post(&self, url: &str, body: serde_json::Value) -> Result<ApiResponse> {
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::provider(format!("request to {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| Error::provider(format!("failed to read provider response: {}", e)))?;

        Ok(decode_response(status, &text))
    }

    fn credentials_body(&self, ip: &IpAddress) -> serde_json::Value {
        serde_json::json!({
            "apikey": self.api_key,
            "secretapikey": self.secret_key,
            "content": ip.as_str(),
            "ttl": RECORD_TTL,
        })
    }
}

#[async_trait]
impl RecordUpdater for HttpDnsProvider {
    async fn upsert(&self, target: &RecordTarget, ip: &IpAddress) -> Result<UpsertOutcome> {
        let fqdn = target.fqdn();
        tracing::debug!("editing A record {} -> {}", fqdn, ip);

        match self.post(&self.edit_url(target), self.credentials_body(ip)).await? {
            ApiResponse::Success { record_id } => Ok(UpsertOutcome::Edited { record_id }),
            ApiResponse::Failure { reason } => Err(Error::provider(format!(
                "failed to update record {}: {}",
                fqdn, reason
            ))),
            ApiResponse::NotFound => {
                tracing::info!("no existing A record for {}, creating it", fqdn);

                let mut body = self.credentials_body(ip);
                body["name"] = serde_json::Value::String(target.subdomain.clone());

                match self.post(&self.create_url(target), body).await? {
                    ApiResponse::Success { record_id } => {
                        Ok(UpsertOutcome::Created { record_id })
                    }
                    ApiResponse::NotFound => Err(Error::provider(format!(
                        "provider reported NOT_FOUND while creating record {}",
                        fqdn
                    ))),
                    ApiResponse::Failure { reason } => Err(Error::provider(format!(
                        "failed to create record {}: {}",
                        fqdn, reason
                    ))),
                }
            }
        }
    }
}
