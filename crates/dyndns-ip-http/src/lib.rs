// # HTTP Public-IP Resolver
//
// This crate answers "what is my public IP" by querying a dynamic-DNS
// detection endpoint over HTTPS.
//
// ## Wire format
//
// The detection service authenticates via an `API-Key` header and responds
// with a JSON document listing the domains attached to the account, each
// carrying the IPv4 address the service currently observes for the caller:
//
// ```json
// { "domains": [ { "ipv4Address": "203.0.113.7" } ] }
// ```
//
// The first entry's address is taken; everything else is ignored. Any
// transport error, timeout, non-2xx status, or missing/empty address field
// yields a resolver error; the engine skips the cycle and retries on the
// next tick.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use dyndns_core::addr::IpAddress;
use dyndns_core::error::{Error, Result};
use dyndns_core::traits::IpResolver;

/// Timeout for the detection request; a hung lookup is a failed lookup
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Detection-service response payload
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    domains: Vec<DomainEntry>,
}

#[derive(Debug, Deserialize)]
struct DomainEntry {
    #[serde(rename = "ipv4Address", default)]
    ipv4_address: Option<String>,
}

/// Public-IP resolver backed by an HTTP detection endpoint
pub struct HttpIpResolver {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

// The API key never appears in Debug output.
impl std::fmt::Debug for HttpIpResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpIpResolver")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<REDACTED>")
            .finish()
    }
}

impl HttpIpResolver {
    /// Create a resolver for the given detection endpoint.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .map_err(|e| Error::resolver(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client,
        })
    }
}

/// Extract the first IPv4 address from a detection response body.
fn extract_ip(body: &str) -> Result<IpAddress> {
    let response: LookupResponse = serde_json::from_str(body)
        .map_err(|e| Error::resolver(format!("malformed detection response: {}", e)))?;

    let entry = response
        .domains
        .first()
        .ok_or_else(|| Error::resolver("detection response contains no domain entries"))?;

    let address = entry
        .ipv4_address
        .as_deref()
        .ok_or_else(|| Error::resolver("detection response entry has no ipv4Address field"))?;

    IpAddress::new(address)
        .map_err(|_| Error::resolver("detection response carried an empty address"))
}

#[async_trait]
impl IpResolver for HttpIpResolver {
    async fn lookup(&self) -> Result<IpAddress> {
        tracing::debug!("querying detection endpoint: {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .header("API-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::resolver(format!("detection request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::resolver(format!(
                "detection endpoint returned HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::resolver(format!("failed to read detection response: {}", e)))?;

        let ip = extract_ip(&body)?;
        tracing::debug!("detection endpoint reports {}", ip);
        Ok(ip)
    }
}
