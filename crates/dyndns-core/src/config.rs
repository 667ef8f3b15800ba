//! Configuration types for the dyndns agent
//!
//! This module defines the configuration structures consumed by the
//! reconciliation engine, including the three record declaration shapes
//! and their resolution into a concrete ordered target list.

use serde::{Deserialize, Serialize};

/// One DNS A record to keep pointed at the current public IP.
///
/// `domain` is the fully-qualified parent domain and may itself be a
/// wildcard (`*.example.com`), which is treated as an opaque string.
/// An empty `subdomain` addresses the apex record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTarget {
    /// Fully-qualified parent domain
    pub domain: String,

    /// Optional label prepended to `domain`; empty means apex
    #[serde(default)]
    pub subdomain: String,
}

impl RecordTarget {
    /// Create a target for a subdomain record.
    pub fn new(domain: impl Into<String>, subdomain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            subdomain: subdomain.into(),
        }
    }

    /// Create an apex target.
    pub fn apex(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            subdomain: String::new(),
        }
    }

    /// The effective fully-qualified record name.
    pub fn fqdn(&self) -> String {
        if self.subdomain.is_empty() {
            self.domain.clone()
        } else {
            format!("{}.{}", self.subdomain, self.domain)
        }
    }

    /// True if this target addresses the bare domain.
    pub fn is_apex(&self) -> bool {
        self.subdomain.is_empty()
    }
}

/// Declarative record configuration.
///
/// Three shapes are supported; each resolves deterministically into an
/// ordered list of [`RecordTarget`]s via [`RecordsConfig::targets`]:
///
/// - one domain with a list of subdomain labels (empty label = apex),
/// - an explicit list of `{domain, subdomain}` pairs,
/// - a flat list of domains, each treated as apex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordsConfig {
    /// One domain, many subdomain labels
    DomainWithSubdomains {
        /// Parent domain shared by every label
        domain: String,
        /// Labels to maintain; an empty string addresses the apex
        subdomains: Vec<String>,
    },

    /// Explicit `{domain, subdomain}` pairs (wildcards allowed in `domain`)
    Pairs(Vec<RecordTarget>),

    /// Flat list of apex domains
    Domains(Vec<String>),
}

impl RecordsConfig {
    /// Resolve the declared records into the concrete ordered target list.
    ///
    /// Pure and deterministic: the same configuration always yields the
    /// same targets in the same order.
    pub fn targets(&self) -> Vec<RecordTarget> {
        match self {
            RecordsConfig::DomainWithSubdomains { domain, subdomains } => subdomains
                .iter()
                .map(|label| RecordTarget::new(domain.clone(), label.trim()))
                .collect(),
            RecordsConfig::Pairs(pairs) => pairs.clone(),
            RecordsConfig::Domains(domains) => {
                domains.iter().map(|d| RecordTarget::apex(d.clone())).collect()
            }
        }
    }

    /// Validate the record declaration.
    pub fn validate(&self) -> Result<(), crate::Error> {
        let targets = self.targets();
        if targets.is_empty() {
            return Err(crate::Error::config("no record targets configured"));
        }
        for target in &targets {
            if target.domain.trim().is_empty() {
                return Err(crate::Error::config("record target has an empty domain"));
            }
        }
        Ok(())
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Records to maintain
    pub records: RecordsConfig,

    /// Seconds between reconciliation cycles
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl ReconcilerConfig {
    /// Create a configuration with the default polling interval.
    pub fn new(records: RecordsConfig) -> Self {
        Self {
            records,
            poll_interval_secs: default_poll_interval_secs(),
        }
    }

    /// Set the polling interval.
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.records.validate()?;
        if self.poll_interval_secs == 0 {
            return Err(crate::Error::config("poll interval must be > 0"));
        }
        Ok(())
    }
}

fn default_poll_interval_secs() -> u64 {
    600
}
