//! # Runtime Configuration
//!
//! Unified configuration for every pipeline component, read from `TF_*`
//! environment variables on top of defaults.
//!
//! ## Production Requirements
//!
//! - Unsigned submissions are refused
//! - The authority endpoint must use TLS
//! - Receipt signatures must be verifiable against a configured key

use shared_types::SignatureType;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tf_02_validator::ValidationPolicy;
use tf_03_signature::TrustPolicy;
use tf_05_error_classifier::RetryPolicy;
use tf_06_status_tracker::TrackerConfig;
use tf_07_confirmation::ConfirmationPolicy;
use thiserror::Error;

/// Default interval between two sweeps of the poll scheduler.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct FilingConfig {
    /// Whether this deployment files for real.
    pub environment: Environment,
    pub authority: AuthorityConfig,
    pub signing: SigningConfig,
    pub retry: RetryPolicy,
    pub scheduler: SchedulerConfig,
    pub validation: ValidationConfig,
    /// Directory the JSON totals source reads from.
    pub totals_dir: PathBuf,
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} is required")]
    Missing(&'static str),

    #[error("SECURITY VIOLATION: unsigned submissions are not allowed in production. Set TF_SIGNATURE_TYPE.")]
    UnsignedInProduction,

    #[error("SECURITY VIOLATION: authority endpoint {0:?} does not use https")]
    InsecureEndpoint(String),

    #[error("SECURITY VIOLATION: no trusted certificate issuers configured. Set TF_ALLOWED_ISSUERS.")]
    NoTrustedIssuers,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        *self == Self::Production
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "test" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(()),
        }
    }
}

/// Authority endpoint and the client credentials used for WS-Security.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub soap_action_prefix: String,
    /// Client key for the security header. Falls back to the signing key.
    pub client_key_path: Option<PathBuf>,
    /// Client certificate for the security header. Falls back to the signing certificate.
    pub client_certificate_path: Option<PathBuf>,
    /// Authority public key used to verify receipt signatures.
    pub receipt_public_key_path: Option<PathBuf>,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout: tf_04_transport::DEFAULT_TIMEOUT,
            soap_action_prefix: tf_04_transport::domain::envelope::SERVICE_NAMESPACE.to_string(),
            client_key_path: None,
            client_certificate_path: None,
            receipt_public_key_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningConfig {
    /// Strategy used for new submissions.
    pub signature_type: SignatureType,
    pub key_path: Option<PathBuf>,
    pub certificate_path: Option<PathBuf>,
    pub identity_provider_url: Option<String>,
    pub identity_provider_token: Option<String>,
    /// Account reference sent to the identity provider.
    pub signer_reference: Option<String>,
    pub allowed_issuers: Vec<String>,
    pub revoked_serials: Vec<String>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            signature_type: SignatureType::LocalCertificate,
            key_path: None,
            certificate_path: None,
            identity_provider_url: None,
            identity_provider_token: None,
            signer_reference: None,
            allowed_issuers: Vec::new(),
            revoked_serials: Vec::new(),
        }
    }
}

impl SigningConfig {
    pub fn trust_policy(&self) -> TrustPolicy {
        TrustPolicy::new(self.allowed_issuers.iter().cloned()).with_revoked(&self.revoked_serials)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub sweep_interval: Duration,
    pub batch_size: usize,
    pub lock_wait: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let tracker = TrackerConfig::default();
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            batch_size: tracker.batch_size,
            lock_wait: tracker.lock_wait,
        }
    }
}

impl SchedulerConfig {
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            batch_size: self.batch_size,
            lock_wait: self.lock_wait,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ValidationConfig {
    pub document: ValidationPolicy,
    pub receipt: ConfirmationPolicy,
}

impl FilingConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from any key/value source. Unset keys keep their defaults.
    ///
    /// # Environment Variables
    ///
    /// - `TF_ENVIRONMENT`: `development` (default) or `production`
    /// - `TF_AUTHORITY_ENDPOINT`, `TF_AUTHORITY_TIMEOUT_SECS`, `TF_SOAP_ACTION_PREFIX`
    /// - `TF_CLIENT_KEY_PATH`, `TF_CLIENT_CERT_PATH`, `TF_RECEIPT_PUBLIC_KEY_PATH`
    /// - `TF_SIGNATURE_TYPE`: `local-certificate`, `trusted-identity` or `none`
    /// - `TF_SIGNING_KEY_PATH`, `TF_SIGNING_CERT_PATH`
    /// - `TF_IDENTITY_PROVIDER_URL`, `TF_IDENTITY_PROVIDER_TOKEN`, `TF_SIGNER_REFERENCE`
    /// - `TF_ALLOWED_ISSUERS`, `TF_REVOKED_SERIALS`: comma separated
    /// - `TF_RETRY_BASE_DELAY_SECS`, `TF_RETRY_MAX_DELAY_SECS`, `TF_RETRY_MAX_ATTEMPTS`, `TF_RETRY_JITTER_RATIO`
    /// - `TF_SWEEP_INTERVAL_SECS`, `TF_SWEEP_BATCH_SIZE`, `TF_LOCK_WAIT_SECS`
    /// - `TF_VALIDATION_EPSILON`, `TF_DATE_WINDOW_DAYS`, `TF_RECEIPT_DATE_WINDOW_DAYS`
    /// - `TF_TOTALS_DIR`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(value) = get("TF_ENVIRONMENT") {
            config.environment = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "TF_ENVIRONMENT",
                value,
            })?;
        }

        // Authority
        let authority = &mut config.authority;
        if let Some(endpoint) = get("TF_AUTHORITY_ENDPOINT") {
            authority.endpoint = endpoint;
        }
        if let Some(secs) = parse::<u64>(&get, "TF_AUTHORITY_TIMEOUT_SECS")? {
            authority.timeout = Duration::from_secs(secs);
        }
        if let Some(prefix) = get("TF_SOAP_ACTION_PREFIX") {
            authority.soap_action_prefix = prefix;
        }
        authority.client_key_path = get("TF_CLIENT_KEY_PATH").map(PathBuf::from);
        authority.client_certificate_path = get("TF_CLIENT_CERT_PATH").map(PathBuf::from);
        authority.receipt_public_key_path = get("TF_RECEIPT_PUBLIC_KEY_PATH").map(PathBuf::from);

        // Signing
        let signing = &mut config.signing;
        if let Some(value) = get("TF_SIGNATURE_TYPE") {
            signing.signature_type = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "TF_SIGNATURE_TYPE",
                value,
            })?;
        }
        signing.key_path = get("TF_SIGNING_KEY_PATH").map(PathBuf::from);
        signing.certificate_path = get("TF_SIGNING_CERT_PATH").map(PathBuf::from);
        signing.identity_provider_url = get("TF_IDENTITY_PROVIDER_URL");
        signing.identity_provider_token = get("TF_IDENTITY_PROVIDER_TOKEN");
        signing.signer_reference = get("TF_SIGNER_REFERENCE");
        signing.allowed_issuers = get("TF_ALLOWED_ISSUERS").map(|v| split_list(&v)).unwrap_or_default();
        signing.revoked_serials = get("TF_REVOKED_SERIALS").map(|v| split_list(&v)).unwrap_or_default();

        // Retry
        let retry = &mut config.retry;
        if let Some(secs) = parse::<u64>(&get, "TF_RETRY_BASE_DELAY_SECS")? {
            retry.base_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = parse::<u64>(&get, "TF_RETRY_MAX_DELAY_SECS")? {
            retry.max_delay = Duration::from_secs(secs);
        }
        if let Some(attempts) = parse::<u32>(&get, "TF_RETRY_MAX_ATTEMPTS")? {
            retry.max_retries = attempts;
        }
        if let Some(ratio) = parse::<f64>(&get, "TF_RETRY_JITTER_RATIO")? {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(ConfigError::InvalidValue {
                    key: "TF_RETRY_JITTER_RATIO",
                    value: ratio.to_string(),
                });
            }
            retry.jitter_ratio = ratio;
        }

        // Scheduler
        let scheduler = &mut config.scheduler;
        if let Some(secs) = parse::<u64>(&get, "TF_SWEEP_INTERVAL_SECS")? {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "TF_SWEEP_INTERVAL_SECS",
                    value: "0".into(),
                });
            }
            scheduler.sweep_interval = Duration::from_secs(secs);
        }
        if let Some(size) = parse::<usize>(&get, "TF_SWEEP_BATCH_SIZE")? {
            scheduler.batch_size = size.max(1);
        }
        if let Some(secs) = parse::<u64>(&get, "TF_LOCK_WAIT_SECS")? {
            scheduler.lock_wait = Duration::from_secs(secs);
        }

        // Validation
        if let Some(epsilon) = parse::<f64>(&get, "TF_VALIDATION_EPSILON")? {
            config.validation.document.epsilon = epsilon;
        }
        if let Some(days) = parse::<i64>(&get, "TF_DATE_WINDOW_DAYS")? {
            config.validation.document.date_window_days = days;
        }
        if let Some(days) = parse::<i64>(&get, "TF_RECEIPT_DATE_WINDOW_DAYS")? {
            config.validation.receipt.date_window_days = days;
        }

        config.totals_dir = get("TF_TOTALS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./totals"));

        Ok(config)
    }

    /// Checks every deployment needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.authority.endpoint.is_empty() {
            return Err(ConfigError::Missing("TF_AUTHORITY_ENDPOINT"));
        }
        match self.signing.signature_type {
            SignatureType::LocalCertificate => {
                if self.signing.key_path.is_none() {
                    return Err(ConfigError::Missing("TF_SIGNING_KEY_PATH"));
                }
                if self.signing.certificate_path.is_none() {
                    return Err(ConfigError::Missing("TF_SIGNING_CERT_PATH"));
                }
            }
            SignatureType::TrustedIdentity => {
                if self.signing.identity_provider_url.is_none() {
                    return Err(ConfigError::Missing("TF_IDENTITY_PROVIDER_URL"));
                }
                if self.signing.signer_reference.is_none() {
                    return Err(ConfigError::Missing("TF_SIGNER_REFERENCE"));
                }
            }
            SignatureType::None => {}
        }
        if self.client_key_path().is_none() {
            return Err(ConfigError::Missing("TF_CLIENT_KEY_PATH"));
        }
        if self.client_certificate_path().is_none() {
            return Err(ConfigError::Missing("TF_CLIENT_CERT_PATH"));
        }
        Ok(())
    }

    /// Validate configuration for production readiness.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the basic checks of [`validate`](Self::validate) fail
    /// - the configured strategy is `none`
    /// - the endpoint is not `https`
    /// - local-certificate signing trusts no issuer
    /// - no authority key is configured for receipt verification
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.signing.signature_type == SignatureType::None {
            return Err(ConfigError::UnsignedInProduction);
        }
        if !self.authority.endpoint.starts_with("https://") {
            return Err(ConfigError::InsecureEndpoint(self.authority.endpoint.clone()));
        }
        if self.signing.signature_type == SignatureType::LocalCertificate
            && self.signing.allowed_issuers.is_empty()
        {
            return Err(ConfigError::NoTrustedIssuers);
        }
        if self.authority.receipt_public_key_path.is_none() {
            return Err(ConfigError::Missing("TF_RECEIPT_PUBLIC_KEY_PATH"));
        }
        Ok(())
    }

    pub fn client_key_path(&self) -> Option<&PathBuf> {
        self.authority
            .client_key_path
            .as_ref()
            .or(self.signing.key_path.as_ref())
    }

    pub fn client_certificate_path(&self) -> Option<&PathBuf> {
        self.authority
            .client_certificate_path
            .as_ref()
            .or(self.signing.certificate_path.as_ref())
    }
}

fn parse<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match get(key) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(None),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
