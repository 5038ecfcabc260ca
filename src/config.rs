//! Process-wide configuration for the measurement client
//!
//! The underlying measurement engine needs a small set of application
//! identifiers and environment settings before any client can be created.
//! This module owns that configuration: the [`AppConfig`] structure, the
//! process-wide store it can be published to, and the one-time shared
//! runtime initialization that the first client construction triggers.
//!
//! # Key Components
//!
//! - **AppConfig** - Application identifiers and environment settings
//! - **configure / global_config** - The process-wide configuration store
//! - **SdkRuntime** - One-time shared initialization state
//!
//! # Usage Examples
//!
//! ## Publishing configuration at startup
//!
//! ```rust
//! use playmeter_client_core::config::{self, AppConfig, Environment};
//!
//! let app_config = AppConfig::new("P1234567-AB12", "ExamplePlayer", "1.0.3")
//!     .with_environment(Environment::Certification);
//!
//! config::configure(app_config).expect("valid configuration");
//! # config::clear_configuration();
//! ```
//!
//! ## Loading from the environment
//!
//! ```rust,no_run
//! use playmeter_client_core::config::AppConfig;
//!
//! // Reads PLAYMETER_APP_ID, PLAYMETER_APP_NAME, PLAYMETER_APP_VERSION, ...
//! let app_config = AppConfig::from_env().expect("PLAYMETER_* variables set");
//! ```
//!
//! ## Validation
//!
//! ```rust
//! use playmeter_client_core::config::AppConfig;
//!
//! let incomplete = AppConfig::new("", "ExamplePlayer", "1.0.3");
//! assert!(incomplete.validate().is_err());
//! ```

use chrono::{DateTime, Utc};
use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use url::Url;
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};

/// Prefix for environment variables read by [`AppConfig::from_env`]
const ENV_PREFIX: &str = "PLAYMETER_";

/// Measurement reporting environment
///
/// Controls which collection environment sessions report into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Live audience measurement; sessions count toward reported metrics
    Production,
    /// Certification/testing environment; sessions are never billed
    Certification,
}

impl Default for Environment {
    /// Defaults to [`Environment::Certification`] so a misconfigured
    /// integration never reports production traffic.
    fn default() -> Self {
        Environment::Certification
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Certification => write!(f, "certification"),
        }
    }
}

/// Application configuration required by the measurement engine
///
/// These are the identifiers and environment settings the underlying engine
/// needs at client construction time. The configuration is supplied by the
/// embedding application, either explicitly per builder or process-wide via
/// [`configure`].
///
/// # Examples
///
/// ```rust
/// use playmeter_client_core::config::{AppConfig, Environment};
///
/// let config = AppConfig::new("P1234567-AB12", "ExamplePlayer", "1.0.3")
///     .with_environment(Environment::Production);
///
/// assert_eq!(config.app_id, "P1234567-AB12");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application identifier issued by the measurement provider
    pub app_id: String,
    /// Human-readable application name
    pub app_name: String,
    /// Application version string, reported with every session
    pub app_version: String,
    /// Reporting environment for all sessions created under this config
    #[serde(default)]
    pub environment: Environment,
    /// Optional collector endpoint override (http/https)
    ///
    /// `None` means the engine's built-in endpoint is used.
    #[serde(default)]
    pub collector_endpoint: Option<Url>,
}

impl AppConfig {
    /// Create a new configuration with required identifiers
    pub fn new(
        app_id: impl Into<String>,
        app_name: impl Into<String>,
        app_version: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            app_name: app_name.into(),
            app_version: app_version.into(),
            environment: Environment::default(),
            collector_endpoint: None,
        }
    }

    /// Set the reporting environment
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set a collector endpoint override
    pub fn with_collector_endpoint(mut self, endpoint: Url) -> Self {
        self.collector_endpoint = Some(endpoint);
        self
    }

    /// Load configuration from `PLAYMETER_*` environment variables
    ///
    /// Reads `PLAYMETER_APP_ID`, `PLAYMETER_APP_NAME`,
    /// `PLAYMETER_APP_VERSION`, and optionally `PLAYMETER_ENVIRONMENT`
    /// (`production` or `certification`) and `PLAYMETER_COLLECTOR_ENDPOINT`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConfigurationMissing`] for an absent required
    /// variable and [`ClientError::InvalidConfiguration`] for a malformed
    /// environment name or endpoint URL.
    pub fn from_env() -> ClientResult<Self> {
        let read = |suffix: &str| -> ClientResult<String> {
            let key = format!("{ENV_PREFIX}{suffix}");
            std::env::var(&key).map_err(|_| ClientError::configuration_missing(key))
        };

        let mut config = Self::new(read("APP_ID")?, read("APP_NAME")?, read("APP_VERSION")?);

        if let Ok(env_name) = std::env::var(format!("{ENV_PREFIX}ENVIRONMENT")) {
            config.environment = match env_name.to_ascii_lowercase().as_str() {
                "production" => Environment::Production,
                "certification" => Environment::Certification,
                other => {
                    return Err(ClientError::invalid_configuration(format!(
                        "unknown environment '{other}'"
                    )))
                }
            };
        }

        if let Ok(raw) = std::env::var(format!("{ENV_PREFIX}COLLECTOR_ENDPOINT")) {
            let endpoint = Url::parse(&raw).map_err(|e| {
                ClientError::invalid_configuration(format!("collector endpoint: {e}"))
            })?;
            config.collector_endpoint = Some(endpoint);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate this configuration
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConfigurationMissing`] if any required
    /// identifier is empty, or [`ClientError::InvalidConfiguration`] if the
    /// collector endpoint uses a scheme other than http/https.
    pub fn validate(&self) -> ClientResult<()> {
        for (field, value) in [
            ("app_id", &self.app_id),
            ("app_name", &self.app_name),
            ("app_version", &self.app_version),
        ] {
            if value.trim().is_empty() {
                return Err(ClientError::configuration_missing(field));
            }
        }

        if let Some(endpoint) = &self.collector_endpoint {
            if !matches!(endpoint.scheme(), "http" | "https") {
                return Err(ClientError::invalid_configuration(format!(
                    "collector endpoint scheme '{}' is not supported",
                    endpoint.scheme()
                )));
            }
        }

        Ok(())
    }
}

/// Process-wide configuration store
///
/// Populated by [`configure`], read by client construction when no explicit
/// configuration is supplied to the builder.
static GLOBAL_CONFIG: Lazy<RwLock<Option<AppConfig>>> = Lazy::new(|| RwLock::new(None));

/// Publish configuration process-wide
///
/// Client constructions that do not carry an explicit configuration read from
/// this store. Calling `configure` again replaces the previous configuration
/// for *future* constructions; already-created clients keep the configuration
/// they were built with.
///
/// # Errors
///
/// The configuration is validated before being published; invalid
/// configuration is rejected and the store is left unchanged.
pub fn configure(config: AppConfig) -> ClientResult<()> {
    config.validate()?;
    tracing::info!(
        app_id = %config.app_id,
        environment = %config.environment,
        "process-wide measurement configuration published"
    );
    let mut slot = GLOBAL_CONFIG
        .write()
        .map_err(|_| ClientError::internal("configuration store lock poisoned"))?;
    *slot = Some(config);
    Ok(())
}

/// Read the process-wide configuration
///
/// # Errors
///
/// Returns [`ClientError::ConfigurationMissing`] if [`configure`] has not
/// been called in this process.
pub fn global_config() -> ClientResult<AppConfig> {
    let slot = GLOBAL_CONFIG
        .read()
        .map_err(|_| ClientError::internal("configuration store lock poisoned"))?;
    slot.clone()
        .ok_or_else(|| ClientError::configuration_missing("process-wide configuration"))
}

/// Clear the process-wide configuration
///
/// Subsequent constructions without explicit configuration fail with
/// [`ClientError::ConfigurationMissing`]. Intended for application teardown
/// and for tests that exercise the unconfigured path.
pub fn clear_configuration() {
    if let Ok(mut slot) = GLOBAL_CONFIG.write() {
        *slot = None;
    }
}

/// One-time shared runtime state for the measurement engine
///
/// The first client construction in a process initializes this; every later
/// construction observes the same instance. Nothing here is ever torn down
/// or re-initialized for the lifetime of the process.
#[derive(Debug)]
pub struct SdkRuntime {
    /// Identifier for this process's engine instance
    pub instance_id: Uuid,
    /// When the shared runtime was initialized
    pub initialized_at: DateTime<Utc>,
}

static SDK_RUNTIME: OnceCell<SdkRuntime> = OnceCell::new();

/// Ensure the shared measurement runtime is initialized
///
/// Idempotent: the first call performs the one-time setup, every subsequent
/// call returns the same [`SdkRuntime`] without re-triggering it.
pub fn ensure_sdk_runtime() -> &'static SdkRuntime {
    SDK_RUNTIME.get_or_init(|| {
        let runtime = SdkRuntime {
            instance_id: Uuid::new_v4(),
            initialized_at: Utc::now(),
        };
        tracing::info!(
            instance_id = %runtime.instance_id,
            "measurement runtime initialized"
        );
        runtime
    })
}
