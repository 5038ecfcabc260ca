//! Client builder for creating measurement clients
//!
//! This module provides a fluent builder interface for constructing
//! measurement clients bound to a caller-supplied delegate. The builder is
//! the configurable form of the factory; the one-call form is
//! [`create_client`](crate::client::create_client).
//!
//! # Construction contract
//!
//! `build()` either returns a fully configured, immediately usable client or
//! a construction error - never a partially-initialized object:
//!
//! - a missing or already-dropped delegate fails with
//!   [`ClientError::InvalidDelegate`]
//! - absent configuration (neither explicit nor process-wide) fails with
//!   [`ClientError::ConfigurationMissing`]
//! - a refusal from the underlying engine fails with
//!   [`ClientError::InitializationFailed`]
//!
//! The builder is stateless across builds and holds no registry of issued
//! clients; concurrent builds yield independent client instances.
//!
//! # Examples
//!
//! ## Basic Client Setup
//!
//! ```rust
//! use playmeter_client_core::ClientBuilder;
//! use playmeter_client_core::config::AppConfig;
//! # use playmeter_client_core::events::*;
//! # use std::sync::Arc;
//! # struct MyDelegate;
//! # #[async_trait::async_trait]
//! # impl MeasurementEventHandler for MyDelegate {
//! #     async fn on_session_state_changed(&self, _info: SessionStatusInfo) {}
//! #     async fn on_playback_event(&self, _info: PlaybackEventInfo) {}
//! # }
//!
//! # tokio_test::block_on(async {
//! let delegate = Arc::new(MyDelegate);
//! let client = ClientBuilder::new()
//!     .app_config(AppConfig::new("P1234567-AB12", "ExamplePlayer", "1.0"))
//!     .delegate(&delegate)
//!     .build()
//!     .await
//!     .expect("Failed to build client");
//! # });
//! ```
//!
//! ## Using process-wide configuration
//!
//! ```rust,no_run
//! use playmeter_client_core::{config, ClientBuilder};
//! use playmeter_client_core::config::AppConfig;
//! # use playmeter_client_core::events::*;
//! # use std::sync::Arc;
//! # struct MyDelegate;
//! # #[async_trait::async_trait]
//! # impl MeasurementEventHandler for MyDelegate {
//! #     async fn on_session_state_changed(&self, _info: SessionStatusInfo) {}
//! #     async fn on_playback_event(&self, _info: PlaybackEventInfo) {}
//! # }
//!
//! # tokio_test::block_on(async {
//! config::configure(AppConfig::new("P1234567-AB12", "ExamplePlayer", "1.0")).unwrap();
//!
//! let delegate = Arc::new(MyDelegate);
//! // No explicit config: the builder reads the process-wide store.
//! let client = ClientBuilder::new()
//!     .delegate(&delegate)
//!     .build()
//!     .await
//!     .unwrap();
//! # });
//! ```

use std::sync::{Arc, Weak};

use crate::client::backend::{InProcessBackend, MeasurementBackend};
use crate::client::manager::MeterClient;
use crate::client::types::ClientId;
use crate::config::{self, AppConfig};
use crate::error::{ClientError, ClientResult};
use crate::events::MeasurementEventHandler;

/// Fluent builder for creating measurement clients
///
/// Collects the delegate, configuration, and (optionally) a custom
/// measurement engine, then constructs a [`MeterClient`] wired to invoke the
/// delegate for future lifecycle and playback callbacks.
///
/// The delegate is captured as a weak reference at the moment it is supplied:
/// the builder and the built client never extend the delegate's lifetime.
pub struct ClientBuilder {
    config: Option<AppConfig>,
    delegate: Option<Weak<dyn MeasurementEventHandler>>,
    backend: Option<Arc<dyn MeasurementBackend>>,
}

impl ClientBuilder {
    /// Create a new client builder
    ///
    /// A delegate must be supplied before [`build`](Self::build); everything
    /// else has a default (process-wide configuration, in-process engine).
    pub fn new() -> Self {
        Self {
            config: None,
            delegate: None,
            backend: None,
        }
    }

    /// Supply an explicit configuration for this client
    ///
    /// Takes precedence over the process-wide configuration published via
    /// [`config::configure`].
    pub fn app_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the delegate that will receive this client's callbacks
    ///
    /// Only a weak reference is kept; the caller remains the sole owner of
    /// the delegate and may drop it at any time.
    pub fn delegate<H>(mut self, delegate: &Arc<H>) -> Self
    where
        H: MeasurementEventHandler + 'static,
    {
        let weak = Arc::downgrade(delegate);
        let weak: Weak<dyn MeasurementEventHandler> = weak;
        self.delegate = Some(weak);
        self
    }

    /// Set the delegate from an existing weak reference
    ///
    /// Useful when the caller already manages the delegate behind
    /// `Weak<dyn MeasurementEventHandler>`. The reference must still be
    /// upgradable when [`build`](Self::build) runs.
    pub fn delegate_weak(mut self, delegate: Weak<dyn MeasurementEventHandler>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Use a custom measurement engine instead of the bundled one
    pub fn backend(mut self, backend: Arc<dyn MeasurementBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Build and initialize the measurement client
    ///
    /// Performs, in order: delegate liveness check, configuration resolution
    /// and validation, one-time shared runtime initialization (idempotent),
    /// engine initialization, and session opening. Any failure aborts the
    /// construction and nothing is returned to the caller.
    ///
    /// The first build in a process initializes the shared measurement
    /// runtime; later builds observe it already initialized.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidDelegate`] - no delegate, or the delegate was
    ///   dropped before the build
    /// - [`ClientError::ConfigurationMissing`] /
    ///   [`ClientError::InvalidConfiguration`] - no usable configuration
    /// - [`ClientError::InitializationFailed`] - the engine refused to
    ///   initialize or to open the session
    pub async fn build(self) -> ClientResult<Arc<MeterClient>> {
        let delegate = self
            .delegate
            .ok_or_else(|| ClientError::invalid_delegate("no delegate was supplied"))?;
        if delegate.upgrade().is_none() {
            return Err(ClientError::invalid_delegate(
                "delegate was dropped before the client was built",
            ));
        }

        let config = match self.config {
            Some(config) => config,
            None => config::global_config()?,
        };
        config.validate()?;

        let runtime = config::ensure_sdk_runtime();

        let backend: Arc<dyn MeasurementBackend> = self
            .backend
            .unwrap_or_else(|| Arc::new(InProcessBackend::new()));

        backend
            .initialize(&config)
            .await
            .map_err(|e| ClientError::initialization_failed(e.to_string()))?;

        let id = ClientId::new_v4();
        backend
            .open_session(id, &config)
            .await
            .map_err(|e| ClientError::initialization_failed(e.to_string()))?;

        let client = Arc::new(MeterClient::new(id, config, delegate, backend));
        tracing::info!(
            client_id = %id,
            app_id = %client.config().app_id,
            runtime_instance = %runtime.instance_id,
            "measurement client created"
        );
        Ok(client)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
