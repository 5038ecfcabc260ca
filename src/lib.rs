//! # Playmeter Client Core - Playback Measurement Client Library
//!
//! This crate is the construction and coordination layer for playback
//! measurement clients. It exposes a single creation operation that takes a
//! caller-supplied delegate and returns a configured client instance bound to
//! that delegate:
//!
//! - **Factory**: [`create_client`] / [`ClientBuilder`] construct clients;
//!   every call yields an independent, fully configured instance or a
//!   synchronous construction error - never a partially-initialized object.
//! - **Delegate capability**: any object implementing
//!   [`MeasurementEventHandler`] may be supplied. The client holds a
//!   *non-owning* weak reference: the delegate's lifetime stays with the
//!   caller, and no callback ever fires on a dropped delegate.
//! - **Engine boundary**: the actual measurement logic lives behind the
//!   [`MeasurementBackend`] trait; this crate owns no transport,
//!   persistence, or measurement algorithms.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use playmeter_client_core::{config, create_client, ContentMetadata};
//! use playmeter_client_core::config::AppConfig;
//! use playmeter_client_core::events::{
//!     MeasurementEventHandler, PlaybackEventInfo, SessionStatusInfo,
//! };
//! use std::sync::Arc;
//!
//! struct PlayerDelegate;
//!
//! #[async_trait::async_trait]
//! impl MeasurementEventHandler for PlayerDelegate {
//!     async fn on_session_state_changed(&self, info: SessionStatusInfo) {
//!         println!("session state: {}", info.new_state);
//!     }
//!     async fn on_playback_event(&self, info: PlaybackEventInfo) {
//!         println!("playback event: {:?}", info.event_type);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Publish the process-wide configuration once at startup
//!     config::configure(AppConfig::new("P1234567-AB12", "ExamplePlayer", "1.0.3"))?;
//!
//!     // The caller owns the delegate; the client only borrows it weakly
//!     let delegate: Arc<dyn MeasurementEventHandler> = Arc::new(PlayerDelegate);
//!     let client = create_client(&delegate).await?;
//!
//!     client.load_metadata(ContentMetadata::new("asset-8271")).await?;
//!     client.play().await?;
//!     client.report_playhead(std::time::Duration::from_secs(30)).await?;
//!     client.stop().await?;
//!     client.end().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! All construction failures surface synchronously from the creation call
//! ([`ClientError::InvalidDelegate`], [`ClientError::ConfigurationMissing`],
//! [`ClientError::InitializationFailed`]). A failed creation means
//! "measurement unavailable": the application should continue without
//! measurement rather than treat it as fatal.

pub mod client;
pub mod config;
pub mod error;
pub mod events;

// Re-export main types
pub use client::{
    create_client, BackendError, ClientBuilder, ClientId, ContentMetadata, InProcessBackend,
    MeasurementBackend, MeterClient,
};
pub use config::{AppConfig, Environment};
pub use error::{ClientError, ClientResult};
pub use events::{
    MeasurementEventHandler, PlaybackEventInfo, PlaybackEventType, SessionState, SessionStatusInfo,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
