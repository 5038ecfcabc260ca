//! Measurement client construction and session management
//!
//! This module contains the client factory ([`create_client`] and
//! [`ClientBuilder`]), the client instance itself ([`MeterClient`]), the
//! engine boundary ([`backend`]), and the client-facing value types.

pub mod backend;
pub mod builder;
pub mod manager;
pub mod types;


pub use backend::{BackendError, InProcessBackend, MeasurementBackend};
pub use builder::ClientBuilder;
pub use manager::MeterClient;
pub use types::{ClientId, ContentMetadata};

use std::sync::Arc;

use crate::error::ClientResult;
use crate::events::MeasurementEventHandler;

/// Create a measurement client bound to the given delegate
///
/// The single-call form of the factory: uses the process-wide configuration
/// published via [`config::configure`](crate::config::configure) and the
/// bundled in-process engine. The returned client holds only a weak
/// reference to the delegate; the caller keeps ownership.
///
/// Stateless and safe to call concurrently; each call yields an independent
/// client instance. Use [`ClientBuilder`] to override the configuration or
/// the engine.
///
/// # Errors
///
/// Fails synchronously with [`ClientError::InvalidDelegate`] for an
/// already-dropped delegate, [`ClientError::ConfigurationMissing`] when no
/// process-wide configuration is available, or
/// [`ClientError::InitializationFailed`] when the engine refuses to
/// initialize. A failed creation means "measurement unavailable"; callers
/// should continue operating without measurement.
///
/// [`ClientError::InvalidDelegate`]: crate::error::ClientError::InvalidDelegate
/// [`ClientError::ConfigurationMissing`]: crate::error::ClientError::ConfigurationMissing
/// [`ClientError::InitializationFailed`]: crate::error::ClientError::InitializationFailed
///
/// # Examples
///
/// ```rust,no_run
/// use playmeter_client_core::{config, create_client};
/// use playmeter_client_core::config::AppConfig;
/// use playmeter_client_core::events::MeasurementEventHandler;
/// # use playmeter_client_core::events::*;
/// use std::sync::Arc;
/// # struct MyDelegate;
/// # #[async_trait::async_trait]
/// # impl MeasurementEventHandler for MyDelegate {
/// #     async fn on_session_state_changed(&self, _info: SessionStatusInfo) {}
/// #     async fn on_playback_event(&self, _info: PlaybackEventInfo) {}
/// # }
///
/// # tokio_test::block_on(async {
/// config::configure(AppConfig::new("P1234567-AB12", "ExamplePlayer", "1.0")).unwrap();
///
/// let delegate: Arc<dyn MeasurementEventHandler> = Arc::new(MyDelegate);
/// match create_client(&delegate).await {
///     Ok(client) => println!("measurement session {} ready", client.id()),
///     Err(error) => eprintln!("measurement unavailable: {error}"),
/// }
/// # });
/// ```
pub async fn create_client(
    delegate: &Arc<dyn MeasurementEventHandler>,
) -> ClientResult<Arc<MeterClient>> {
    ClientBuilder::new()
        .delegate_weak(Arc::downgrade(delegate))
        .build()
        .await
}
