//! Integration tests for the client factory contract
//!
//! Covers the full inbound surface: creation with a valid delegate, every
//! synchronous failure mode, independence of issued clients, and the
//! process-wide configuration path used by `create_client`.

use async_trait::async_trait;
use serial_test::serial;
use std::sync::{Arc, Mutex};

use playmeter_client_core::config::{self, AppConfig};
use playmeter_client_core::events::{
    MeasurementEventHandler, PlaybackEventInfo, SessionStatusInfo,
};
use playmeter_client_core::{create_client, ClientBuilder, ClientError, SessionState};

struct CountingDelegate {
    state_changes: Mutex<usize>,
}

impl CountingDelegate {
    fn new() -> Self {
        Self {
            state_changes: Mutex::new(0),
        }
    }

    fn state_changes(&self) -> usize {
        *self.state_changes.lock().unwrap()
    }
}

#[async_trait]
impl MeasurementEventHandler for CountingDelegate {
    async fn on_session_state_changed(&self, _info: SessionStatusInfo) {
        *self.state_changes.lock().unwrap() += 1;
    }

    async fn on_playback_event(&self, _info: PlaybackEventInfo) {}
}

fn test_config() -> AppConfig {
    AppConfig::new("P1234567-AB12", "FactoryContractTest", "0.1.0")
}

#[tokio::test]
async fn valid_delegate_yields_a_ready_client() {
    let delegate = Arc::new(CountingDelegate::new());
    let client = ClientBuilder::new()
        .app_config(test_config())
        .delegate(&delegate)
        .build()
        .await
        .expect("creation must succeed with valid delegate and configuration");

    // Ready for immediate use, no callbacks during construction
    assert_eq!(client.state().await, SessionState::Idle);
    assert_eq!(delegate.state_changes(), 0);
}

#[tokio::test]
async fn absent_delegate_is_rejected_synchronously() {
    let err = ClientBuilder::new()
        .app_config(test_config())
        .build()
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidDelegate { .. }));
    assert!(err.is_construction_error());
}

#[tokio::test]
async fn each_creation_yields_an_independent_client() {
    let delegate_one = Arc::new(CountingDelegate::new());
    let delegate_two = Arc::new(CountingDelegate::new());

    let client_one = ClientBuilder::new()
        .app_config(test_config())
        .delegate(&delegate_one)
        .build()
        .await
        .unwrap();
    let client_two = ClientBuilder::new()
        .app_config(test_config())
        .delegate(&delegate_two)
        .build()
        .await
        .unwrap();

    assert_ne!(client_one.id(), client_two.id());

    // Exactly one callback on the triggered client's delegate, zero on the other
    client_one.play().await.unwrap();
    assert_eq!(delegate_one.state_changes(), 1);
    assert_eq!(delegate_two.state_changes(), 0);
}

#[tokio::test]
#[serial]
async fn create_client_uses_the_process_wide_configuration() {
    config::configure(test_config()).unwrap();

    let delegate: Arc<dyn MeasurementEventHandler> = Arc::new(CountingDelegate::new());
    let client = create_client(&delegate).await.unwrap();
    assert_eq!(client.config().app_id, "P1234567-AB12");

    config::clear_configuration();
}

#[tokio::test]
#[serial]
async fn missing_process_wide_configuration_fails_creation() {
    config::clear_configuration();

    let delegate: Arc<dyn MeasurementEventHandler> = Arc::new(CountingDelegate::new());
    let err = create_client(&delegate).await.unwrap_err();
    assert!(matches!(err, ClientError::ConfigurationMissing { .. }));
}

#[tokio::test]
#[serial]
async fn concurrent_creations_yield_distinct_clients() {
    config::configure(test_config()).unwrap();

    let delegate: Arc<dyn MeasurementEventHandler> = Arc::new(CountingDelegate::new());
    let (first, second) = tokio::join!(create_client(&delegate), create_client(&delegate));
    let (first, second) = (first.unwrap(), second.unwrap());
    assert_ne!(first.id(), second.id());

    config::clear_configuration();
}
