//! Measurement client instance
//!
//! [`MeterClient`] is the opaque session handle returned by the factory. It
//! binds one measurement session to one caller-supplied delegate: session
//! operations are recorded with the underlying engine and then reported to
//! the delegate through its callback contract.
//!
//! The client holds only a weak reference to its delegate. Liveness is
//! checked before every dispatch; a dropped delegate means the callback is
//! skipped, never that the client fails.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::client::backend::MeasurementBackend;
use crate::client::types::{ClientId, ContentMetadata};
use crate::config::AppConfig;
use crate::error::{ClientError, ClientResult};
use crate::events::{
    MeasurementEventHandler, PlaybackEventInfo, PlaybackEventType, SessionState, SessionStatusInfo,
};

/// An active measurement session bound to a caller-supplied delegate
///
/// Created only via [`ClientBuilder`](crate::client::ClientBuilder) or
/// [`create_client`](crate::client::create_client). Each construction yields
/// an independent client with its own session; the factory keeps no registry
/// of issued clients.
///
/// The session follows `Idle -> Playing <-> Stopped -> Ended`; see the
/// individual operations for the exact transitions. Dropping the last
/// reference releases the engine-side session.
///
/// # Examples
///
/// ```rust,no_run
/// use playmeter_client_core::{ClientBuilder, ContentMetadata};
/// use playmeter_client_core::config::AppConfig;
/// # use playmeter_client_core::events::*;
/// # use std::sync::Arc;
/// # struct MyDelegate;
/// # #[async_trait::async_trait]
/// # impl MeasurementEventHandler for MyDelegate {
/// #     async fn on_session_state_changed(&self, _info: SessionStatusInfo) {}
/// #     async fn on_playback_event(&self, _info: PlaybackEventInfo) {}
/// # }
///
/// # tokio_test::block_on(async {
/// let delegate = Arc::new(MyDelegate);
/// let client = ClientBuilder::new()
///     .app_config(AppConfig::new("P1234567-AB12", "ExamplePlayer", "1.0"))
///     .delegate(&delegate)
///     .build()
///     .await
///     .expect("measurement available");
///
/// client.load_metadata(ContentMetadata::new("asset-1")).await.unwrap();
/// client.play().await.unwrap();
/// client.report_playhead(std::time::Duration::from_secs(30)).await.unwrap();
/// client.stop().await.unwrap();
/// client.end().await.unwrap();
/// # });
/// ```
pub struct MeterClient {
    /// Unique identifier for this client instance
    id: ClientId,
    /// Configuration this client was built with
    config: AppConfig,
    /// Non-owning reference to the caller's delegate
    delegate: Weak<dyn MeasurementEventHandler>,
    /// The measurement engine behind this session
    backend: Arc<dyn MeasurementBackend>,
    /// Current session state
    state: RwLock<SessionState>,
    /// Metadata loaded into the session, if any
    metadata: RwLock<Option<ContentMetadata>>,
    /// When this client was constructed
    created_at: DateTime<Utc>,
}

impl std::fmt::Debug for MeterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeterClient")
            .field("id", &self.id)
            .field("app_id", &self.config.app_id)
            .field("delegate", &"<weak delegate>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl MeterClient {
    /// Internal constructor, called by the builder after the engine accepted
    /// the session.
    pub(crate) fn new(
        id: ClientId,
        config: AppConfig,
        delegate: Weak<dyn MeasurementEventHandler>,
        backend: Arc<dyn MeasurementBackend>,
    ) -> Self {
        Self {
            id,
            config,
            delegate,
            backend,
            state: RwLock::new(SessionState::Idle),
            metadata: RwLock::new(None),
            created_at: Utc::now(),
        }
    }

    /// This client's unique identifier
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// When this client was constructed
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current session state
    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    /// Metadata currently loaded into the session, if any
    pub async fn metadata(&self) -> Option<ContentMetadata> {
        self.metadata.read().await.clone()
    }

    /// Whether the delegate is still alive
    ///
    /// A dead delegate does not impair the client; events keep being
    /// recorded, only the callbacks are skipped.
    pub fn delegate_alive(&self) -> bool {
        self.delegate.upgrade().is_some()
    }

    /// Load content metadata into the session
    ///
    /// Allowed in any non-terminal state; reloading replaces the previous
    /// metadata (content change during the same session).
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidConfiguration`] for an empty asset id,
    /// [`ClientError::InvalidState`] once the session has ended.
    pub async fn load_metadata(&self, metadata: ContentMetadata) -> ClientResult<()> {
        if metadata.asset_id.trim().is_empty() {
            return Err(ClientError::invalid_configuration(
                "content metadata requires a non-empty asset_id",
            ));
        }

        {
            let state = *self.state.read().await;
            if state.is_final() {
                return Err(ClientError::invalid_state(format!(
                    "cannot load metadata: session is {state}"
                )));
            }
        }

        let event = self.playback_event(
            PlaybackEventType::MetadataLoaded {
                asset_id: metadata.asset_id.clone(),
            },
            Self::metadata_attributes(&metadata),
        );
        self.backend.record_event(self.id, &event).await?;

        *self.metadata.write().await = Some(metadata);
        tracing::debug!(client_id = %self.id, "content metadata loaded");

        self.notify_playback_event(event).await;
        Ok(())
    }

    /// Report that playback started
    ///
    /// Transitions `Idle` or `Stopped` to `Playing`. Calling `play` while
    /// already playing is a no-op.
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidState`] once the session has ended.
    pub async fn play(&self) -> ClientResult<()> {
        let event = self.playback_event(PlaybackEventType::PlaybackStarted, HashMap::new());
        let previous = {
            let mut state = self.state.write().await;
            match *state {
                SessionState::Playing => {
                    tracing::debug!(client_id = %self.id, "play while already playing, ignoring");
                    return Ok(());
                }
                SessionState::Ended => {
                    return Err(ClientError::invalid_state("cannot play: session has ended"));
                }
                previous => {
                    self.backend.record_event(self.id, &event).await?;
                    *state = SessionState::Playing;
                    previous
                }
            }
        };

        tracing::info!(client_id = %self.id, "measurement session playing");
        self.notify_state_change(SessionState::Playing, Some(previous), "playback started")
            .await;
        self.notify_playback_event(event).await;
        Ok(())
    }

    /// Report the current playhead position
    ///
    /// Only valid while the session is `Playing`.
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidState`] if the session is not playing.
    pub async fn report_playhead(&self, position: Duration) -> ClientResult<()> {
        {
            let state = *self.state.read().await;
            if state != SessionState::Playing {
                return Err(ClientError::invalid_state(format!(
                    "cannot report playhead: session is {state}"
                )));
            }
        }

        let event = self.playback_event(
            PlaybackEventType::PlayheadReported {
                position_secs: position.as_secs(),
            },
            HashMap::new(),
        );
        self.backend.record_event(self.id, &event).await?;
        self.notify_playback_event(event).await;
        Ok(())
    }

    /// Report that playback stopped
    ///
    /// Transitions `Playing` to `Stopped`. Calling `stop` while not playing
    /// is a no-op; the session can resume with [`play`](Self::play).
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidState`] once the session has ended.
    pub async fn stop(&self) -> ClientResult<()> {
        let event = self.playback_event(PlaybackEventType::PlaybackStopped, HashMap::new());
        let previous = {
            let mut state = self.state.write().await;
            match *state {
                SessionState::Ended => {
                    return Err(ClientError::invalid_state("cannot stop: session has ended"));
                }
                SessionState::Idle | SessionState::Stopped => {
                    tracing::debug!(client_id = %self.id, "stop while not playing, ignoring");
                    return Ok(());
                }
                SessionState::Playing => {
                    self.backend.record_event(self.id, &event).await?;
                    *state = SessionState::Stopped;
                    SessionState::Playing
                }
            }
        };

        tracing::info!(client_id = %self.id, "measurement session stopped");
        self.notify_state_change(SessionState::Stopped, Some(previous), "playback stopped")
            .await;
        self.notify_playback_event(event).await;
        Ok(())
    }

    /// End the measurement session
    ///
    /// Terminal: closes the engine-side session and moves the state to
    /// `Ended`. Every later operation fails with
    /// [`ClientError::InvalidState`].
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidState`] if the session already ended, or the
    /// engine's error if closing the session fails (the session is still
    /// marked ended locally).
    pub async fn end(&self) -> ClientResult<()> {
        let previous = {
            let mut state = self.state.write().await;
            if state.is_final() {
                return Err(ClientError::invalid_state("session has already ended"));
            }
            let previous = *state;
            *state = SessionState::Ended;
            previous
        };

        let close_result = self.backend.close_session(self.id).await;

        tracing::info!(client_id = %self.id, "measurement session ended");
        self.notify_state_change(SessionState::Ended, Some(previous), "session ended")
            .await;
        self.notify_playback_event(
            self.playback_event(PlaybackEventType::SessionEnded, HashMap::new()),
        )
        .await;

        if let Err(err) = close_result {
            let error = ClientError::from(err);
            tracing::warn!(client_id = %self.id, %error, "engine failed to close session");
            if let Some(delegate) = self.delegate.upgrade() {
                delegate.on_client_error(error.clone(), Some(self.id)).await;
            }
            return Err(error);
        }
        Ok(())
    }

    /// Build a playback event stamped with this client's id
    fn playback_event(
        &self,
        event_type: PlaybackEventType,
        metadata: HashMap<String, String>,
    ) -> PlaybackEventInfo {
        PlaybackEventInfo {
            client_id: self.id,
            event_type,
            timestamp: Utc::now(),
            metadata,
        }
    }

    /// Flatten content metadata into event attributes
    fn metadata_attributes(metadata: &ContentMetadata) -> HashMap<String, String> {
        let mut attributes = metadata.custom.clone();
        if let Some(program) = &metadata.program {
            attributes.insert("program".to_string(), program.clone());
        }
        if let Some(title) = &metadata.title {
            attributes.insert("title".to_string(), title.clone());
        }
        if let Some(channel) = &metadata.channel_name {
            attributes.insert("channel_name".to_string(), channel.clone());
        }
        if let Some(length) = metadata.length_secs {
            attributes.insert("length_secs".to_string(), length.to_string());
        }
        attributes
    }

    /// Dispatch a state change to the delegate, if it is still alive
    async fn notify_state_change(
        &self,
        new_state: SessionState,
        previous_state: Option<SessionState>,
        reason: &str,
    ) {
        let Some(delegate) = self.delegate.upgrade() else {
            tracing::debug!(
                client_id = %self.id,
                "delegate no longer alive, dropping state change callback"
            );
            return;
        };
        delegate
            .on_session_state_changed(SessionStatusInfo {
                client_id: self.id,
                new_state,
                previous_state,
                reason: Some(reason.to_string()),
                timestamp: Utc::now(),
            })
            .await;
    }

    /// Dispatch a playback event to the delegate, if it is still alive
    async fn notify_playback_event(&self, event: PlaybackEventInfo) {
        let Some(delegate) = self.delegate.upgrade() else {
            tracing::debug!(
                client_id = %self.id,
                "delegate no longer alive, dropping playback event callback"
            );
            return;
        };
        delegate.on_playback_event(event).await;
    }
}

impl Drop for MeterClient {
    fn drop(&mut self) {
        // The engine must not keep accumulating state for a client the
        // caller has released.
        self.backend.release(self.id);
        tracing::debug!(client_id = %self.id, "measurement client dropped");
    }
}
