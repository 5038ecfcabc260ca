//! Measurement engine boundary
//!
//! The actual measurement logic - aggregation, transport, persistence - lives
//! in an opaque engine behind the [`MeasurementBackend`] trait. The client
//! layer only opens sessions, records events, and closes sessions through
//! this seam; everything past it is the engine's concern.
//!
//! [`InProcessBackend`] is the bundled default engine. It keeps session
//! accounting in memory and logs recorded events, which is enough for the
//! client layer's contract; deployments with a real collector supply their
//! own implementation via
//! [`ClientBuilder::backend`](crate::client::ClientBuilder::backend).

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::client::types::ClientId;
use crate::config::AppConfig;
use crate::events::PlaybackEventInfo;

/// Errors surfaced by a measurement engine
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The engine rejected the request
    #[error("rejected: {reason}")]
    Rejected {
        /// Why the engine rejected the request
        reason: String,
    },
    /// The engine is not available
    #[error("unavailable: {reason}")]
    Unavailable {
        /// Why the engine is unavailable
        reason: String,
    },
}

impl BackendError {
    /// Create a rejection error
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Create an unavailability error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// The opaque measurement engine consumed by client instances
///
/// Implementations must be cheap to share (`Arc`) and safe to call from
/// concurrent client instances; each client only ever passes its own
/// [`ClientId`].
///
/// Construction calls `initialize` (engine-level, idempotent per engine) and
/// then `open_session` for the new client. A failure from either aborts the
/// construction; the caller never sees a client whose session did not open.
#[async_trait]
pub trait MeasurementBackend: Send + Sync + std::fmt::Debug {
    /// Prepare the engine for use with the given configuration
    ///
    /// Called once per client construction. Implementations are expected to
    /// make repeated calls harmless.
    async fn initialize(&self, config: &AppConfig) -> BackendResult<()>;

    /// Open a measurement session for a new client
    async fn open_session(&self, client_id: ClientId, config: &AppConfig) -> BackendResult<()>;

    /// Record a playback event against an open session
    async fn record_event(&self, client_id: ClientId, event: &PlaybackEventInfo)
        -> BackendResult<()>;

    /// Close a session; no further events will be recorded for it
    async fn close_session(&self, client_id: ClientId) -> BackendResult<()>;

    /// Release all engine resources for a client
    ///
    /// Called from the client's drop path, so it must not block or fail.
    fn release(&self, client_id: ClientId);
}

/// Per-session accounting kept by the in-process engine
#[derive(Debug, Clone)]
struct SessionRecord {
    opened_at: chrono::DateTime<chrono::Utc>,
    events_recorded: u64,
    closed: bool,
}

/// Bundled in-process measurement engine
///
/// Accepts every session and event, keeps in-memory accounting, and logs
/// recorded events at debug level as the JSON payload a collector would
/// receive. Sessions are removed when the owning client is released.
#[derive(Debug, Default)]
pub struct InProcessBackend {
    sessions: DashMap<ClientId, SessionRecord>,
}

impl InProcessBackend {
    /// Create a new in-process engine
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Shared handle to a new in-process engine
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of sessions currently tracked (open or closed, not released)
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of events recorded for a session, if it is tracked
    pub fn events_recorded(&self, client_id: ClientId) -> Option<u64> {
        self.sessions.get(&client_id).map(|s| s.events_recorded)
    }
}

#[async_trait]
impl MeasurementBackend for InProcessBackend {
    async fn initialize(&self, config: &AppConfig) -> BackendResult<()> {
        tracing::debug!(
            app_id = %config.app_id,
            environment = %config.environment,
            "in-process measurement engine ready"
        );
        Ok(())
    }

    async fn open_session(&self, client_id: ClientId, config: &AppConfig) -> BackendResult<()> {
        self.sessions.insert(
            client_id,
            SessionRecord {
                opened_at: chrono::Utc::now(),
                events_recorded: 0,
                closed: false,
            },
        );
        tracing::debug!(
            %client_id,
            app_id = %config.app_id,
            "measurement session opened"
        );
        Ok(())
    }

    async fn record_event(
        &self,
        client_id: ClientId,
        event: &PlaybackEventInfo,
    ) -> BackendResult<()> {
        let mut session = self
            .sessions
            .get_mut(&client_id)
            .ok_or_else(|| BackendError::rejected(format!("unknown session {client_id}")))?;
        if session.closed {
            return Err(BackendError::rejected(format!("session {client_id} is closed")));
        }
        session.events_recorded += 1;

        let payload = serde_json::to_string(&event.event_type).unwrap_or_default();
        tracing::debug!(
            %client_id,
            %payload,
            total = session.events_recorded,
            "measurement event recorded"
        );
        Ok(())
    }

    async fn close_session(&self, client_id: ClientId) -> BackendResult<()> {
        let mut session = self
            .sessions
            .get_mut(&client_id)
            .ok_or_else(|| BackendError::rejected(format!("unknown session {client_id}")))?;
        session.closed = true;
        let lifetime = chrono::Utc::now() - session.opened_at;
        tracing::debug!(
            %client_id,
            events = session.events_recorded,
            lifetime_ms = lifetime.num_milliseconds(),
            "measurement session closed"
        );
        Ok(())
    }

    fn release(&self, client_id: ClientId) {
        if self.sessions.remove(&client_id).is_some() {
            tracing::debug!(%client_id, "measurement session released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::PlaybackEventType;
    use std::collections::HashMap;

    fn event_for(client_id: ClientId) -> PlaybackEventInfo {
        PlaybackEventInfo {
            client_id,
            event_type: PlaybackEventType::PlaybackStarted,
            timestamp: chrono::Utc::now(),
            metadata: HashMap::new(),
        }
    }

    fn config() -> AppConfig {
        AppConfig::new("P1234567-AB12", "TestPlayer", "0.1.0")
    }

    #[tokio::test]
    async fn session_accounting_tracks_events() {
        let backend = InProcessBackend::new();
        let id = ClientId::new_v4();

        backend.initialize(&config()).await.unwrap();
        backend.open_session(id, &config()).await.unwrap();
        assert_eq!(backend.session_count(), 1);
        assert_eq!(backend.events_recorded(id), Some(0));

        backend.record_event(id, &event_for(id)).await.unwrap();
        backend.record_event(id, &event_for(id)).await.unwrap();
        assert_eq!(backend.events_recorded(id), Some(2));
    }

    #[tokio::test]
    async fn recording_against_unknown_session_is_rejected() {
        let backend = InProcessBackend::new();
        let id = ClientId::new_v4();
        let err = backend.record_event(id, &event_for(id)).await.unwrap_err();
        assert!(matches!(err, BackendError::Rejected { .. }));
    }

    #[tokio::test]
    async fn closed_sessions_reject_further_events() {
        let backend = InProcessBackend::new();
        let id = ClientId::new_v4();
        backend.open_session(id, &config()).await.unwrap();
        backend.close_session(id).await.unwrap();

        let err = backend.record_event(id, &event_for(id)).await.unwrap_err();
        assert!(matches!(err, BackendError::Rejected { .. }));
    }

    #[tokio::test]
    async fn release_removes_the_session() {
        let backend = InProcessBackend::new();
        let id = ClientId::new_v4();
        backend.open_session(id, &config()).await.unwrap();
        backend.release(id);
        assert_eq!(backend.session_count(), 0);
        // Releasing twice is harmless
        backend.release(id);
    }
}
