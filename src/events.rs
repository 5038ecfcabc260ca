//! Event handling for measurement client operations
//!
//! This module defines the delegate capability: the callback contract through
//! which a measurement client notifies the embedding application about
//! session lifecycle changes and playback-related events.
//!
//! The client holds a *non-owning* (weak) reference to its delegate. The
//! delegate's lifetime is managed entirely by the caller; if the delegate is
//! dropped, subsequent events are silently discarded and no callback ever
//! fires on a dead delegate.
//!
//! # Event Types
//!
//! - **Session state changes** - Idle, Playing, Stopped, Ended transitions
//! - **Playback events** - metadata loads, playhead reports, start/stop
//! - **Client errors** - runtime failures forwarded for observability
//!
//! # Usage Examples
//!
//! ## Basic Delegate
//!
//! ```rust
//! use playmeter_client_core::events::{
//!     MeasurementEventHandler, PlaybackEventInfo, SessionStatusInfo,
//! };
//! use async_trait::async_trait;
//!
//! struct LoggingDelegate;
//!
//! #[async_trait]
//! impl MeasurementEventHandler for LoggingDelegate {
//!     async fn on_session_state_changed(&self, info: SessionStatusInfo) {
//!         println!("session {:?} -> {:?}", info.client_id, info.new_state);
//!     }
//!
//!     async fn on_playback_event(&self, info: PlaybackEventInfo) {
//!         println!("playback event: {:?}", info.event_type);
//!     }
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::client::types::ClientId;
use crate::error::ClientError;

/// Measurement session states
///
/// A session starts `Idle`, moves between `Playing` and `Stopped` as the
/// embedding player reports playback, and terminates in `Ended`. `Ended` is
/// final; no operation can leave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Session created, no playback reported yet
    Idle,
    /// Playback is being measured
    Playing,
    /// Playback stopped or interrupted; session can resume
    Stopped,
    /// Session finished; terminal state
    Ended,
}

impl SessionState {
    /// Whether this state is terminal
    pub fn is_final(&self) -> bool {
        matches!(self, SessionState::Ended)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Playing => write!(f, "playing"),
            SessionState::Stopped => write!(f, "stopped"),
            SessionState::Ended => write!(f, "ended"),
        }
    }
}

/// Information about a session state change
///
/// Delivered to the delegate whenever a client's session transitions between
/// states.
#[derive(Debug, Clone)]
pub struct SessionStatusInfo {
    /// Client whose session changed state
    pub client_id: ClientId,
    /// New session state after the transition
    pub new_state: SessionState,
    /// Previous session state before the transition (if known)
    pub previous_state: Option<SessionState>,
    /// Reason for the state change (e.g., "playback started")
    pub reason: Option<String>,
    /// When the state change occurred
    pub timestamp: DateTime<Utc>,
}

/// Types of playback events reported to the measurement engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackEventType {
    /// Content metadata was loaded into the session
    MetadataLoaded {
        /// Asset identifier from the loaded metadata
        asset_id: String,
    },
    /// Playback started
    PlaybackStarted,
    /// The player reported its current playhead position
    PlayheadReported {
        /// Playhead position in whole seconds from content start
        position_secs: u64,
    },
    /// Playback stopped or was interrupted
    PlaybackStopped,
    /// The session was ended by the caller
    SessionEnded,
}

/// Playback event information
///
/// Carries one measured playback event together with its timing and any
/// additional metadata attached by the client.
#[derive(Debug, Clone)]
pub struct PlaybackEventInfo {
    /// Client the event belongs to
    pub client_id: ClientId,
    /// The event that occurred
    pub event_type: PlaybackEventType,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// Additional event metadata (content attributes, channel info, etc.)
    pub metadata: HashMap<String, String>,
}

/// Delegate capability for measurement clients
///
/// Implement this trait to receive session lifecycle and playback event
/// notifications from a [`MeterClient`](crate::client::MeterClient). Any
/// object implementing this trait may be passed to the factory; the returned
/// client keeps only a weak reference to it.
///
/// Callback timing is driven by the client's session operations; no callback
/// is ever delivered after the delegate has been dropped.
///
/// # Examples
///
/// ```rust
/// use playmeter_client_core::events::{
///     MeasurementEventHandler, PlaybackEventInfo, SessionStatusInfo,
/// };
/// use async_trait::async_trait;
///
/// struct UiDelegate;
///
/// #[async_trait]
/// impl MeasurementEventHandler for UiDelegate {
///     async fn on_session_state_changed(&self, info: SessionStatusInfo) {
///         // update a status indicator
///         let _ = info.new_state;
///     }
///
///     async fn on_playback_event(&self, _info: PlaybackEventInfo) {}
/// }
/// ```
#[async_trait]
pub trait MeasurementEventHandler: Send + Sync {
    /// Handle a session state change
    ///
    /// Called on every state transition of the owning client's session.
    async fn on_session_state_changed(&self, status_info: SessionStatusInfo);

    /// Handle a playback event
    ///
    /// Called after the client has recorded a playback event with the
    /// underlying measurement engine.
    async fn on_playback_event(&self, event_info: PlaybackEventInfo);

    /// Handle client errors (optional - default implementation does nothing)
    ///
    /// Called when runtime errors occur inside the client. Override to
    /// implement custom error reporting.
    async fn on_client_error(&self, _error: ClientError, _client_id: Option<ClientId>) {
        // Default implementation - can be overridden for error handling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ended_is_the_only_final_state() {
        assert!(SessionState::Ended.is_final());
        assert!(!SessionState::Idle.is_final());
        assert!(!SessionState::Playing.is_final());
        assert!(!SessionState::Stopped.is_final());
    }

    #[test]
    fn event_type_serializes() {
        let event = PlaybackEventType::PlayheadReported { position_secs: 42 };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("42"));
        let restored: PlaybackEventType = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, event);
    }
}
