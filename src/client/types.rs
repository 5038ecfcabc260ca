//! Type definitions for the measurement client library
//!
//! Client-facing value types: the client identifier and the content metadata
//! the embedding player loads into a session before playback.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a measurement client instance
///
/// Assigned at construction; every client produced by the factory carries a
/// distinct id.
pub type ClientId = Uuid;

/// Content metadata loaded into a measurement session
///
/// Describes the asset being played. The embedding player loads this before
/// (or during) playback; the measurement engine attaches it to every event
/// recorded for the session.
///
/// # Examples
///
/// ```rust
/// use playmeter_client_core::ContentMetadata;
///
/// let metadata = ContentMetadata::new("asset-8271")
///     .with_program("Evening News")
///     .with_title("Episode 412")
///     .with_length_secs(1800)
///     .with_channel_name("channel-one")
///     .with_custom_attribute("genre", "news");
///
/// assert_eq!(metadata.asset_id, "asset-8271");
/// assert_eq!(metadata.length_secs, Some(1800));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// Asset identifier; required, must be non-empty
    pub asset_id: String,
    /// Program or series name
    pub program: Option<String>,
    /// Episode or content title
    pub title: Option<String>,
    /// Total content length in seconds, if known (live content: `None`)
    pub length_secs: Option<u64>,
    /// Channel or station name the content plays on
    pub channel_name: Option<String>,
    /// Additional provider-specific attributes
    #[serde(default)]
    pub custom: HashMap<String, String>,
}

impl ContentMetadata {
    /// Create metadata for an asset
    pub fn new(asset_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            program: None,
            title: None,
            length_secs: None,
            channel_name: None,
            custom: HashMap::new(),
        }
    }

    /// Set the program or series name
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Set the content title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the total content length in seconds
    pub fn with_length_secs(mut self, length_secs: u64) -> Self {
        self.length_secs = Some(length_secs);
        self
    }

    /// Set the channel name
    pub fn with_channel_name(mut self, channel_name: impl Into<String>) -> Self {
        self.channel_name = Some(channel_name.into());
        self
    }

    /// Attach a provider-specific attribute
    pub fn with_custom_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_builder_sets_fields() {
        let metadata = ContentMetadata::new("asset-1")
            .with_program("Show")
            .with_length_secs(600)
            .with_custom_attribute("genre", "drama");
        assert_eq!(metadata.program.as_deref(), Some("Show"));
        assert_eq!(metadata.length_secs, Some(600));
        assert_eq!(metadata.custom.get("genre").map(String::as_str), Some("drama"));
        assert!(metadata.title.is_none());
    }

    #[test]
    fn metadata_round_trips_through_json() {
        let metadata = ContentMetadata::new("asset-2").with_channel_name("channel-one");
        let json = serde_json::to_string(&metadata).unwrap();
        let restored: ContentMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, metadata);
    }
}
