#![forbid(unsafe_code)]

//! Persisted pager state.
//!
//! [`SavedState`] is what a host keeps across process restarts to bring a
//! pager back to the same page: the committed index plus an opaque blob from
//! the adapter.
//!
//! # Feature Gates
//!
//! - `state-persistence`: JSON encoding through [`SavedState::to_json`] and
//!   [`SavedState::from_json`]. The adapter blob is stored base64-encoded.

/// Snapshot of a pager's committed position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SavedState {
    /// Committed page index.
    pub current_index: usize,
    /// Opaque state produced by the adapter.
    pub adapter_state: Option<Vec<u8>>,
}

impl SavedState {
    /// State for `current_index` without adapter data.
    #[must_use]
    pub fn new(current_index: usize) -> Self {
        Self {
            current_index,
            adapter_state: None,
        }
    }

    /// Attach adapter data (builder).
    #[must_use]
    pub fn with_adapter_state(mut self, state: Vec<u8>) -> Self {
        self.adapter_state = Some(state);
        self
    }
}

#[cfg(feature = "state-persistence")]
mod json {
    use base64::Engine;
    use serde::{Deserialize, Serialize};

    use super::SavedState;

    /// Errors from encoding or decoding persisted state.
    #[derive(Debug, thiserror::Error)]
    pub enum StateError {
        /// JSON encode or decode failed.
        #[error("state serialization failed: {0}")]
        Serialization(#[from] serde_json::Error),
        /// The stored format is not one this version reads.
        #[error("unsupported state format version {found} (expected {expected})")]
        Version {
            /// Version found in the input.
            found: u32,
            /// Version this build writes.
            expected: u32,
        },
        /// The adapter blob is not valid base64.
        #[error("adapter state is not valid base64: {0}")]
        Encoding(#[from] base64::DecodeError),
    }

    /// On-disk layout.
    #[derive(Serialize, Deserialize)]
    struct StateFile {
        format_version: u32,
        current_index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        adapter_state_base64: Option<String>,
    }

    impl StateFile {
        const FORMAT_VERSION: u32 = 1;
    }

    impl SavedState {
        /// Encode as JSON.
        ///
        /// # Errors
        ///
        /// Returns [`StateError::Serialization`] if encoding fails.
        pub fn to_json(&self) -> Result<String, StateError> {
            let file = StateFile {
                format_version: StateFile::FORMAT_VERSION,
                current_index: self.current_index,
                adapter_state_base64: self
                    .adapter_state
                    .as_ref()
                    .map(|data| base64::engine::general_purpose::STANDARD.encode(data)),
            };
            Ok(serde_json::to_string(&file)?)
        }

        /// Decode JSON produced by [`SavedState::to_json`].
        ///
        /// # Errors
        ///
        /// Fails on malformed JSON, an unknown format version, or a corrupt
        /// adapter blob.
        pub fn from_json(json: &str) -> Result<Self, StateError> {
            let file: StateFile = serde_json::from_str(json)?;
            if file.format_version != StateFile::FORMAT_VERSION {
                tracing::warn!(
                    stored = file.format_version,
                    expected = StateFile::FORMAT_VERSION,
                    "pager state format version mismatch"
                );
                return Err(StateError::Version {
                    found: file.format_version,
                    expected: StateFile::FORMAT_VERSION,
                });
            }
            let adapter_state = file
                .adapter_state_base64
                .map(|encoded| base64::engine::general_purpose::STANDARD.decode(encoded))
                .transpose()?;
            Ok(SavedState {
                current_index: file.current_index,
                adapter_state,
            })
        }
    }
}

#[cfg(feature = "state-persistence")]
pub use json::StateError;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
