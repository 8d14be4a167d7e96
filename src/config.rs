//! # Face configuration
//! Settings that are fixed at build time. `build.rs` reads `config/face_config.json` and generates the
//! constants included below; a missing file yields the defaults.
//!
//! ```json
//! {
//!     "clock_24h": true,
//!     "blocked_feedback": false,
//!     "volume": 13
//! }
//! ```

include!(concat!(env!("OUT_DIR"), "/face_config.rs"));

/// Configuration handed to the face by its caller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaceConfig {
    /// Show times in 24-hour format, otherwise 12-hour with a PM flag
    pub clock_24h: bool,
    /// Ask for user feedback when settings entry is refused while an alarm is pending
    pub blocked_feedback: bool,
    /// Playback volume, used by the sound output only
    pub volume: u8,
}

impl FaceConfig {
    /// The configuration generated from `config/face_config.json`
    pub const BUILD: Self = Self {
        clock_24h: CLOCK_24H,
        blocked_feedback: BLOCKED_FEEDBACK,
        volume: VOLUME,
    };
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self::BUILD
    }
}
