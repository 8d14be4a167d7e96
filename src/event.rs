//! Events going into the face and the requests coming out of it
use crate::alarm::Pitch;
use crate::clock::WallClock;
use crate::display::View;
use heapless::Vec;

/// The most requests a single event can produce
pub const MAX_REQUESTS: usize = 8;

/// The requests produced by handling one event, in the order they should be carried out
pub type Requests = Vec<FaceRequest, MAX_REQUESTS>;

/// What happened
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    /// First-time initialization of the face
    Setup,
    /// The face came to the foreground
    Activate,
    /// The face left the foreground
    Resign,
    /// The foreground tick, with the current clock reading
    Tick(WallClock),
    /// The sleep scheduler woke the face in the background because an alarm is due
    BackgroundFire(WallClock),
    /// The primary button was released
    PrimaryButtonUp,
    /// The settings button was released after a short press
    SettingsButtonUp,
    /// The settings button was held down
    SettingsLongPress,
}

/// An event delivered to the face
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaceEvent {
    /// What happened
    pub kind: EventKind,
    /// Monotonic sub-second counter, only its parity is used, for blinking
    pub subsecond: u8,
}

impl FaceEvent {
    /// Create a new event
    pub const fn new(kind: EventKind, subsecond: u8) -> Self {
        Self { kind, subsecond }
    }

    /// The blink phase of the event, on for even counter values
    pub const fn blink_on(&self) -> bool {
        self.subsecond % 2 == 0
    }
}

/// How often the face wants to be ticked
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickRate {
    /// Once per second
    Normal,
    /// Twice per second, for blinking
    Fast,
}

impl TickRate {
    /// Ticks per second
    pub const fn hz(self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::Fast => 2,
        }
    }
}

/// Side effects the face asks its caller to carry out
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaceRequest {
    /// Show the given view
    Render(View),
    /// Play the alarm of the given slot with its own playback parameters
    PlayAlarm {
        /// The slot that fired
        index: usize,
        /// Tone of the alarm
        pitch: Pitch,
        /// Number of beeps
        beep_count: u8,
    },
    /// Stop any alarm sound that is still playing
    StopAlarm,
    /// Change the tick rate
    TickRate(TickRate),
    /// Settings entry was refused, signal it to the user
    BlockedFeedback,
    /// The persisted part of the state changed
    Persist,
}
