//! # State of the alarm face
//! This module describes the state the face keeps between events, and the checks that keep it consistent.
//!
//! The state is created once by the setup event and then survives every activation, deactivation and sleep
//! cycle of the device unchanged.
use crate::alarm::{ALARM_COUNT, AlarmConfig, AlarmRegistry};
use crate::clock::{WallClock, is_valid_time};
use crate::event::TickRate;
use crate::repeat::next_repeat;

/// The one alarm that waits for the user to acknowledge it, and when it fires next
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingAck {
    /// The slot of the pending alarm in the registry
    pub alarm_index: usize,
    /// Hour of the next repeat
    pub target_hour: u8,
    /// Minute of the next repeat
    pub target_minute: u8,
}

impl PendingAck {
    /// Arm the alarm in the given slot, which fired at `fired_at`
    pub const fn armed(alarm_index: usize, fired_at: WallClock) -> Self {
        let (target_hour, target_minute) = next_repeat(fired_at.hour, fired_at.minute);
        Self {
            alarm_index,
            target_hour,
            target_minute,
        }
    }

    /// Check if the next repeat is due at the given clock reading
    pub const fn is_due(&self, now: WallClock) -> bool {
        now.is_at(self.target_hour, self.target_minute)
    }

    /// Move the target one repeat interval further
    pub const fn advance(&mut self) {
        let (target_hour, target_minute) = next_repeat(self.target_hour, self.target_minute);
        self.target_hour = target_hour;
        self.target_minute = target_minute;
    }
}

/// The slots already handled in one minute, so that none of them fires twice in that minute
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MinuteGuard {
    /// The guarded minute
    pub minute: WallClock,
    /// Handled flag per slot
    handled: [bool; ALARM_COUNT],
}

impl MinuteGuard {
    /// A guard for the given minute with nothing handled yet
    pub const fn new(minute: WallClock) -> Self {
        Self {
            minute,
            handled: [false; ALARM_COUNT],
        }
    }

    /// Check if the slot was handled in the guarded minute
    pub fn covers(&self, index: usize) -> bool {
        self.handled.get(index).copied().unwrap_or(false)
    }

    /// Record the slot as handled
    pub fn mark(&mut self, index: usize) {
        if let Some(handled) = self.handled.get_mut(index) {
            *handled = true;
        }
    }

    /// Check if any slot was handled
    pub fn any(&self) -> bool {
        self.handled.contains(&true)
    }
}

/// The settings field that is being edited
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EditField {
    /// The day setting
    Schedule,
    /// The alarm hour
    Hour,
    /// The alarm minute
    Minute,
    /// Off, on or repeat
    Status,
    /// The alarm tone
    Pitch,
    /// The number of beeps
    BeepCount,
}

impl EditField {
    /// The field that follows in the settings cycle, `None` after the last one
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Schedule => Some(Self::Hour),
            Self::Hour => Some(Self::Minute),
            Self::Minute => Some(Self::Status),
            Self::Status => Some(Self::Pitch),
            Self::Pitch => Some(Self::BeepCount),
            Self::BeepCount => None,
        }
    }
}

/// The UI mode of the face
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaceMode {
    /// The regular view of the alarm slots
    Normal,
    /// A repeating alarm waits for acknowledgment. Settings are locked.
    PendingAcknowledgment,
}

/// A consistency check on the state failed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvariantViolation {
    /// The cursor points outside the registry
    CursorOutOfRange(usize),
    /// The sounding alarm is outside the registry
    SoundingOutOfRange(usize),
    /// The pending alarm is outside the registry
    PendingOutOfRange(usize),
    /// The pending alarm is not an enabled repeating alarm
    PendingNotArmed(usize),
    /// The pending target is not a time of day
    PendingTargetOutOfRange {
        /// Target hour
        hour: u8,
        /// Target minute
        minute: u8,
    },
    /// An alarm slot holds values that are out of range
    AlarmOutOfRange(usize),
}

/// All the state of the face is kept in this struct.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmState {
    /// The alarm slots
    pub registry: AlarmRegistry,
    /// The slot that is shown and edited
    pub cursor: usize,
    /// The slot whose alarm was fired last and may still be playing
    pub sounding: Option<usize>,
    /// The slots that fired in the minute of the last fire, to not fire any of them twice in that minute
    pub last_handled: Option<MinuteGuard>,
    /// The settings sub-mode is active
    pub is_editing: bool,
    /// The field that is being edited, only meaningful while editing
    pub edit_field: EditField,
    /// The repeating alarm waiting for acknowledgment
    pub pending: Option<PendingAck>,
}

impl AlarmState {
    /// Create the state of a freshly set up face: all slots empty, nothing pending
    pub const fn new() -> Self {
        Self {
            registry: AlarmRegistry::new(),
            cursor: 0,
            sounding: None,
            last_handled: None,
            is_editing: false,
            edit_field: EditField::Schedule,
            pending: None,
        }
    }

    /// The UI mode the face is in
    pub const fn mode(&self) -> FaceMode {
        if self.pending.is_some() {
            FaceMode::PendingAcknowledgment
        } else {
            FaceMode::Normal
        }
    }

    /// The tick rate the face needs: fast while something blinks
    pub const fn tick_rate(&self) -> TickRate {
        if self.pending.is_some() || self.is_editing {
            TickRate::Fast
        } else {
            TickRate::Normal
        }
    }

    /// The alarm under the cursor
    pub fn selected(&self) -> Option<&AlarmConfig> {
        self.registry.get(self.cursor)
    }

    /// Check the invariants of the state. None of these can break through the face's own transitions.
    pub fn check(&self) -> Result<(), InvariantViolation> {
        if self.cursor >= ALARM_COUNT {
            return Err(InvariantViolation::CursorOutOfRange(self.cursor));
        }
        if let Some(index) = self.sounding.filter(|index| *index >= ALARM_COUNT) {
            return Err(InvariantViolation::SoundingOutOfRange(index));
        }
        if let Some(pending) = self.pending {
            if pending.alarm_index >= ALARM_COUNT {
                return Err(InvariantViolation::PendingOutOfRange(pending.alarm_index));
            }
            if !is_valid_time(pending.target_hour, pending.target_minute) {
                return Err(InvariantViolation::PendingTargetOutOfRange {
                    hour: pending.target_hour,
                    minute: pending.target_minute,
                });
            }
            if !self.pending_is_armed() {
                return Err(InvariantViolation::PendingNotArmed(pending.alarm_index));
            }
        }
        if let Some(index) = self.registry.slots().iter().position(|alarm| !alarm.is_valid()) {
            return Err(InvariantViolation::AlarmOutOfRange(index));
        }
        Ok(())
    }

    /// Bring a state that failed [`Self::check`] back to a known-safe one. Broken slots are reset, references
    /// that point nowhere are dropped.
    pub fn recover(&mut self) {
        let repaired = self.registry.repair();
        if self.cursor >= ALARM_COUNT {
            self.cursor = 0;
        }
        if self.sounding.is_some_and(|index| index >= ALARM_COUNT) {
            self.sounding = None;
        }
        if self.pending.is_some_and(|pending| !is_valid_time(pending.target_hour, pending.target_minute))
            || !self.pending_is_armed()
        {
            warn!("Dropping pending alarm that is not armed");
            self.pending = None;
        }
        warn!("State recovered, {} alarm slots reset", repaired);
    }

    /// Check that the pending alarm, if any, is an enabled repeating alarm of the registry
    pub fn pending_is_armed(&self) -> bool {
        self.pending.is_none_or(|pending| {
            self.registry
                .get(pending.alarm_index)
                .is_some_and(|alarm| alarm.enabled && alarm.repeat)
        })
    }

    /// Check if anything that is persisted differs from `other`
    pub fn persisted_differs(&self, other: &Self) -> bool {
        self.registry != other.registry || self.pending != other.pending || self.cursor != other.cursor
    }
}

impl Default for AlarmState {
    fn default() -> Self {
        Self::new()
    }
}
