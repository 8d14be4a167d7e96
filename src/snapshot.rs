//! # Snapshot
//! The byte layout in which the state is persisted between power cycles.
//!
//! The layout follows the key/value scheme of the flash storage: every alarm slot is one value of
//! [`SLOT_LEN`] bytes, the pending slot is one value of [`PENDING_LEN`] bytes and the cursor is a single byte.
//!
//! | slot byte | content                                                     |
//! |-----------|-------------------------------------------------------------|
//! | 0         | schedule: 0-6 weekday (Monday first), 7 every day, 8 one time |
//! | 1         | hour                                                        |
//! | 2         | minute                                                      |
//! | 3         | beep count                                                  |
//! | 4         | pitch: 0 low, 1 medium, 2 high                              |
//! | 5         | flags: bit 0 enabled, bit 1 repeat                          |
//!
//! The pending value is `[present, index, hour, minute]`, all zero when nothing is pending. The sounding alarm,
//! the minute guard and the settings sub-mode are not persisted.
use crate::alarm::{ALARM_COUNT, AlarmConfig, AlarmRegistry, Pitch, Schedule};
use crate::clock::{Weekday, is_valid_time};
use crate::state::{AlarmState, PendingAck};

/// Length of one persisted alarm slot
pub const SLOT_LEN: usize = 6;

/// Length of the persisted pending slot
pub const PENDING_LEN: usize = 4;

/// Schedule code of an every-day alarm
const EVERY_DAY: u8 = 7;
/// Schedule code of a one-time alarm
const ONE_TIME: u8 = 8;
/// Flag bit of an enabled alarm
const FLAG_ENABLED: u8 = 0b01;
/// Flag bit of a repeating alarm
const FLAG_REPEAT: u8 = 0b10;

/// The persisted image of the state
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    /// One value per alarm slot
    pub slots: [[u8; SLOT_LEN]; ALARM_COUNT],
    /// The pending slot
    pub pending: [u8; PENDING_LEN],
    /// The cursor
    pub cursor: u8,
}

impl Snapshot {
    /// Take the image of a state
    #[allow(clippy::cast_possible_truncation)]
    pub fn capture(state: &AlarmState) -> Self {
        let mut slots = [[0; SLOT_LEN]; ALARM_COUNT];
        for (slot, alarm) in slots.iter_mut().zip(state.registry.slots()) {
            *slot = encode_alarm(alarm);
        }
        Self {
            slots,
            pending: encode_pending(state.pending),
            cursor: state.cursor as u8,
        }
    }

    /// Rebuild the state from the image. Slots that do not decode are reset, a pending value or cursor that
    /// does not decode is dropped.
    pub fn restore(&self) -> AlarmState {
        let mut alarms = [AlarmConfig::DEFAULT; ALARM_COUNT];
        for (index, (alarm, bytes)) in alarms.iter_mut().zip(&self.slots).enumerate() {
            match decode_alarm(*bytes) {
                Some(decoded) => *alarm = decoded,
                None => warn!("Persisted alarm {} is invalid, resetting it", index),
            }
        }
        let pending = decode_pending(self.pending).unwrap_or_else(|| {
            warn!("Persisted pending alarm is invalid, dropping it");
            None
        });
        let cursor = usize::from(self.cursor);

        let mut state = AlarmState {
            registry: AlarmRegistry::from_slots(alarms),
            cursor: if cursor < ALARM_COUNT { cursor } else { 0 },
            pending,
            ..AlarmState::new()
        };
        // a pending alarm needs an enabled repeating slot, which a reset slot is not
        if !state.pending_is_armed() {
            warn!("Persisted pending alarm is not armed, dropping it");
            state.pending = None;
        }
        state
    }
}

/// Encode one alarm slot
pub const fn encode_alarm(alarm: &AlarmConfig) -> [u8; SLOT_LEN] {
    let schedule = match alarm.schedule {
        Schedule::Weekday(day) => day.index(),
        Schedule::EveryDay => EVERY_DAY,
        Schedule::OneTime => ONE_TIME,
    };
    let pitch = match alarm.pitch {
        Pitch::Low => 0,
        Pitch::Medium => 1,
        Pitch::High => 2,
    };
    let mut flags = 0;
    if alarm.enabled {
        flags |= FLAG_ENABLED;
    }
    if alarm.repeat {
        flags |= FLAG_REPEAT;
    }
    [schedule, alarm.hour, alarm.minute, alarm.beep_count, pitch, flags]
}

/// Decode one alarm slot, `None` if any field is out of range
pub fn decode_alarm(bytes: [u8; SLOT_LEN]) -> Option<AlarmConfig> {
    let [schedule, hour, minute, beep_count, pitch, flags] = bytes;
    let schedule = match schedule {
        EVERY_DAY => Schedule::EveryDay,
        ONE_TIME => Schedule::OneTime,
        day => Schedule::Weekday(Weekday::from_index(day)?),
    };
    let pitch = match pitch {
        0 => Pitch::Low,
        1 => Pitch::Medium,
        2 => Pitch::High,
        _ => return None,
    };
    if flags & !(FLAG_ENABLED | FLAG_REPEAT) != 0 {
        return None;
    }
    let alarm = AlarmConfig {
        schedule,
        hour,
        minute,
        beep_count,
        pitch,
        enabled: flags & FLAG_ENABLED != 0,
        repeat: flags & FLAG_REPEAT != 0,
    };
    alarm.is_valid().then_some(alarm)
}

/// Encode the pending slot
#[allow(clippy::cast_possible_truncation)]
pub const fn encode_pending(pending: Option<PendingAck>) -> [u8; PENDING_LEN] {
    match pending {
        Some(pending) => [1, pending.alarm_index as u8, pending.target_hour, pending.target_minute],
        None => [0; PENDING_LEN],
    }
}

/// Decode the pending slot. The outer `None` means the value is invalid.
pub fn decode_pending(bytes: [u8; PENDING_LEN]) -> Option<Option<PendingAck>> {
    match bytes {
        [0, 0, 0, 0] => Some(None),
        [1, index, hour, minute] if usize::from(index) < ALARM_COUNT && is_valid_time(hour, minute) => {
            Some(Some(PendingAck {
                alarm_index: usize::from(index),
                target_hour: hour,
                target_minute: minute,
            }))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::WallClock;
    use crate::state::MinuteGuard;

    /// A state with a few configured alarms and one pending
    fn busy_state() -> AlarmState {
        let mut state = AlarmState::new();
        if let Some(alarm) = state.registry.get_mut(0) {
            *alarm = AlarmConfig {
                schedule: Schedule::Weekday(Weekday::Saturday),
                hour: 9,
                minute: 45,
                beep_count: 2,
                pitch: Pitch::Low,
                enabled: true,
                repeat: false,
            };
        }
        if let Some(alarm) = state.registry.get_mut(15) {
            *alarm = AlarmConfig {
                schedule: Schedule::OneTime,
                hour: 23,
                minute: 57,
                beep_count: 9,
                pitch: Pitch::High,
                enabled: true,
                repeat: true,
            };
        }
        state.pending = Some(PendingAck::armed(15, WallClock::new(Weekday::Sunday, 23, 57)));
        state.cursor = 15;
        state
    }

    #[test]
    fn restore_gives_back_the_persisted_state() {
        let state = busy_state();
        let restored = Snapshot::capture(&state).restore();
        assert_eq!(restored, state);
    }

    #[test]
    fn transient_fields_are_not_persisted() {
        let mut state = busy_state();
        state.sounding = Some(15);
        state.is_editing = true;
        let mut guard = MinuteGuard::new(WallClock::new(Weekday::Sunday, 23, 57));
        guard.mark(15);
        state.last_handled = Some(guard);

        let restored = Snapshot::capture(&state).restore();
        assert_eq!(restored.sounding, None);
        assert!(!restored.is_editing);
        assert_eq!(restored.last_handled, None);
    }

    #[test]
    fn corrupted_slot_is_reset_and_others_kept() {
        let state = busy_state();
        let mut snapshot = Snapshot::capture(&state);
        snapshot.slots[0][1] = 25;
        snapshot.slots[3][4] = 7;

        let restored = snapshot.restore();
        assert_eq!(restored.registry.get(0), Some(&AlarmConfig::DEFAULT));
        assert_eq!(restored.registry.get(15), state.registry.get(15));
        assert_eq!(restored.check(), Ok(()));
    }

    #[test]
    fn pending_of_a_corrupted_slot_is_dropped() {
        let state = busy_state();
        let mut snapshot = Snapshot::capture(&state);
        snapshot.slots[15][1] = 25;

        let restored = snapshot.restore();
        assert_eq!(restored.registry.get(15), Some(&AlarmConfig::DEFAULT));
        assert_eq!(restored.pending, None);
        assert_eq!(restored.check(), Ok(()));
    }

    #[test]
    fn pending_of_a_slot_without_repeat_is_dropped() {
        let mut state = busy_state();
        if let Some(alarm) = state.registry.get_mut(15) {
            alarm.repeat = false;
        }

        let restored = Snapshot::capture(&state).restore();
        assert_eq!(restored.registry.get(15), state.registry.get(15));
        assert_eq!(restored.pending, None);
    }

    #[test]
    fn invalid_pending_and_cursor_are_dropped() {
        let mut snapshot = Snapshot::capture(&busy_state());
        snapshot.pending = [1, 16, 8, 0];
        snapshot.cursor = 200;

        let restored = snapshot.restore();
        assert_eq!(restored.pending, None);
        assert_eq!(restored.cursor, 0);
    }

    #[test]
    fn erased_flash_decodes_as_invalid() {
        assert_eq!(decode_alarm([0xFF; SLOT_LEN]), None);
        assert_eq!(decode_pending([0xFF; PENDING_LEN]), None);
        assert_eq!(decode_pending([0; PENDING_LEN]), Some(None));
    }
}
