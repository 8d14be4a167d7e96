//! # Settings sub-mode
//! Selecting an alarm and editing its fields. None of this is reachable while an alarm is pending.
use crate::alarm::ALARM_COUNT;
use crate::state::{AlarmState, EditField};

/// Selection and settings
impl AlarmState {
    /// Move the cursor to the next alarm slot
    pub const fn select_next_alarm(&mut self) {
        self.cursor = (self.cursor + 1) % ALARM_COUNT;
    }

    /// Enter the settings sub-mode at its first field. Refused while an alarm is pending; returns whether the
    /// sub-mode was entered.
    pub fn enter_settings(&mut self) -> bool {
        if let Some(pending) = self.pending {
            warn!("Settings locked, alarm {} awaits acknowledgment", pending.alarm_index);
            return false;
        }
        debug!("Editing alarm {}", self.cursor);
        self.is_editing = true;
        self.edit_field = EditField::Schedule;
        true
    }

    /// Leave the settings sub-mode
    pub const fn leave_settings(&mut self) {
        self.is_editing = false;
        self.edit_field = EditField::Schedule;
    }

    /// Move on to the next field, leaving the settings sub-mode after the last one
    pub fn next_field(&mut self) {
        match self.edit_field.next() {
            Some(field) => self.edit_field = field,
            None => self.leave_settings(),
        }
    }

    /// Step the edited field of the selected alarm to its next value
    pub fn increment_field(&mut self) {
        let field = self.edit_field;
        let Some(alarm) = self.registry.get_mut(self.cursor) else {
            return;
        };
        match field {
            EditField::Schedule => alarm.schedule = alarm.schedule.next(),
            EditField::Hour => alarm.increment_hour(),
            EditField::Minute => alarm.increment_minute(),
            EditField::Status => alarm.cycle_status(),
            EditField::Pitch => alarm.pitch = alarm.pitch.next(),
            EditField::BeepCount => alarm.increment_beep_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::Status;
    use crate::clock::{WallClock, Weekday};
    use crate::state::PendingAck;

    #[test]
    fn cursor_wraps_around_the_registry() {
        let mut state = AlarmState::new();
        state.cursor = ALARM_COUNT - 1;
        state.select_next_alarm();
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn settings_are_refused_while_pending() {
        let mut state = AlarmState::new();
        state.pending = Some(PendingAck::armed(0, WallClock::new(Weekday::Monday, 8, 0)));
        assert!(!state.enter_settings());
        assert!(!state.is_editing);
    }

    #[test]
    fn walking_all_fields_leaves_settings() {
        let mut state = AlarmState::new();
        assert!(state.enter_settings());
        for _ in 0..5 {
            state.next_field();
            assert!(state.is_editing);
        }
        state.next_field();
        assert!(!state.is_editing);
    }

    #[test]
    fn increments_apply_to_the_selected_alarm() {
        let mut state = AlarmState::new();
        state.cursor = 3;
        state.enter_settings();
        state.edit_field = EditField::Hour;
        state.increment_field();
        state.edit_field = EditField::Minute;
        state.increment_field();
        state.increment_field();
        state.edit_field = EditField::Status;
        state.increment_field();

        let alarm = state.registry.get(3).copied().unwrap_or_default();
        assert_eq!((alarm.hour, alarm.minute), (1, 2));
        assert_eq!(alarm.status(), Status::On);
        assert_eq!(state.registry.get(0).map(|a| a.hour), Some(0));
    }
}
