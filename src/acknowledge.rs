//! # Acknowledgment
//! The user dismisses the pending alarm. This is the only way out of the pending state: it does not time out
//! and it survives leaving the face and putting the device to sleep.
use crate::state::AlarmState;

/// What a dismissal did to the pending alarm
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dismissal {
    /// A one-time alarm was consumed, its slot is back to defaults
    Consumed(usize),
    /// A weekday or every-day alarm stays enabled for its next occurrence
    Kept(usize),
}

/// Acknowledgment
impl AlarmState {
    /// Dismiss the pending alarm. Does nothing when no alarm is pending.
    pub fn dismiss(&mut self) -> Option<Dismissal> {
        let pending = self.pending.take()?;
        self.sounding = None;

        let index = pending.alarm_index;
        let one_time = self
            .registry
            .get(index)
            .is_some_and(|alarm| alarm.schedule.is_one_time());
        if one_time {
            self.registry.reset(index);
            info!("Alarm {} acknowledged and consumed", index);
            Some(Dismissal::Consumed(index))
        } else {
            info!("Alarm {} acknowledged", index);
            Some(Dismissal::Kept(index))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::{AlarmConfig, Schedule};
    use crate::clock::{WallClock, Weekday};
    use crate::state::PendingAck;

    /// A state whose slot 2 holds a pending repeating alarm with the given schedule
    fn pending_state(schedule: Schedule) -> AlarmState {
        let mut state = AlarmState::new();
        if let Some(alarm) = state.registry.get_mut(2) {
            *alarm = AlarmConfig {
                schedule,
                hour: 6,
                minute: 30,
                enabled: true,
                repeat: true,
                ..AlarmConfig::DEFAULT
            };
        }
        state.pending = Some(PendingAck::armed(2, WallClock::new(Weekday::Monday, 6, 30)));
        state.sounding = Some(2);
        state
    }

    #[test]
    fn nothing_pending_is_a_no_op() {
        let mut state = AlarmState::new();
        let before = state.clone();
        assert_eq!(state.dismiss(), None);
        assert_eq!(state, before);
    }

    #[test]
    fn one_time_alarm_is_consumed() {
        let mut state = pending_state(Schedule::OneTime);
        assert_eq!(state.dismiss(), Some(Dismissal::Consumed(2)));
        assert_eq!(state.registry.get(2), Some(&AlarmConfig::DEFAULT));
        assert_eq!(state.pending, None);
        assert_eq!(state.sounding, None);
    }

    #[test]
    fn every_day_and_weekday_alarms_are_kept() {
        for schedule in [Schedule::EveryDay, Schedule::Weekday(Weekday::Friday)] {
            let mut state = pending_state(schedule);
            let alarm = state.registry.get(2).copied();
            assert_eq!(state.dismiss(), Some(Dismissal::Kept(2)));
            assert_eq!(state.registry.get(2).copied(), alarm);
            assert_eq!(state.pending, None);
        }
    }
}
