//! # Fire evaluation
//! The per-tick decision which alarms fire at the current clock reading.
//!
//! Two checks run independently on every evaluation:
//! 1. the pending alarm fires again when its repeat target is reached, and re-arms itself five minutes later;
//! 2. the first enabled alarm in index order whose time matches fires. The pending alarm is left out of this
//!    check, it already fires through the first one.
//!
//! A repeating alarm that fires through the second check takes the pending slot, even when another alarm holds
//! it. The alarm that held the slot stops repeating.
//!
//! Each slot fires at most once per minute. When several alarms are due in the same minute, one of them fires
//! per evaluation and the others follow on the next evaluations of that minute.
use crate::alarm::Pitch;
use crate::clock::WallClock;
use crate::state::{AlarmState, MinuteGuard, PendingAck};
use heapless::Vec;

/// Why an alarm fired
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FireKind {
    /// The pending alarm reached its repeat target
    Repeat,
    /// The alarm reached its configured time
    Scheduled,
}

/// One alarm that fired, with what is needed to play it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fired {
    /// The slot that fired
    pub index: usize,
    /// Why it fired
    pub kind: FireKind,
    /// Tone of the alarm
    pub pitch: Pitch,
    /// Number of beeps
    pub beep_count: u8,
}

/// The alarms fired by one evaluation, at most one per check
pub type FireList = Vec<Fired, 2>;

/// Fire evaluation
impl AlarmState {
    /// Evaluate the clock reading and fire what is due. An alarm fires at most once per minute, however often
    /// the same minute is evaluated; other alarms due in that minute still fire on a later evaluation.
    pub fn evaluate(&mut self, now: WallClock) -> FireList {
        let mut fired = FireList::new();
        let mut guard = self.guard_for(now);

        // the pending alarm fires again and re-arms itself
        if let Some(pending) = self.pending.as_mut() {
            if pending.is_due(now) && !guard.covers(pending.alarm_index) {
                pending.advance();
                let index = pending.alarm_index;
                if let Some(alarm) = self.registry.get(index) {
                    info!(
                        "Alarm {} repeats, next at {:02}:{:02}",
                        index, pending.target_hour, pending.target_minute
                    );
                    guard.mark(index);
                    let _ = fired.push(Fired {
                        index,
                        kind: FireKind::Repeat,
                        pitch: alarm.pitch,
                        beep_count: alarm.beep_count,
                    });
                }
            }
        }

        // independently, the first alarm whose time has come. The pending one is suppressed here.
        let excluded = self.pending.map(|pending| pending.alarm_index);
        if let Some(index) = self.registry.first_due(now, |index| Some(index) == excluded || guard.covers(index)) {
            if let Some(alarm) = self.registry.get(index).copied() {
                info!("Alarm {} fires at {:02}:{:02}", index, now.hour, now.minute);
                if alarm.repeat {
                    if let Some(previous) = self.pending {
                        warn!(
                            "Alarm {} takes over the pending slot from alarm {}",
                            index, previous.alarm_index
                        );
                    }
                    self.pending = Some(PendingAck::armed(index, now));
                } else if alarm.schedule.is_one_time() {
                    info!("One-time alarm {} is consumed", index);
                    self.registry.reset(index);
                }
                guard.mark(index);
                let _ = fired.push(Fired {
                    index,
                    kind: FireKind::Scheduled,
                    pitch: alarm.pitch,
                    beep_count: alarm.beep_count,
                });
            }
        }

        if let Some(last) = fired.last() {
            self.sounding = Some(last.index);
            // a firing alarm takes over the display
            self.is_editing = false;
        } else if guard.any() {
            trace!("Nothing left to fire at {:02}:{:02}", now.hour, now.minute);
        }
        // the guard only ever covers the minute of the last fire
        self.last_handled = guard.any().then_some(guard);
        fired
    }

    /// Check whether evaluating the clock reading would fire anything, without changing the state.
    /// The sleep scheduler asks this before waking the face in the background.
    pub fn wants_background(&self, now: WallClock) -> bool {
        let guard = self.guard_for(now);
        let excluded = self.pending.map(|pending| pending.alarm_index);
        self.pending
            .is_some_and(|pending| pending.is_due(now) && !guard.covers(pending.alarm_index))
            || self
                .registry
                .first_due(now, |index| Some(index) == excluded || guard.covers(index))
                .is_some()
    }

    /// The guard of the last fire if it covers this minute, a fresh one otherwise
    fn guard_for(&self, now: WallClock) -> MinuteGuard {
        self.last_handled
            .filter(|guard| guard.minute == now)
            .unwrap_or(MinuteGuard::new(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::{AlarmConfig, Schedule};
    use crate::clock::Weekday;

    /// Monday at the given time
    const fn monday(hour: u8, minute: u8) -> WallClock {
        WallClock::new(Weekday::Monday, hour, minute)
    }

    /// A state with the given alarms in the first slots
    fn state_with(alarms: &[AlarmConfig]) -> AlarmState {
        let mut state = AlarmState::new();
        for (index, alarm) in alarms.iter().enumerate() {
            if let Some(slot) = state.registry.get_mut(index) {
                *slot = *alarm;
            }
        }
        state
    }

    /// An enabled alarm
    fn alarm(hour: u8, minute: u8, schedule: Schedule, repeat: bool) -> AlarmConfig {
        AlarmConfig {
            schedule,
            hour,
            minute,
            enabled: true,
            repeat,
            ..AlarmConfig::DEFAULT
        }
    }

    #[test]
    fn nothing_fires_off_time() {
        let mut state = state_with(&[alarm(8, 0, Schedule::EveryDay, false)]);
        assert!(state.evaluate(monday(7, 59)).is_empty());
        assert_eq!(state.sounding, None);
    }

    #[test]
    fn plain_alarm_fires_without_arming() {
        let mut state = state_with(&[alarm(8, 0, Schedule::EveryDay, false)]);
        let fired = state.evaluate(monday(8, 0));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind, FireKind::Scheduled);
        assert_eq!(state.pending, None);
        assert_eq!(state.sounding, Some(0));
        assert!(state.registry.get(0).is_some_and(|a| a.enabled));
    }

    #[test]
    fn one_time_alarm_without_repeat_is_consumed_on_fire() {
        let mut state = state_with(&[alarm(6, 30, Schedule::OneTime, false)]);
        let fired = state.evaluate(monday(6, 30));
        assert_eq!(fired.len(), 1);
        assert_eq!(state.registry.get(0), Some(&AlarmConfig::DEFAULT));
    }

    #[test]
    fn one_time_alarm_with_repeat_survives_its_fire() {
        let repeating = alarm(6, 30, Schedule::OneTime, true);
        let mut state = state_with(&[repeating]);
        state.evaluate(monday(6, 30));
        assert_eq!(state.registry.get(0), Some(&repeating));
        assert_eq!(state.pending, Some(PendingAck::armed(0, monday(6, 30))));
    }

    #[test]
    fn weekday_alarm_waits_for_its_day() {
        let mut state = state_with(&[alarm(9, 0, Schedule::Weekday(Weekday::Tuesday), false)]);
        assert!(state.evaluate(monday(9, 0)).is_empty());
        assert_eq!(state.evaluate(WallClock::new(Weekday::Tuesday, 9, 0)).len(), 1);
    }

    #[test]
    fn same_minute_is_handled_once() {
        let mut state = state_with(&[alarm(8, 0, Schedule::EveryDay, false)]);
        assert_eq!(state.evaluate(monday(8, 0)).len(), 1);
        assert!(state.evaluate(monday(8, 0)).is_empty());
        assert!(!state.wants_background(monday(8, 0)));
    }

    #[test]
    fn alarms_sharing_a_minute_fire_on_consecutive_ticks() {
        let mut state = state_with(&[
            alarm(8, 0, Schedule::EveryDay, false),
            alarm(8, 0, Schedule::OneTime, false),
        ]);

        let fired = state.evaluate(monday(8, 0));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].index, 0);
        assert!(state.wants_background(monday(8, 0)));

        let fired = state.evaluate(monday(8, 0));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].index, 1);
        assert_eq!(state.sounding, Some(1));
        // consumed on the day it was set for, not a day late
        assert_eq!(state.registry.get(1), Some(&AlarmConfig::DEFAULT));
        assert!(!state.wants_background(monday(8, 0)));

        assert!(state.evaluate(monday(8, 0)).is_empty());
        assert!(state.evaluate(monday(8, 1)).is_empty());
        assert_eq!(state.last_handled, None);
    }

    #[test]
    fn repeat_does_not_block_a_second_alarm_in_its_minute() {
        let mut state = state_with(&[alarm(8, 0, Schedule::EveryDay, true), alarm(8, 5, Schedule::EveryDay, false)]);
        state.evaluate(monday(8, 0));
        // the repeat and the new alarm fire together, the second tick has nothing left
        assert_eq!(state.evaluate(monday(8, 5)).len(), 2);
        assert!(state.evaluate(monday(8, 5)).is_empty());
        assert_eq!(state.pending, Some(PendingAck::armed(0, monday(8, 5))));
    }

    #[test]
    fn every_day_alarm_fires_again_the_next_day() {
        let mut state = state_with(&[alarm(8, 0, Schedule::EveryDay, false)]);
        assert_eq!(state.evaluate(monday(8, 0)).len(), 1);
        assert!(state.evaluate(monday(8, 1)).is_empty());
        assert_eq!(state.evaluate(WallClock::new(Weekday::Tuesday, 8, 0)).len(), 1);
    }

    #[test]
    fn pending_alarm_is_not_fired_twice_in_one_minute() {
        // repeat target and configured time coincide after a full day of repeats
        let mut state = state_with(&[alarm(8, 0, Schedule::EveryDay, true)]);
        state.pending = Some(PendingAck {
            alarm_index: 0,
            target_hour: 8,
            target_minute: 0,
        });
        let fired = state.evaluate(monday(8, 0));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind, FireKind::Repeat);
        assert_eq!(state.pending, Some(PendingAck::armed(0, monday(8, 0))));
    }

    #[test]
    fn repeat_and_new_alarm_fire_in_the_same_tick() {
        let mut state = state_with(&[alarm(8, 0, Schedule::EveryDay, true), alarm(8, 5, Schedule::EveryDay, true)]);
        state.evaluate(monday(8, 0));
        let fired = state.evaluate(monday(8, 5));
        assert_eq!(fired.len(), 2);
        assert_eq!((fired[0].index, fired[0].kind), (0, FireKind::Repeat));
        assert_eq!((fired[1].index, fired[1].kind), (1, FireKind::Scheduled));
        // last fire wins the slot
        assert_eq!(state.pending, Some(PendingAck::armed(1, monday(8, 5))));
        assert_eq!(state.sounding, Some(1));
    }

    #[test]
    fn fire_leaves_edit_mode() {
        let mut state = state_with(&[alarm(8, 0, Schedule::EveryDay, false)]);
        state.is_editing = true;
        state.evaluate(monday(8, 0));
        assert!(!state.is_editing);
    }

    #[test]
    fn wants_background_matches_evaluate() {
        let state = state_with(&[alarm(8, 0, Schedule::EveryDay, true)]);
        assert!(state.wants_background(monday(8, 0)));
        assert!(!state.wants_background(monday(8, 1)));

        let mut armed = state;
        armed.evaluate(monday(8, 0));
        assert!(armed.wants_background(monday(8, 5)));
        assert!(!armed.wants_background(monday(8, 4)));
    }
}
