//! End-to-end scenarios of the alarm face, driven through the public transition function only.
use pico_alarm_face::alarm::{AlarmConfig, Schedule};
use pico_alarm_face::clock::{WallClock, Weekday};
use pico_alarm_face::config::FaceConfig;
use pico_alarm_face::display::View;
use pico_alarm_face::event::{EventKind, FaceEvent, FaceRequest, Requests};
use pico_alarm_face::face::transition;
use pico_alarm_face::state::{AlarmState, PendingAck};

/// Configuration used by the scenarios
const CONFIG: FaceConfig = FaceConfig {
    clock_24h: true,
    blocked_feedback: false,
    volume: 13,
};

/// Slot of alarm A
const A: usize = 0;
/// Slot of alarm B
const B: usize = 1;
/// Slot of alarm C
const C: usize = 2;

/// A simulated device holding the face state between events
struct Device {
    /// The face state
    state: AlarmState,
    /// Sub-second counter handed out with every event
    subsecond: u8,
}

impl Device {
    /// A device with the given alarms set up in their slots
    fn with_alarms(alarms: &[(usize, AlarmConfig)]) -> Self {
        let mut device = Self {
            state: AlarmState::new(),
            subsecond: 0,
        };
        device.send(EventKind::Setup);
        for (index, alarm) in alarms {
            *device.state.registry.get_mut(*index).unwrap() = *alarm;
        }
        device
    }

    /// Deliver one event
    fn send(&mut self, kind: EventKind) -> Requests {
        self.send_at_phase(kind, self.subsecond.wrapping_add(1))
    }

    /// Deliver one event with the given sub-second counter
    fn send_at_phase(&mut self, kind: EventKind, subsecond: u8) -> Requests {
        self.subsecond = subsecond;
        let (state, requests) = transition(self.state.clone(), FaceEvent::new(kind, subsecond), CONFIG);
        self.state = state;
        requests
    }

    /// Deliver a tick on Monday at the given time
    fn tick(&mut self, hour: u8, minute: u8) -> Requests {
        self.send(EventKind::Tick(WallClock::new(Weekday::Monday, hour, minute)))
    }

    /// Deliver a tick every minute from `from` up to and including `to`, returning the slots that played
    fn run_minutes(&mut self, from: (u8, u8), to: (u8, u8)) -> Vec<usize> {
        let mut played = Vec::new();
        let (mut hour, mut minute) = from;
        loop {
            for request in self.tick(hour, minute) {
                if let FaceRequest::PlayAlarm { index, .. } = request {
                    played.push(index);
                }
            }
            if (hour, minute) == to {
                return played;
            }
            minute += 1;
            if minute == 60 {
                minute = 0;
                hour = (hour + 1) % 24;
            }
        }
    }
}

/// An enabled alarm
fn alarm(schedule: Schedule, hour: u8, minute: u8, repeat: bool) -> AlarmConfig {
    AlarmConfig {
        schedule,
        hour,
        minute,
        enabled: true,
        repeat,
        ..AlarmConfig::DEFAULT
    }
}

/// The slots that got a play request
fn played(requests: &Requests) -> Vec<usize> {
    requests
        .iter()
        .filter_map(|request| match request {
            FaceRequest::PlayAlarm { index, .. } => Some(*index),
            _ => None,
        })
        .collect()
}

/// The rendered view, if any
fn rendered(requests: &Requests) -> Option<View> {
    requests.iter().find_map(|request| match request {
        FaceRequest::Render(view) => Some(*view),
        _ => None,
    })
}

/// A pending value
const fn pending(alarm_index: usize, target_hour: u8, target_minute: u8) -> Option<PendingAck> {
    Some(PendingAck {
        alarm_index,
        target_hour,
        target_minute,
    })
}

#[test]
fn repeating_alarm_re_arms_every_five_minutes() {
    let mut device = Device::with_alarms(&[(A, alarm(Schedule::EveryDay, 8, 0, true))]);

    assert_eq!(played(&device.tick(8, 0)), vec![A]);
    assert_eq!(device.state.pending, pending(A, 8, 5));

    assert!(device.run_minutes((8, 1), (8, 4)).is_empty());

    assert_eq!(played(&device.tick(8, 5)), vec![A]);
    assert_eq!(device.state.pending, pending(A, 8, 10));
}

#[test]
fn repeated_ticks_within_a_minute_fire_once() {
    let mut device = Device::with_alarms(&[(A, alarm(Schedule::EveryDay, 8, 0, false))]);
    assert_eq!(played(&device.tick(8, 0)), vec![A]);
    assert!(played(&device.tick(8, 0)).is_empty());
    assert!(played(&device.send(EventKind::BackgroundFire(WallClock::new(Weekday::Monday, 8, 0)))).is_empty());
}

#[test]
fn later_alarm_takes_over_the_pending_slot() {
    let mut device = Device::with_alarms(&[
        (A, alarm(Schedule::EveryDay, 8, 0, true)),
        (B, alarm(Schedule::EveryDay, 8, 3, true)),
    ]);

    device.tick(8, 0);
    assert_eq!(device.state.pending, pending(A, 8, 5));

    device.run_minutes((8, 1), (8, 2));
    assert_eq!(played(&device.tick(8, 3)), vec![B]);
    assert_eq!(device.state.pending, pending(B, 8, 8));

    // A's cycle does not resume
    assert!(device.run_minutes((8, 4), (8, 7)).is_empty());
    assert_eq!(played(&device.tick(8, 8)), vec![B]);
    assert_eq!(device.state.pending, pending(B, 8, 13));
}

#[test]
fn acknowledged_one_time_alarm_is_consumed() {
    let mut device = Device::with_alarms(&[(C, alarm(Schedule::OneTime, 6, 30, true))]);

    assert_eq!(played(&device.tick(6, 30)), vec![C]);
    assert!(device.state.registry.get(C).is_some_and(|alarm| alarm.enabled));

    device.tick(6, 32);
    device.send(EventKind::PrimaryButtonUp);
    assert_eq!(device.state.pending, None);
    assert_eq!(device.state.registry.get(C), Some(&AlarmConfig::DEFAULT));

    assert!(device.run_minutes((6, 33), (7, 0)).is_empty());
}

#[test]
fn acknowledged_every_day_and_weekday_alarms_stay_enabled() {
    let every_day = alarm(Schedule::EveryDay, 7, 0, true);
    let monday = alarm(Schedule::Weekday(Weekday::Monday), 7, 30, true);
    let mut device = Device::with_alarms(&[(A, every_day), (B, monday)]);

    assert_eq!(played(&device.tick(7, 0)), vec![A]);
    device.send(EventKind::PrimaryButtonUp);
    assert_eq!(device.state.pending, None);
    assert_eq!(device.state.registry.get(A), Some(&every_day));

    assert_eq!(played(&device.tick(7, 30)), vec![B]);
    device.send(EventKind::PrimaryButtonUp);
    assert_eq!(device.state.pending, None);
    assert_eq!(device.state.registry.get(B), Some(&monday));

    // on Tuesday only the every day alarm
    let tuesday = device.send(EventKind::Tick(WallClock::new(Weekday::Tuesday, 7, 0)));
    assert_eq!(played(&tuesday), vec![A]);
    device.send(EventKind::PrimaryButtonUp);
    let tuesday = device.send(EventKind::Tick(WallClock::new(Weekday::Tuesday, 7, 30)));
    assert!(played(&tuesday).is_empty());

    // both fire again the next Monday
    assert_eq!(played(&device.tick(7, 0)), vec![A]);
    device.send(EventKind::PrimaryButtonUp);
    assert_eq!(played(&device.tick(7, 30)), vec![B]);
    assert_eq!(device.state.pending, pending(B, 7, 35));
}

#[test]
fn alarms_sharing_a_minute_all_fire_that_minute() {
    let every_day = alarm(Schedule::EveryDay, 8, 0, false);
    let one_time = alarm(Schedule::OneTime, 8, 0, false);
    let mut device = Device::with_alarms(&[(A, every_day), (B, one_time)]);

    assert_eq!(played(&device.tick(8, 0)), vec![A]);
    assert_eq!(played(&device.tick(8, 0)), vec![B]);
    assert_eq!(device.state.registry.get(B), Some(&AlarmConfig::DEFAULT));
    assert!(played(&device.tick(8, 0)).is_empty());
    assert!(played(&device.tick(8, 1)).is_empty());

    // the one-time alarm went off on its day and is gone the next
    let tuesday = device.send(EventKind::Tick(WallClock::new(Weekday::Tuesday, 8, 0)));
    assert_eq!(played(&tuesday), vec![A]);
    assert!(played(&device.send(EventKind::Tick(WallClock::new(Weekday::Tuesday, 8, 0)))).is_empty());
}

#[test]
fn settings_entry_is_refused_while_pending() {
    let mut device = Device::with_alarms(&[(A, alarm(Schedule::EveryDay, 8, 0, true))]);
    device.tick(8, 0);

    for kind in [EventKind::SettingsButtonUp, EventKind::SettingsLongPress, EventKind::SettingsButtonUp] {
        device.send(kind);
        assert!(!device.state.is_editing);
        assert_eq!(device.state.pending, pending(A, 8, 5));
    }
}

#[test]
fn resign_and_activate_keep_the_pending_alarm() {
    let mut device = Device::with_alarms(&[(A, alarm(Schedule::EveryDay, 8, 0, true))]);
    let shown = rendered(&device.send_at_phase(
        EventKind::Tick(WallClock::new(Weekday::Monday, 8, 0)),
        4,
    ));

    device.send(EventKind::Resign);
    assert_eq!(device.state.pending, pending(A, 8, 5));

    let requests = device.send_at_phase(EventKind::Activate, 4);
    assert_eq!(device.state.pending, pending(A, 8, 5));
    assert_eq!(rendered(&requests), shown);
    assert!(matches!(shown, Some(View::Pending { index: A, hour: 8, minute: 5, .. })));
}

#[test]
fn pending_survives_midnight() {
    let mut device = Device::with_alarms(&[(A, alarm(Schedule::EveryDay, 23, 55, true))]);
    device.tick(23, 55);
    assert_eq!(device.state.pending, pending(A, 0, 0));
    assert_eq!(played(&device.tick(0, 0)), vec![A]);
    assert_eq!(device.state.pending, pending(A, 0, 5));
}
