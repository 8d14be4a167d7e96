//! # Alarm face
//! Dispatch of external events onto the state, and the requests that result from it.
//!
//! While an alarm is pending, the primary button acknowledges it and both settings buttons are refused. Leaving
//! the face does not touch the state at all: a pending alarm and an open settings sub-mode are both still there
//! on the next activation.
use crate::config::FaceConfig;
use crate::display::View;
use crate::event::{EventKind, FaceEvent, FaceRequest, Requests};
use crate::fire::FireList;
use crate::state::AlarmState;

/// The alarm face: its state and the configuration it runs with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlarmFace {
    /// The state, kept across activations and sleep
    pub state: AlarmState,
    /// Build time configuration
    pub config: FaceConfig,
}

/// Handle one event on a state, returning the new state and the requests for the caller
pub fn transition(state: AlarmState, event: FaceEvent, config: FaceConfig) -> (AlarmState, Requests) {
    let mut face = AlarmFace { state, config };
    let requests = face.handle(event);
    (face.state, requests)
}

impl AlarmFace {
    /// Create a face with a freshly set up state
    pub const fn new(config: FaceConfig) -> Self {
        Self {
            state: AlarmState::new(),
            config,
        }
    }

    /// Create a face around a state that was kept from before, e.g. restored from flash
    pub const fn with_state(state: AlarmState, config: FaceConfig) -> Self {
        Self { state, config }
    }

    /// Handle one event
    pub fn handle(&mut self, event: FaceEvent) -> Requests {
        let mut requests = Requests::new();

        if event.kind != EventKind::Setup {
            if let Err(violation) = self.state.check() {
                error!("Alarm face state is inconsistent: {:?}", violation);
                self.state.recover();
            }
        }

        let before = self.state.clone();
        let mut render = true;

        match event.kind {
            EventKind::Setup => {
                info!("Setting up alarm face");
                self.state = AlarmState::new();
                render = false;
            }
            EventKind::Activate => {
                push(&mut requests, FaceRequest::TickRate(self.state.tick_rate()));
            }
            EventKind::Resign => {
                // the state is kept as is, including the settings sub-mode
                render = false;
            }
            EventKind::Tick(now) => {
                let fired = self.state.evaluate(now);
                play(&mut requests, &fired);
            }
            EventKind::BackgroundFire(now) => {
                debug!("Background fire at {:02}:{:02}", now.hour, now.minute);
                let fired = self.state.evaluate(now);
                play(&mut requests, &fired);
                render = false;
            }
            EventKind::PrimaryButtonUp => {
                if self.state.pending.is_some() {
                    self.state.dismiss();
                    push(&mut requests, FaceRequest::StopAlarm);
                } else if self.state.is_editing {
                    self.state.increment_field();
                } else {
                    self.state.select_next_alarm();
                }
            }
            EventKind::SettingsButtonUp => {
                if self.state.pending.is_some() {
                    self.refuse_settings(&mut requests);
                } else if self.state.is_editing {
                    self.state.next_field();
                } else {
                    self.state.enter_settings();
                }
            }
            EventKind::SettingsLongPress => {
                if self.state.pending.is_some() {
                    self.refuse_settings(&mut requests);
                } else if self.state.is_editing {
                    self.state.leave_settings();
                } else {
                    self.state.enter_settings();
                }
            }
        }

        let tick_rate = self.state.tick_rate();
        if event.kind != EventKind::Activate && tick_rate != before.tick_rate() {
            push(&mut requests, FaceRequest::TickRate(tick_rate));
        }
        if render {
            push(&mut requests, FaceRequest::Render(self.view(event.blink_on())));
        }
        if self.state.persisted_differs(&before) || event.kind == EventKind::Setup {
            push(&mut requests, FaceRequest::Persist);
        }
        requests
    }

    /// The view of the face in the given blink phase
    pub fn view(&self, blink_on: bool) -> View {
        if let Some(pending) = self.state.pending {
            let schedule = self
                .state
                .registry
                .get(pending.alarm_index)
                .map(|alarm| alarm.schedule)
                .unwrap_or_default();
            return View::Pending {
                index: pending.alarm_index,
                schedule,
                hour: pending.target_hour,
                minute: pending.target_minute,
                indicator_on: blink_on,
            };
        }
        let index = self.state.cursor;
        let alarm = self.state.selected().copied().unwrap_or_default();
        if self.state.is_editing {
            View::Editing {
                index,
                alarm,
                field: self.state.edit_field,
                blink_on,
            }
        } else {
            View::Alarm { index, alarm }
        }
    }

    /// Refuse settings entry while an alarm is pending
    fn refuse_settings(&self, requests: &mut Requests) {
        debug!("Settings entry refused");
        if self.config.blocked_feedback {
            push(requests, FaceRequest::BlockedFeedback);
        }
    }
}

/// Ask for playback of every alarm that fired
fn play(requests: &mut Requests, fired: &FireList) {
    for alarm in fired {
        push(
            requests,
            FaceRequest::PlayAlarm {
                index: alarm.index,
                pitch: alarm.pitch,
                beep_count: alarm.beep_count,
            },
        );
    }
}

/// Append a request. The list is sized for the worst case of a single event.
fn push(requests: &mut Requests, request: FaceRequest) {
    if requests.push(request).is_err() {
        error!("Request list full, dropping request");
    }
}
