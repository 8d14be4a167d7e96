//! # Button Tasks
//! This module contains the tasks for the buttons. Each button has its own task.
//!
//! The green button is the primary button of the face, the blue button the settings button and the yellow button
//! toggles standby.
use crate::task::task_messages::{Events, send_event};
use defmt::{Format, info};
use embassy_rp::gpio::{Input, Level};
use embassy_time::{Duration, Instant, Timer, with_deadline};

/// How long a button must be held before it counts as held
const HOLD_THRESHOLD: Duration = Duration::from_secs(1);

/// The buttons of the board
#[derive(Debug, Format, Eq, PartialEq, Clone, Copy)]
pub enum Button {
    /// Green button
    Green,
    /// Blue button
    Blue,
    /// Yellow button
    Yellow,
}

/// What a button does while it is held
#[derive(Debug, Format, Eq, PartialEq, Clone)]
enum Hold {
    /// Nothing, the press is dropped
    Ignore,
    /// Repeat the press event at the hold interval
    Repeat,
    /// Send the given event once
    Once(Events),
}

impl Button {
    /// The event sent on a short press
    const fn press_event(self) -> Events {
        match self {
            Self::Green => Events::GreenBtn,
            Self::Blue => Events::BlueBtn,
            Self::Yellow => Events::YellowBtn,
        }
    }

    /// The behavior while held. Holding the green button steps the edited field quickly.
    const fn hold(self) -> Hold {
        match self {
            Self::Green => Hold::Repeat,
            Self::Blue => Hold::Once(Events::BlueBtnLong),
            Self::Yellow => Hold::Ignore,
        }
    }
}

/// Handles button press, hold, and long hold
/// Debounces button press
pub struct ButtonManager<'a> {
    /// The input pin for the button
    input: Input<'a>,
    /// The debounce duration
    debounce_duration: Duration,
    /// The button being managed
    button: Button,
    /// The interval between repeated hold events
    hold_event_interval: Duration,
}

impl<'a> ButtonManager<'a> {
    /// Create a new `ButtonManager`
    pub const fn new(input: Input<'a>, button: Button) -> Self {
        Self {
            input,
            debounce_duration: Duration::from_millis(80),
            button,
            hold_event_interval: Duration::from_millis(150),
        }
    }

    /// Wait for debounced presses forever. A release within [`HOLD_THRESHOLD`] is a press, anything longer
    /// is a hold. The button is high at rest and goes low when pressed.
    pub async fn handle_button_press(&mut self) {
        'mainloop: loop {
            let init_level = self.debounce().await;
            if init_level != Level::Low {
                continue 'mainloop;
            }

            let level_result = with_deadline(Instant::now() + HOLD_THRESHOLD, self.debounce()).await;

            // released in time, a press
            if let Ok(level) = level_result {
                if level == Level::High {
                    send_event(self.button.press_event()).await;
                }
                continue 'mainloop;
            }

            match self.button.hold() {
                Hold::Ignore => self.wait_for_release().await,
                Hold::Once(event) => {
                    send_event(event).await;
                    self.wait_for_release().await;
                }
                Hold::Repeat => self.repeat_while_held().await,
            }
        }
    }

    /// Send the press event at the hold interval until the button changes its level
    async fn repeat_while_held(&mut self) {
        loop {
            let level_result =
                with_deadline(Instant::now() + self.hold_event_interval, self.input.wait_for_any_edge()).await;

            if level_result.is_ok() || self.input.get_level() == Level::High {
                return;
            }

            send_event(self.button.press_event()).await;
        }
    }

    /// Wait until the button is released
    async fn wait_for_release(&mut self) {
        while self.debounce().await != Level::High {}
    }

    /// Debounce the button by waiting for the level to be stable for the debounce duration after an edge.
    /// Returns the new level.
    pub async fn debounce(&mut self) -> Level {
        loop {
            let l1 = self.input.get_level();

            self.input.wait_for_any_edge().await;

            Timer::after(self.debounce_duration).await;

            let l2 = self.input.get_level();
            if l1 != l2 {
                break l2;
            }
        }
    }
}

/// Task handling one button
#[embassy_executor::task(pool_size = 3)]
pub async fn button_handler(input: Input<'static>, button: Button) {
    let mut btn = ButtonManager::new(input, button);
    info!("{} button task started", btn.button);
    btn.handle_button_press().await;
}
