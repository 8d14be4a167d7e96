//! # Display fields
//! What the face shows, and how it is turned into the fixed-width text fields of the display.
//!
//! The display has a two character weekday field, the alarm index, two digit hour and minute fields, a PM flag,
//! a bell indicator and a two character status field that reads `on`, `rP` or `--`.
use crate::alarm::{AlarmConfig, Schedule, Status};
use crate::state::EditField;
use core::fmt::Write;
use heapless::String;

/// The content of the face at one moment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum View {
    /// The alarm under the cursor
    Alarm {
        /// Slot of the alarm
        index: usize,
        /// The alarm itself
        alarm: AlarmConfig,
    },
    /// The alarm under the cursor while one of its fields is edited
    Editing {
        /// Slot of the alarm
        index: usize,
        /// The alarm itself
        alarm: AlarmConfig,
        /// The field being edited, it blinks
        field: EditField,
        /// Blink phase, the edited field is hidden when off
        blink_on: bool,
    },
    /// A repeating alarm waits for acknowledgment
    Pending {
        /// Slot of the pending alarm
        index: usize,
        /// Schedule of the pending alarm
        schedule: Schedule,
        /// Hour of the next repeat
        hour: u8,
        /// Minute of the next repeat
        minute: u8,
        /// Blink phase of the acknowledgment indicator
        indicator_on: bool,
    },
}

/// The text fields of the display
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayFields {
    /// Two character weekday field
    pub label: &'static str,
    /// One based alarm number
    pub number: u8,
    /// Hour field, two characters
    pub hour: String<2>,
    /// Minute field, two characters
    pub minute: String<2>,
    /// PM flag, only ever set in 12-hour mode
    pub pm: bool,
    /// Bell indicator
    pub bell: bool,
    /// Status field
    pub status: Status,
}

/// An empty two character field
const BLANK: &str = "  ";

impl View {
    /// Format the view for the display, in 24-hour or 12-hour mode
    pub fn fields(&self, clock_24h: bool) -> DisplayFields {
        match *self {
            Self::Alarm { index, alarm } => {
                let (hour, pm) = format_hour(alarm.hour, clock_24h);
                DisplayFields {
                    label: alarm.schedule.label(),
                    number: alarm_number(index),
                    hour,
                    minute: format_minute(alarm.minute),
                    pm,
                    bell: alarm.enabled,
                    status: alarm.status(),
                }
            }
            Self::Editing {
                index,
                alarm,
                field,
                blink_on,
            } => {
                let (mut hour, pm) = format_hour(alarm.hour, clock_24h);
                let mut minute = format_minute(alarm.minute);
                let mut label = alarm.schedule.label();
                // the field under edit is hidden every other tick
                if !blink_on {
                    match field {
                        EditField::Schedule => label = BLANK,
                        EditField::Hour => hour = blank(),
                        EditField::Minute => minute = blank(),
                        EditField::Status | EditField::Pitch | EditField::BeepCount => {}
                    }
                }
                DisplayFields {
                    label,
                    number: alarm_number(index),
                    hour,
                    minute,
                    pm,
                    bell: alarm.enabled,
                    status: alarm.status(),
                }
            }
            Self::Pending {
                index,
                schedule,
                hour,
                minute,
                indicator_on,
            } => {
                let (hour, pm) = format_hour(hour, clock_24h);
                DisplayFields {
                    label: schedule.label(),
                    number: alarm_number(index),
                    hour,
                    minute: format_minute(minute),
                    pm,
                    bell: indicator_on,
                    status: Status::Repeat,
                }
            }
        }
    }
}

/// The one based number of a slot as shown to the user
#[allow(clippy::cast_possible_truncation)]
const fn alarm_number(index: usize) -> u8 {
    (index + 1) as u8
}

/// Format the hour field. In 12-hour mode midnight and noon show as 12, and the PM flag is returned.
pub fn format_hour(hour: u8, clock_24h: bool) -> (String<2>, bool) {
    let mut s: String<2> = String::new();
    if clock_24h {
        let _ = write!(s, "{hour:02}");
        return (s, false);
    }
    let pm = hour >= 12;
    let hour_12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    let _ = write!(s, "{hour_12:>2}");
    (s, pm)
}

/// Format the minute field, always two digits
pub fn format_minute(minute: u8) -> String<2> {
    let mut s: String<2> = String::new();
    let _ = write!(s, "{minute:02}");
    s
}

/// A hidden two character field
fn blank() -> String<2> {
    let mut s: String<2> = String::new();
    let _ = s.push_str(BLANK);
    s
}
