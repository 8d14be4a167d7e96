//! # Alarm registry
//! The alarm configurations of the face. Plain data, plus the operations to reset a single slot and to repair a
//! registry that contains out-of-range values.
use crate::clock::{WallClock, Weekday, is_valid_time};

/// Number of alarm slots on the face
pub const ALARM_COUNT: usize = 16;

/// Highest beep count that can be configured
pub const MAX_BEEP_COUNT: u8 = 9;

/// When an alarm fires
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Schedule {
    /// Once a week on the given day
    Weekday(Weekday),
    /// Every day
    EveryDay,
    /// The next time the clock reaches the alarm time, then the alarm is consumed
    OneTime,
}

impl Schedule {
    /// Check if the schedule lets the alarm fire on the given day
    pub const fn admits(self, day: Weekday) -> bool {
        match self {
            Self::Weekday(weekday) => weekday.index() == day.index(),
            Self::EveryDay | Self::OneTime => true,
        }
    }

    /// Check if the alarm is consumed once it is done
    pub const fn is_one_time(self) -> bool {
        matches!(self, Self::OneTime)
    }

    /// The next schedule in the settings cycle: the weekdays Monday to Sunday, every day, one time, and back
    pub const fn next(self) -> Self {
        match self {
            Self::Weekday(Weekday::Sunday) => Self::EveryDay,
            Self::Weekday(day) => Self::Weekday(day.next()),
            Self::EveryDay => Self::OneTime,
            Self::OneTime => Self::Weekday(Weekday::Monday),
        }
    }

    /// Two letter label for the weekday field of the display
    pub const fn label(self) -> &'static str {
        match self {
            Self::Weekday(day) => day.label(),
            Self::EveryDay => "ED",
            Self::OneTime => "1t",
        }
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::EveryDay
    }
}

/// Pitch of the alarm tone
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pitch {
    /// Low tone
    Low,
    /// Medium tone
    Medium,
    /// High tone
    High,
}

impl Pitch {
    /// The next pitch in the settings cycle
    pub const fn next(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High => Self::Low,
        }
    }
}

/// The status of an alarm as shown in the two character status field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Enabled, fires once per occurrence
    On,
    /// Enabled, repeats until acknowledged
    Repeat,
    /// Disabled
    Off,
}

impl Status {
    /// The text of the status field
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Repeat => "rP",
            Self::Off => "--",
        }
    }
}

/// The configuration of one alarm slot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmConfig {
    /// On which days the alarm fires
    pub schedule: Schedule,
    /// Hour of the alarm (0-23)
    pub hour: u8,
    /// Minute of the alarm (0-59)
    pub minute: u8,
    /// How many beeps are played per fire, passed through to the sound
    pub beep_count: u8,
    /// The tone played, passed through to the sound
    pub pitch: Pitch,
    /// The alarm is enabled or disabled
    pub enabled: bool,
    /// Firing re-arms the alarm until it is acknowledged
    pub repeat: bool,
}

impl AlarmConfig {
    /// The value of an empty slot
    pub const DEFAULT: Self = Self {
        schedule: Schedule::EveryDay,
        hour: 0,
        minute: 0,
        beep_count: 5,
        pitch: Pitch::Medium,
        enabled: false,
        repeat: false,
    };

    /// Check that all fields are in range
    pub const fn is_valid(&self) -> bool {
        is_valid_time(self.hour, self.minute) && self.beep_count >= 1 && self.beep_count <= MAX_BEEP_COUNT
    }

    /// Check if the alarm is due at the given clock reading
    pub const fn is_due(&self, now: WallClock) -> bool {
        self.enabled && now.is_at(self.hour, self.minute) && self.schedule.admits(now.weekday)
    }

    /// The status shown in the status field
    pub const fn status(&self) -> Status {
        match (self.enabled, self.repeat) {
            (false, _) => Status::Off,
            (true, false) => Status::On,
            (true, true) => Status::Repeat,
        }
    }

    /// Step the status through off, on and repeat
    pub const fn cycle_status(&mut self) {
        match self.status() {
            Status::Off => {
                self.enabled = true;
                self.repeat = false;
            }
            Status::On => {
                self.repeat = true;
            }
            Status::Repeat => {
                self.enabled = false;
                self.repeat = false;
            }
        }
    }

    /// Increment the alarm hour
    pub const fn increment_hour(&mut self) {
        self.hour = (self.hour + 1) % 24;
    }

    /// Increment the alarm minute
    pub const fn increment_minute(&mut self) {
        self.minute = (self.minute + 1) % 60;
    }

    /// Increment the beep count, wrapping back to one beep
    pub const fn increment_beep_count(&mut self) {
        self.beep_count = if self.beep_count >= MAX_BEEP_COUNT {
            1
        } else {
            self.beep_count + 1
        };
    }
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The fixed set of alarm slots
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmRegistry {
    /// The slots, addressed by index
    alarms: [AlarmConfig; ALARM_COUNT],
}

impl AlarmRegistry {
    /// Create a registry with every slot empty
    pub const fn new() -> Self {
        Self {
            alarms: [AlarmConfig::DEFAULT; ALARM_COUNT],
        }
    }

    /// Create a registry from the given slots
    pub const fn from_slots(alarms: [AlarmConfig; ALARM_COUNT]) -> Self {
        Self { alarms }
    }

    /// Get the alarm in a slot
    pub fn get(&self, index: usize) -> Option<&AlarmConfig> {
        self.alarms.get(index)
    }

    /// Get the alarm in a slot for modification
    pub fn get_mut(&mut self, index: usize) -> Option<&mut AlarmConfig> {
        self.alarms.get_mut(index)
    }

    /// All slots in index order
    pub fn slots(&self) -> &[AlarmConfig; ALARM_COUNT] {
        &self.alarms
    }

    /// Reset a slot to its default value, which also disables it.
    /// Returns false if the index is outside the registry.
    pub fn reset(&mut self, index: usize) -> bool {
        self.get_mut(index).map_or(false, |alarm| {
            *alarm = AlarmConfig::DEFAULT;
            true
        })
    }

    /// Reset every slot that holds out-of-range values. Returns the number of slots that were reset.
    pub fn repair(&mut self) -> usize {
        let mut repaired = 0;
        for (index, alarm) in self.alarms.iter_mut().enumerate() {
            if !alarm.is_valid() {
                warn!("Alarm {} holds invalid values, resetting it", index);
                *alarm = AlarmConfig::DEFAULT;
                repaired += 1;
            }
        }
        repaired
    }

    /// The first slot in index order that is due now, skipping the slots `skip` is true for
    pub fn first_due(&self, now: WallClock, skip: impl Fn(usize) -> bool) -> Option<usize> {
        self.alarms
            .iter()
            .enumerate()
            .find(|(index, alarm)| !skip(*index) && alarm.is_due(now))
            .map(|(index, _)| index)
    }
}

impl Default for AlarmRegistry {
    fn default() -> Self {
        Self::new()
    }
}
