//! # Wall clock
//! The reading the clock source hands to the face on every tick. The face never keeps time itself.

/// Days of the week, Monday first
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Weekday {
    /// Monday
    Monday,
    /// Tuesday
    Tuesday,
    /// Wednesday
    Wednesday,
    /// Thursday
    Thursday,
    /// Friday
    Friday,
    /// Saturday
    Saturday,
    /// Sunday
    Sunday,
}

impl Weekday {
    /// All days in order, Monday first
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// The position of the day in the week, Monday is 0
    pub const fn index(self) -> u8 {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
            Self::Saturday => 5,
            Self::Sunday => 6,
        }
    }

    /// The day at the given position, Monday is 0
    pub const fn from_index(index: u8) -> Option<Self> {
        if (index as usize) < Self::ALL.len() {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    /// The following day, Sunday wraps to Monday
    pub const fn next(self) -> Self {
        Self::ALL[(self.index() as usize + 1) % Self::ALL.len()]
    }

    /// Two letter label as shown in the weekday field of the display
    pub const fn label(self) -> &'static str {
        match self {
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
            Self::Sunday => "SU",
        }
    }
}

/// Current weekday, hour and minute as delivered by the clock source
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallClock {
    /// The day of the week
    pub weekday: Weekday,
    /// Hour of the day (0-23)
    pub hour: u8,
    /// Minute of the hour (0-59)
    pub minute: u8,
}

impl WallClock {
    /// Create a new reading
    pub const fn new(weekday: Weekday, hour: u8, minute: u8) -> Self {
        Self {
            weekday,
            hour,
            minute,
        }
    }

    /// Check if the reading is at the given time of day, on whatever day
    pub const fn is_at(&self, hour: u8, minute: u8) -> bool {
        self.hour == hour && self.minute == minute
    }
}

/// Check that hour and minute form a valid time of day
pub const fn is_valid_time(hour: u8, minute: u8) -> bool {
    hour < 24 && minute < 60
}
