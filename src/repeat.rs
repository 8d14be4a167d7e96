//! # Repeat scheduling
//! Time-of-day arithmetic for re-arming a repeating alarm.

/// Minutes between two fires of a repeating alarm
pub const REPEAT_INTERVAL_MINUTES: u8 = 5;

/// Add `interval_minutes` to a time of day, rolling over into the next hour and past midnight.
///
/// Total for every valid time of day: 23:57 plus five minutes is 00:02.
#[allow(clippy::cast_possible_truncation)]
pub const fn next(hour: u8, minute: u8, interval_minutes: u8) -> (u8, u8) {
    let total = minute as u16 + interval_minutes as u16;
    let hour = (hour as u16 + total / 60) % 24;
    (hour as u8, (total % 60) as u8)
}

/// The next fire time of a repeating alarm that fires at the given time
pub const fn next_repeat(hour: u8, minute: u8) -> (u8, u8) {
    next(hour, minute, REPEAT_INTERVAL_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_the_hour() {
        assert_eq!(next(9, 10, 5), (9, 15));
    }

    #[test]
    fn rolls_into_next_hour() {
        assert_eq!(next(10, 58, 5), (11, 3));
        assert_eq!(next(10, 55, 5), (11, 0));
    }

    #[test]
    fn rolls_past_midnight() {
        assert_eq!(next(23, 57, 5), (0, 2));
        assert_eq!(next_repeat(23, 55), (0, 0));
    }

    #[test]
    fn every_time_of_day_maps_to_a_valid_time() {
        for hour in 0..24 {
            for minute in 0..60 {
                let (next_hour, next_minute) = next_repeat(hour, minute);
                assert_eq!(next_minute, (minute + 5) % 60);
                let carry = u8::from(minute + 5 >= 60);
                assert_eq!(next_hour, (hour + carry) % 24);
            }
        }
    }
}
