//! # Real time clock
//! The RTC shared between the scheduler and the alarm trigger, and the conversion of its readings into the
//! clock readings of the alarm face.
//!
//! There is no time sync, so a stopped RTC is started at a fixed boot time.
use defmt::{Debug2Format, info, warn};
use embassy_rp::peripherals::RTC;
use embassy_rp::rtc::{DateTime, DayOfWeek, Rtc};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use pico_alarm_face::clock::{WallClock, Weekday};

/// Type alias for the shared RTC
type RtcType = Mutex<CriticalSectionRawMutex, Option<Rtc<'static, RTC>>>;

/// The RTC, set up once by [`init`]
pub static RTC_MUTEX: RtcType = Mutex::new(None);

/// The time the RTC starts from when it is not running: Monday, 6 January 2025, midnight
fn boot_time() -> DateTime {
    DateTime {
        year: 2025,
        month: 1,
        day: 6,
        day_of_week: DayOfWeek::Monday,
        hour: 0,
        minute: 0,
        second: 0,
    }
}

/// Start the RTC if needed and share it
pub async fn init(mut rtc: Rtc<'static, RTC>) {
    if rtc.now().is_err() {
        info!("RTC not running, starting it at the boot time");
        if let Err(e) = rtc.set_datetime(boot_time()) {
            warn!("Failed to set the RTC: {:?}", Debug2Format(&e));
        }
    }
    *(RTC_MUTEX.lock().await) = Some(rtc);
}

/// Read the current clock, `None` if the RTC is not available
pub async fn read_clock() -> Option<WallClock> {
    let rtc_guard = RTC_MUTEX.lock().await;
    let Some(rtc) = rtc_guard.as_ref() else {
        warn!("RTC not initialized");
        return None;
    };
    match rtc.now() {
        Ok(dt) => Some(wall_clock(&dt)),
        Err(e) => {
            warn!("RTC not running: {:?}", Debug2Format(&e));
            None
        }
    }
}

/// The clock reading of an RTC date and time
const fn wall_clock(dt: &DateTime) -> WallClock {
    let weekday = match dt.day_of_week {
        DayOfWeek::Monday => Weekday::Monday,
        DayOfWeek::Tuesday => Weekday::Tuesday,
        DayOfWeek::Wednesday => Weekday::Wednesday,
        DayOfWeek::Thursday => Weekday::Thursday,
        DayOfWeek::Friday => Weekday::Friday,
        DayOfWeek::Saturday => Weekday::Saturday,
        DayOfWeek::Sunday => Weekday::Sunday,
    };
    WallClock::new(weekday, dt.hour, dt.minute)
}
