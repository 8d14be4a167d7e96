//! # Alarm Trigger Task
//! This module contains the task that wakes the face while the device is in standby.
//!
//! In standby the scheduler does not tick. Instead the RTC alarm fires at the start of every minute, and the
//! task asks the face whether anything is due. Only then is the orchestrator woken with a background fire, once
//! for every alarm due in that minute.
use crate::task::orchestrate::FACE;
use crate::task::rtc::{RTC_MUTEX, read_clock};
use crate::task::task_messages::{Events, send_event};
use defmt::{info, warn};
use embassy_futures::select::{Either, select};
use embassy_rp::rtc::DateTimeFilter;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use pico_alarm_face::alarm::ALARM_COUNT;

/// Signal to arm (`true`) or disarm (`false`) the background checks
static ALARM_TRIGGER_SIGNAL: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Arm the background checks, for standby
pub fn signal_alarm_trigger_arm() {
    ALARM_TRIGGER_SIGNAL.signal(true);
}

/// Disarm the background checks, the scheduler takes over
pub fn signal_alarm_trigger_disarm() {
    ALARM_TRIGGER_SIGNAL.signal(false);
}

/// Delay after the RTC alarm fired, to step past the matching second
const POST_ALARM_COOLDOWN: Duration = Duration::from_secs(1);

/// Delay between two background fires in the same minute, for the orchestrator to handle the first
const BACKGROUND_FIRE_SPACING: Duration = Duration::from_millis(200);

/// Delay when the RTC is not available
const INIT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Result of waiting for the RTC alarm
enum AlarmWaitResult {
    /// The RTC alarm fired
    Triggered,
    /// The checks were armed again, nothing changes
    Rearmed,
    /// The checks were disarmed
    Disarmed,
}

/// This task checks the face once a minute while the device is in standby
#[embassy_executor::task]
pub async fn alarm_trigger_task() {
    info!("Alarm trigger task started");

    loop {
        // wait until armed
        while !ALARM_TRIGGER_SIGNAL.wait().await {}
        info!("Background alarm checks armed");

        'armed: loop {
            if !schedule_minute_alarm().await {
                Timer::after(INIT_RETRY_DELAY).await;
                continue 'armed;
            }

            let result = wait_for_alarm_event().await;
            cleanup_rtc_alarm().await;

            match result {
                AlarmWaitResult::Triggered => check_due_alarms().await,
                AlarmWaitResult::Rearmed => {}
                AlarmWaitResult::Disarmed => {
                    info!("Background alarm checks disarmed");
                    break 'armed;
                }
            }
        }
    }
}

/// Schedule the RTC alarm for the start of the next minute.
/// Returns false if the RTC is not available.
async fn schedule_minute_alarm() -> bool {
    let mut rtc_guard = RTC_MUTEX.lock().await;
    let Some(rtc) = rtc_guard.as_mut() else {
        warn!("RTC not initialized");
        return false;
    };
    rtc.schedule_alarm(DateTimeFilter::default().second(0));
    true
}

/// Wait for the RTC alarm or a change of the arming
async fn wait_for_alarm_event() -> AlarmWaitResult {
    match select(wait_for_rtc_alarm(), ALARM_TRIGGER_SIGNAL.wait()).await {
        Either::First(()) => AlarmWaitResult::Triggered,
        Either::Second(true) => AlarmWaitResult::Rearmed,
        Either::Second(false) => AlarmWaitResult::Disarmed,
    }
}

/// Helper function to wait for the RTC alarm to fire
async fn wait_for_rtc_alarm() {
    let mut rtc_guard = RTC_MUTEX.lock().await;
    if let Some(rtc) = rtc_guard.as_mut() {
        rtc.wait_for_alarm().await;
    }
}

/// Clears the RTC alarm interrupt and disables the alarm
async fn cleanup_rtc_alarm() {
    let mut rtc_guard = RTC_MUTEX.lock().await;
    if let Some(rtc) = rtc_guard.as_mut() {
        rtc.clear_interrupt();
        rtc.disable_alarm();
    }
}

/// Ask the face whether anything is due and wake the orchestrator if so. The face fires one alarm per
/// evaluation, so the check is repeated while alarms sharing the minute are left.
async fn check_due_alarms() {
    for _ in 0..ALARM_COUNT {
        let Some(now) = read_clock().await else {
            break;
        };
        let due = FACE
            .lock()
            .await
            .as_ref()
            .is_some_and(|face| face.state.wants_background(now));
        if !due {
            break;
        }
        info!("Alarm due at {:02}:{:02}, waking the face", now.hour, now.minute);
        send_event(Events::BackgroundFire(now)).await;
        Timer::after(BACKGROUND_FIRE_SPACING).await;
    }
    Timer::after(POST_ALARM_COOLDOWN).await;
}
