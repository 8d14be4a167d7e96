//! # Task messages of the firmware
//! Events are what the orchestrator reacts to. They come in through one channel from the button, scheduler,
//! flash and alarm trigger tasks. Commands flow the other way, through the signals owned by each task module.
use defmt::Format;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use pico_alarm_face::clock::WallClock;
use pico_alarm_face::snapshot::Snapshot;

/// The capacity of the event channel
const EVENT_CHANNEL_CAPACITY: usize = 10;

/// Event channel of the orchestrator
static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, Events, EVENT_CHANNEL_CAPACITY> = Channel::new();

/// Sends an event to the orchestrator
pub async fn send_event(event: Events) {
    EVENT_CHANNEL.sender().send(event).await;
}

/// Receives the next event for the orchestrator
pub async fn receive_event() -> Events {
    EVENT_CHANNEL.receiver().receive().await
}

/// Events that the orchestrator reacts to, together with their data
#[derive(PartialEq, Eq, Debug, Format, Clone)]
pub enum Events {
    /// The face state was read from flash
    Restored(Snapshot),
    /// Nothing usable in flash, the face must be set up from scratch
    FreshStart,
    /// The scheduler ticked, the data is the current clock reading
    Tick(WallClock),
    /// The RTC woke us in standby and an alarm is due at the given clock reading
    BackgroundFire(WallClock),
    /// The green button was released
    GreenBtn,
    /// The blue button was released after a short press
    BlueBtn,
    /// The blue button was held
    BlueBtnLong,
    /// The yellow button was released
    YellowBtn,
}
