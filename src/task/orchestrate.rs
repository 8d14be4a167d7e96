//! # Orchestrate Tasks
//! The orchestrator owns the alarm face. It turns the events of the other tasks into face events and carries
//! out the requests the face answers with. The scheduler delivers the foreground ticks.
use crate::task::{
    alarm_settings::send_flash_write_command,
    alarm_trigger::{signal_alarm_trigger_arm, signal_alarm_trigger_disarm},
    display::{DisplayCommand, signal_display},
    rtc::read_clock,
    sound::{SoundCommand, signal_sound},
    task_messages::{Events, receive_event, send_event},
};
use defmt::{debug, info, warn};
use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};
use pico_alarm_face::config::FaceConfig;
use pico_alarm_face::event::{EventKind, FaceEvent, FaceRequest, TickRate};
use pico_alarm_face::face::AlarmFace;
use pico_alarm_face::snapshot::Snapshot;
use portable_atomic::{AtomicU8, Ordering};

/// Type alias for the shared face
type FaceType = Mutex<CriticalSectionRawMutex, Option<AlarmFace>>;

/// The alarm face, set up once its state was read from flash
pub static FACE: FaceType = Mutex::new(None);

/// Sub-second counter, advanced by every scheduler tick and handed to the face with every event
static SUBSECOND: AtomicU8 = AtomicU8::new(0);

/// Signal for stopping the scheduler
static SCHEDULER_STOP_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Signal for starting the scheduler
static SCHEDULER_START_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Signal for changing the tick rate of the scheduler
static TICK_RATE_SIGNAL: Signal<CriticalSectionRawMutex, TickRate> = Signal::new();

/// Signals the scheduler to stop
fn signal_scheduler_stop() {
    SCHEDULER_START_SIGNAL.reset();
    SCHEDULER_STOP_SIGNAL.signal(());
}

/// Signals the scheduler to start
fn signal_scheduler_start() {
    SCHEDULER_STOP_SIGNAL.reset();
    SCHEDULER_START_SIGNAL.signal(());
}

/// Signals the scheduler to tick at a new rate
fn signal_tick_rate(rate: TickRate) {
    TICK_RATE_SIGNAL.signal(rate);
}

/// This task is responsible for the state transitions of the face. It acts as the main task of the firmware.
#[embassy_executor::task]
pub async fn orchestrator() {
    info!("Orchestrate task starting");
    let mut standby = false;

    loop {
        // receive the events, halting the task until an event is received
        let event = receive_event().await;

        let mut face_guard = FACE.lock().await;
        handle_event(event, &mut face_guard, &mut standby).await;
        drop(face_guard);
    }
}

/// Handles a single event
async fn handle_event(event: Events, face: &mut Option<AlarmFace>, standby: &mut bool) {
    match event {
        Events::Restored(snapshot) => {
            info!("Alarm face restored from flash");
            let face = face.insert(AlarmFace::with_state(snapshot.restore(), FaceConfig::BUILD));
            wake_up(face, standby).await;
        }
        Events::FreshStart => {
            info!("Setting up a fresh alarm face");
            let face = face.insert(AlarmFace::new(FaceConfig::BUILD));
            deliver(face, EventKind::Setup).await;
            wake_up(face, standby).await;
        }
        event => {
            let Some(face) = face.as_mut() else {
                warn!("Alarm face not initialized, dropping {:?}", event);
                return;
            };
            handle_face_event(event, face, standby).await;
        }
    }
}

/// Handles an event of a running face
async fn handle_face_event(event: Events, face: &mut AlarmFace, standby: &mut bool) {
    match event {
        Events::Tick(now) => {
            // a tick can still be queued when standby starts
            if !*standby {
                deliver(face, EventKind::Tick(now)).await;
            }
        }
        Events::BackgroundFire(now) => deliver(face, EventKind::BackgroundFire(now)).await,
        Events::YellowBtn => {
            if *standby {
                wake_up(face, standby).await;
            } else {
                go_to_standby(face, standby).await;
            }
        }
        // any button wakes the face, the press itself is not passed on
        Events::GreenBtn | Events::BlueBtn | Events::BlueBtnLong if *standby => wake_up(face, standby).await,
        Events::GreenBtn => deliver(face, EventKind::PrimaryButtonUp).await,
        Events::BlueBtn => deliver(face, EventKind::SettingsButtonUp).await,
        Events::BlueBtnLong => deliver(face, EventKind::SettingsLongPress).await,
        Events::Restored(_) | Events::FreshStart => warn!("Alarm face already running"),
    }
}

/// Bring the face to the foreground
async fn wake_up(face: &mut AlarmFace, standby: &mut bool) {
    info!("Wake up");
    *standby = false;
    signal_alarm_trigger_disarm();
    deliver(face, EventKind::Activate).await;
    signal_scheduler_start();
}

/// Send the face to the background and let the RTC take over
async fn go_to_standby(face: &mut AlarmFace, standby: &mut bool) {
    info!("Standby");
    *standby = true;
    signal_scheduler_stop();
    deliver(face, EventKind::Resign).await;
    signal_display(DisplayCommand::Off);
    signal_alarm_trigger_arm();
}

/// Hand one event to the face and carry out its requests in order
async fn deliver(face: &mut AlarmFace, kind: EventKind) {
    let event = FaceEvent::new(kind, SUBSECOND.load(Ordering::Relaxed));
    let requests = face.handle(event);
    for request in requests {
        carry_out(request, face).await;
    }
}

/// Carry out one request of the face
async fn carry_out(request: FaceRequest, face: &AlarmFace) {
    match request {
        FaceRequest::Render(view) => {
            signal_display(DisplayCommand::Show(view.fields(face.config.clock_24h)));
        }
        FaceRequest::PlayAlarm {
            index,
            pitch,
            beep_count,
        } => {
            info!("Alarm {} fired", index);
            signal_sound(SoundCommand::Play { pitch, beep_count });
        }
        FaceRequest::StopAlarm => signal_sound(SoundCommand::Stop),
        FaceRequest::TickRate(rate) => signal_tick_rate(rate),
        FaceRequest::BlockedFeedback => signal_sound(SoundCommand::Feedback),
        FaceRequest::Persist => send_flash_write_command(Snapshot::capture(&face.state)).await,
    }
}

/// The period between two ticks at a tick rate
fn tick_period(rate: TickRate) -> Duration {
    Duration::from_millis(1000 / u64::from(rate.hz()))
}

/// This task delivers the foreground ticks at the rate the face asks for. It waits for the face to be set up
/// and is halted in standby.
#[embassy_executor::task]
pub async fn scheduler() {
    info!("scheduler task started");
    let mut ticker = Ticker::every(tick_period(TickRate::Normal));
    SCHEDULER_START_SIGNAL.wait().await;

    loop {
        // see if we must halt the task, then wait for the start signal
        if SCHEDULER_STOP_SIGNAL.signaled() {
            SCHEDULER_STOP_SIGNAL.reset();
            debug!("scheduler halted");
            SCHEDULER_START_SIGNAL.wait().await;
            ticker.reset();
        }

        match select(ticker.next(), TICK_RATE_SIGNAL.wait()).await {
            Either::First(()) => {
                SUBSECOND.fetch_add(1, Ordering::Relaxed);
                if let Some(now) = read_clock().await {
                    send_event(Events::Tick(now)).await;
                }
            }
            Either::Second(rate) => {
                info!("Tick rate now {} Hz", rate.hz());
                ticker = Ticker::every(tick_period(rate));
            }
        }
    }
}
