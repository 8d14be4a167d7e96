//! # Sound task
//! This module contains the task that plays the alarm tones on the DFPlayer Mini module.
//!
//! The SD card holds one track per pitch, `0001` low, `0002` medium, `0003` high, plus `0004`, the short
//! feedback tone. An alarm plays its track once per beep. The DFPlayer is powered through a MOSFET and only
//! switched on while something plays, because it draws too much current when idle.
use defmt::{Debug2Format, Format, info, warn};
use dfplayer_async::{DfPlayer, Equalizer, PlayBackSource, TimeSource};
use embassy_futures::select::{Either, select};
use embassy_rp::gpio::Output;
use embassy_rp::uart::BufferedUart;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Delay, Duration, Instant, Timer};
use pico_alarm_face::alarm::Pitch;
use pico_alarm_face::config::FaceConfig;

/// Commands for the sound task
#[derive(Clone, Copy, Debug, Format, PartialEq, Eq)]
pub enum SoundCommand {
    /// Play an alarm
    Play {
        /// Tone of the alarm
        pitch: Pitch,
        /// How often the tone is played
        beep_count: u8,
    },
    /// Play the short feedback tone
    Feedback,
    /// Stop whatever is playing
    Stop,
}

/// Signal for the sound commands
static SOUND_SIGNAL: Signal<CriticalSectionRawMutex, SoundCommand> = Signal::new();

/// Signals the sound task
pub fn signal_sound(command: SoundCommand) {
    SOUND_SIGNAL.signal(command);
}

/// Track of the feedback tone
const FEEDBACK_TRACK: u16 = 4;

/// Time given to one beep before the next one starts
const BEEP_DURATION: Duration = Duration::from_millis(1500);

/// Time the DFPlayer needs after power on
const POWER_ON_DELAY: Duration = Duration::from_secs(1);

/// Pause between DFPlayer commands
const COMMAND_DELAY: Duration = Duration::from_millis(100);

/// The track that holds the tone of a pitch
const fn track(pitch: Pitch) -> u16 {
    match pitch {
        Pitch::Low => 1,
        Pitch::Medium => 2,
        Pitch::High => 3,
    }
}

/// Time source for the DFPlayer driver
struct EmbassyTimeSource;

impl TimeSource for EmbassyTimeSource {
    type Instant = Instant;

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn is_elapsed(&self, since: Self::Instant, timeout_ms: u64) -> bool {
        Instant::now().duration_since(since) >= Duration::from_millis(timeout_ms)
    }
}

/// This task waits for sound commands and plays them
#[embassy_executor::task]
pub async fn sound_handler(mut uart: BufferedUart, mut pwr: Output<'static>) {
    info!("Sound task started");

    loop {
        match SOUND_SIGNAL.wait().await {
            SoundCommand::Play { pitch, beep_count } => {
                info!("Playing {} beeps of {:?}", beep_count, pitch);
                play(&mut uart, &mut pwr, track(pitch), beep_count).await;
            }
            SoundCommand::Feedback => play(&mut uart, &mut pwr, FEEDBACK_TRACK, 1).await,
            SoundCommand::Stop => {
                info!("Sound stopped");
                pwr.set_low();
            }
        }
    }
}

/// Power the DFPlayer, play a track `repeats` times and power it off again. A new command ends the playback
/// early; anything but a stop is handed back to the task loop.
async fn play(uart: &mut BufferedUart, pwr: &mut Output<'static>, track: u16, repeats: u8) {
    pwr.set_high();
    Timer::after(POWER_ON_DELAY).await;

    // the module fails to acknowledge when feedback is enabled
    let feedback_enable = false;
    let timeout = Duration::from_secs(1);
    let reset_duration_override = Some(Duration::from_millis(1000));

    match DfPlayer::new(
        uart,
        feedback_enable,
        timeout.as_millis(),
        EmbassyTimeSource,
        Delay,
        reset_duration_override.map(|d| d.as_millis()),
    )
    .await
    {
        Ok(mut dfp) => {
            let _ = dfp.set_volume(FaceConfig::BUILD.volume).await;
            Timer::after(COMMAND_DELAY).await;
            let _ = dfp.set_equalizer(Equalizer::Classic).await;
            Timer::after(COMMAND_DELAY).await;
            let _ = dfp.set_playback_source(PlayBackSource::SDCard).await;
            Timer::after(COMMAND_DELAY).await;

            for _ in 0..repeats {
                if let Err(e) = dfp.play(track).await {
                    warn!("Failed to play track {}: {:?}", track, Debug2Format(&e));
                }
                if let Either::Second(command) = select(Timer::after(BEEP_DURATION), SOUND_SIGNAL.wait()).await {
                    if command != SoundCommand::Stop {
                        SOUND_SIGNAL.signal(command);
                    }
                    break;
                }
            }
        }
        Err(e) => warn!("DfPlayer initialization failed with error {:?}", Debug2Format(&e)),
    }

    pwr.set_low();
}
