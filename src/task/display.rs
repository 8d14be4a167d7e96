//! # Display task
//! This module contains the task that shows the alarm face on the OLED display.
//!
//! The orchestrator hands over fully formatted display fields, the task only lays them out.
//!
//! ```text
//! +--------------------------+
//! | MO 3                  rP |
//! |                          |
//! |        08:05  PM         |
//! |                          |
//! | ((o))                    |
//! +--------------------------+
//! ```
use crate::task::resources::Irqs;
use core::fmt::Write;
use defmt::{Debug2Format, error, info, warn};
use embassy_rp::i2c::{Async, Config, I2c};
use embassy_rp::peripherals::{I2C0, PIN_12, PIN_13};
use embassy_rp::Peri;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_graphics::{
    mono_font::{
        MonoTextStyle, MonoTextStyleBuilder,
        ascii::{FONT_6X13, FONT_10X20},
    },
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use heapless::String;
use pico_alarm_face::display::DisplayFields;
use ssd1306_async::{I2CDisplayInterface, Ssd1306, prelude::*};

/// Commands for the display task
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayCommand {
    /// Show the given fields
    Show(DisplayFields),
    /// Blank the display, for standby
    Off,
}

/// Signal for the display commands
static DISPLAY_SIGNAL: Signal<CriticalSectionRawMutex, DisplayCommand> = Signal::new();

/// Signals the display task, replacing a command it has not picked up yet
pub fn signal_display(command: DisplayCommand) {
    DISPLAY_SIGNAL.signal(command);
}

/// Position of the weekday and alarm number
const LABEL_POSITION: Point = Point::new(0, 0);
/// Position of the status field
const STATUS_POSITION: Point = Point::new(116, 0);
/// Position of the time
const TIME_POSITION: Point = Point::new(34, 22);
/// Position of the PM flag
const PM_POSITION: Point = Point::new(90, 28);
/// Position of the bell indicator
const BELL_POSITION: Point = Point::new(0, 51);

/// The text of the bell indicator
const BELL: &str = "((o))";

/// This task initializes the display and then shows whatever the orchestrator sends it
#[embassy_executor::task]
pub async fn display(i2c0: Peri<'static, I2C0>, scl: Peri<'static, PIN_13>, sda: Peri<'static, PIN_12>) {
    info!("Display task started");

    let mut config = Config::default();
    config.frequency = 400_000;
    let i2c: I2c<'static, I2C0, Async> = I2c::new_async(i2c0, scl, sda, Irqs, config);

    let interface = I2CDisplayInterface::new(i2c);
    let mut display =
        Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0).into_buffered_graphics_mode();
    if let Err(e) = display.init().await {
        error!("Failed to initialize display: {}", Debug2Format(&e));
        return;
    }
    if let Err(e) = display.set_brightness(Brightness::DIM).await {
        warn!("Failed to dim display: {}", Debug2Format(&e));
    }

    let small = MonoTextStyleBuilder::new()
        .font(&FONT_6X13)
        .text_color(BinaryColor::On)
        .build();
    let large = MonoTextStyleBuilder::new()
        .font(&FONT_10X20)
        .text_color(BinaryColor::On)
        .build();

    loop {
        let command = DISPLAY_SIGNAL.wait().await;

        // nothing is sent to the display before flush()
        display.clear();

        if let DisplayCommand::Show(fields) = command {
            let mut label: String<8> = String::new();
            let _ = write!(label, "{} {}", fields.label, fields.number);
            draw(&mut display, &label, LABEL_POSITION, small);
            draw(&mut display, fields.status.as_str(), STATUS_POSITION, small);

            let mut time: String<5> = String::new();
            let _ = write!(time, "{}:{}", fields.hour, fields.minute);
            draw(&mut display, &time, TIME_POSITION, large);

            if fields.pm {
                draw(&mut display, "PM", PM_POSITION, small);
            }
            if fields.bell {
                draw(&mut display, BELL, BELL_POSITION, small);
            }
        }

        if let Err(e) = display.flush().await {
            warn!("Failed to flush display: {}", Debug2Format(&e));
        }
    }
}

/// Draw one line of text into the display buffer
fn draw<D>(display: &mut D, text: &str, position: Point, style: MonoTextStyle<'static, BinaryColor>)
where
    D: DrawTarget<Color = BinaryColor>,
    D::Error: core::fmt::Debug,
{
    if let Err(e) = Text::with_baseline(text, position, style, Baseline::Top).draw(display) {
        warn!("Failed to draw {}: {}", text, Debug2Format(&e));
    }
}
