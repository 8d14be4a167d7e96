//! Firmware of the alarm face for the Raspberry Pi Pico W, with three buttons, an SSD1306 OLED display and a
//! DFPlayer Mini for the alarm tones.

// we are in an environment with constrained resources, so we do not use the standard library and we define a different entry point.
#![no_std]
#![no_main]

use crate::task::alarm_settings::{FLASH_SIZE, alarm_settings_handler};
use crate::task::alarm_trigger::alarm_trigger_task;
use crate::task::buttons::{Button, button_handler};
use crate::task::display::display;
use crate::task::orchestrate::{orchestrator, scheduler};
use crate::task::resources::Irqs;
use crate::task::sound::sound_handler;
use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::rtc::Rtc;
use embassy_rp::uart::{BufferedUart, Config as UartConfig};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

/// The tasks of the firmware
mod task;

/// Size of each DFPlayer UART buffer
const UART_BUFFER_SIZE: usize = 256;

/// Baud rate of the DFPlayer
const DFPLAYER_BAUDRATE: u32 = 9600;

/// Entry point: set up the peripherals and spawn the tasks
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Program start");

    // Initialize the peripherals for the RP2040
    let p = embassy_rp::init(Default::default());

    // real time clock, shared by the scheduler and the alarm trigger
    task::rtc::init(Rtc::new(p.RTC)).await;

    // the orchestrator first, so no event is lost
    unwrap!(spawner.spawn(orchestrator()));
    unwrap!(spawner.spawn(scheduler()));
    unwrap!(spawner.spawn(alarm_trigger_task()));

    // buttons
    unwrap!(spawner.spawn(button_handler(Input::new(p.PIN_20, Pull::Up), Button::Green)));
    unwrap!(spawner.spawn(button_handler(Input::new(p.PIN_21, Pull::Up), Button::Blue)));
    unwrap!(spawner.spawn(button_handler(Input::new(p.PIN_22, Pull::Up), Button::Yellow)));

    // display
    unwrap!(spawner.spawn(display(p.I2C0, p.PIN_13, p.PIN_12)));

    // sound
    static TX_BUFFER: StaticCell<[u8; UART_BUFFER_SIZE]> = StaticCell::new();
    static RX_BUFFER: StaticCell<[u8; UART_BUFFER_SIZE]> = StaticCell::new();
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = DFPLAYER_BAUDRATE;
    let uart = BufferedUart::new(
        p.UART1,
        p.PIN_4,
        p.PIN_5,
        Irqs,
        TX_BUFFER.init([0; UART_BUFFER_SIZE]),
        RX_BUFFER.init([0; UART_BUFFER_SIZE]),
        uart_config,
    );
    // not a part of the dfplayer, a mosfet switches its power
    let dfplayer_power = Output::new(p.PIN_8, Level::Low);
    unwrap!(spawner.spawn(sound_handler(uart, dfplayer_power)));

    // flash, last: it reads the persisted state and brings the face up
    let flash = Flash::<_, Async, { FLASH_SIZE }>::new(p.FLASH, p.DMA_CH0);
    unwrap!(spawner.spawn(alarm_settings_handler(flash)));
}
