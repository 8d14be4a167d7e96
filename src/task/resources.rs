//! Interrupt bindings and the pin map of the board.
//!
//! | function            | pins                         |
//! |---------------------|------------------------------|
//! | green button        | `PIN_20`                     |
//! | blue button         | `PIN_21`                     |
//! | yellow button       | `PIN_22`                     |
//! | display (I2C0)      | SCL `PIN_13`, SDA `PIN_12`   |
//! | dfplayer (UART1)    | TX `PIN_4`, RX `PIN_5`       |
//! | dfplayer power      | `PIN_8`                      |
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::InterruptHandler as I2cInterruptHandler;
use embassy_rp::peripherals::{I2C0, UART1};
use embassy_rp::uart::BufferedInterruptHandler;

bind_interrupts!(pub struct Irqs {
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});
