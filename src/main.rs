//! Firmware for the T9 glove keypad on a Raspberry Pi Pico, using the [embassy_rp] framework.
//!
//! Each keypad press goes out as a single relative mouse movement; the host listener
//! (`t9-glove-host`) recognises the movement and types the corresponding text.

#![no_main]
#![no_std]

mod board;
mod usb;

use embassy_executor::Spawner;
use embassy_rp::{
    gpio::{Input, OutputOpenDrain, Level, Pull},
    pwm::Pwm,
};
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Timer};
use log::info;
use t9_glove_lib::catalog::{self, Vector};
use t9_glove_lib::scan::{Feedback, Matrix, ModeSwitch, ScanConfig};
use t9_glove_lib::Millis;
use usbd_hid::descriptor::MouseReport;

use panic_reset as _;

macro_rules! row_pins {
    ($dev:ident; $($pin:ident),*) => {[ $(OutputOpenDrain::new($dev.$pin, Level::High)),* ]}
}
macro_rules! column_pins {
    ($dev:ident; $($pin:ident),*) => {[ $(Input::new($dev.$pin, Pull::Up)),* ]}
}

/// Channel for [run_matrix] to hand mouse reports to [usb], and ultimately to the host.
pub(crate) static REPORTS_CHANNEL: Channel<RawMutex, MouseReport, 4> = Channel::new();
type RawMutex = embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;

const SCAN_INTERVAL: Duration = Duration::from_millis(20);
const PRESS_PULSE_STRENGTH: u16 = 16384;
const PRESS_PULSE_MS: Millis = 100;
const MODE_PULSE_STRENGTH: u16 = 16384;
const MODE_PULSE_MS: Millis = 200;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    let scan_led = Pwm::new_output_b(p.PWM_SLICE4, p.PIN_25, Default::default());
    let vibrator = Pwm::new_output_b(p.PWM_SLICE7, p.PIN_15, Default::default());

    let mode_button = Input::new(p.PIN_2, Pull::Up);

    let rows: [OutputOpenDrain; catalog::ROWS] = row_pins!(p;
        PIN_10, PIN_11, PIN_12, PIN_13
    );
    let mut columns: [Input; catalog::COLUMNS] = column_pins!(p;
        PIN_18, PIN_19, PIN_20, PIN_21
    );
    for pin in &mut columns {
        pin.set_schmitt(true);
    }

    let matrix = Matrix::new(board::Pins { scan_led, rows, columns }, ScanConfig::default());
    spawner
        .spawn(run_matrix(matrix, board::Vibrator(vibrator), mode_button))
        .expect("spawn matrix");

    let usb_driver = embassy_rp::usb::Driver::new(p.USB, usb::Irqs);
    let (usb_device, hid, cdc) = usb::get_device(usb_driver);
    spawner.spawn(usb::run(usb_device, hid, cdc)).expect("spawn usb");
}

#[embassy_executor::task]
async fn run_matrix(
    mut matrix: Matrix<board::Pins<'static>>,
    mut feedback: board::Vibrator<'static>,
    mode_button: Input<'static>,
) {
    let mut mode = ModeSwitch::new(true);
    let mut was_connected = false;
    loop {
        Timer::after(SCAN_INTERVAL).await;

        let connected = usb::is_configured();
        if connected != was_connected {
            info!("host {}", if connected { "connected" } else { "disconnected" });
            matrix.reset();
            was_connected = connected;
        }

        if let Some(armed) = mode.update(mode_button.is_low()) {
            info!("keypad mode {}", if armed { "on" } else { "off" });
            feedback.pulse(MODE_PULSE_STRENGTH, MODE_PULSE_MS);
        }
        if !connected || !mode.is_armed() {
            continue;
        }

        if let Some(key) = matrix.scan(Instant::now().as_millis()) {
            let Vector { dx, dy } = key.vector();
            info!("{:?} -> ({}, {})", key, dx, dy);
            REPORTS_CHANNEL
                .send(MouseReport { buttons: 0, x: dx, y: dy, wheel: 0, pan: 0 })
                .await;
            feedback.pulse(PRESS_PULSE_STRENGTH, PRESS_PULSE_MS);
        }
    }
}
