//! Pin wiring for the glove: keypad rows and columns, the scan indicator LED and the vibration
//! motor. Implements the [t9_glove_lib::scan] traits on top of [embassy_rp] peripherals.

use embassy_rp::{
    gpio::{Input, OutputOpenDrain},
    pwm::{Pwm, SetDutyCycle},
};
use embassy_time::{block_for, Duration};
use t9_glove_lib::catalog::{COLUMNS, ROWS};
use t9_glove_lib::scan::{Feedback, MatrixPins};
use t9_glove_lib::Millis;

pub struct Pins<'a> {
    pub scan_led: Pwm<'a>,
    pub rows: [OutputOpenDrain<'a>; ROWS],
    pub columns: [Input<'a>; COLUMNS],
}

trait ConvenientPwm {
    fn off(&mut self);
    fn pwm_duty_u16(&mut self, duty: u16);
}
impl ConvenientPwm for Pwm<'_> {
    fn off(&mut self) {
        if self.set_duty_cycle_fully_off().is_err() {
            log::warn!("pwm off failed");
        }
    }
    fn pwm_duty_u16(&mut self, duty: u16) {
        if self.set_duty_cycle(duty).is_err() {
            log::warn!("pwm duty {} rejected", duty);
        }
    }
}

impl MatrixPins for Pins<'_> {
    fn select_row(&mut self, row: usize) {
        self.scan_led.pwm_duty_u16(400);
        self.rows[row].set_low();
        block_for(Duration::from_micros(100));
    }

    fn release_row(&mut self, row: usize) {
        self.rows[row].set_high();
        block_for(Duration::from_micros(100));
        self.scan_led.off();
    }

    fn column_active(&mut self, column: usize) -> bool {
        self.columns[column].is_low()
    }
}

pub struct Vibrator<'a>(pub Pwm<'a>);

impl Feedback for Vibrator<'_> {
    fn pulse(&mut self, strength: u16, duration_ms: Millis) {
        self.0.pwm_duty_u16(strength);
        block_for(Duration::from_millis(duration_ms));
        self.0.off();
    }
}
