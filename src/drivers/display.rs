//! 16×2 character LCD (HD44780) behind a PCF8574 I2C backpack.
//!
//! The expander presents one 8-bit port: `P0` RS, `P1` RW, `P2` EN,
//! `P3` backlight, `P4..P7` the controller's D4..D7.  Every controller
//! byte goes out as two nibbles, each latched by an EN pulse.
//!
//! Lines are always written full-width (space padded) so a page change
//! never needs the slow clear command.

use embedded_hal::delay::DelayNs;
use heapless::String;

use crate::error::ActuatorError;

pub const LCD_COLS: usize = 16;
pub const LCD_ROWS: usize = 2;

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INC: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;
const ROW_OFFSETS: [u8; LCD_ROWS] = [0x00, 0x40];

/// One byte to the expander port.
pub trait LcdBus {
    fn write(&mut self, byte: u8) -> Result<(), ActuatorError>;
}

pub struct Lcd1602<B: LcdBus, D: DelayNs> {
    bus: B,
    delay: D,
    shown: [String<LCD_COLS>; LCD_ROWS],
    ready: bool,
}

impl<B: LcdBus, D: DelayNs> Lcd1602<B, D> {
    pub fn new(bus: B, delay: D) -> Self {
        Self {
            bus,
            delay,
            shown: [String::new(), String::new()],
            ready: false,
        }
    }

    /// Power-on initialisation into 4-bit mode.
    pub fn init(&mut self) -> Result<(), ActuatorError> {
        self.delay.delay_ms(50);
        // Three 8-bit "function set" nibbles resynchronise the controller
        // whatever mode it woke up in, then switch to 4-bit.
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(150);
        self.write_nibble(0x20, 0)?;

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.command(CMD_CLEAR)?;
        self.delay.delay_us(2_000);
        self.command(CMD_ENTRY_MODE_INC)?;
        self.ready = true;
        Ok(())
    }

    /// Write both rows; rows identical to what is already shown are skipped.
    pub fn write_lines(&mut self, top: &str, bottom: &str) -> Result<(), ActuatorError> {
        if !self.ready {
            self.init()?;
        }
        for (row, text) in [top, bottom].into_iter().enumerate() {
            if self.shown[row].as_str() == text {
                continue;
            }
            self.command(CMD_SET_DDRAM | ROW_OFFSETS[row])?;
            let mut written = 0;
            for ch in text.chars().take(LCD_COLS) {
                self.data(if ch.is_ascii() && !ch.is_ascii_control() { ch as u8 } else { b'?' })?;
                written += 1;
            }
            for _ in written..LCD_COLS {
                self.data(b' ')?;
            }
            self.shown[row].clear();
            for ch in text.chars().take(LCD_COLS) {
                // Capacity is LCD_COLS bytes; stop at the first multi-byte overflow.
                if self.shown[row].push(ch).is_err() {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Text currently on `row`.
    pub fn shown(&self, row: usize) -> &str {
        self.shown.get(row).map_or("", |s| s.as_str())
    }

    fn command(&mut self, value: u8) -> Result<(), ActuatorError> {
        self.send(value, 0)
    }

    fn data(&mut self, value: u8) -> Result<(), ActuatorError> {
        self.send(value, RS)
    }

    fn send(&mut self, value: u8, mode: u8) -> Result<(), ActuatorError> {
        self.write_nibble(value & 0xF0, mode)?;
        self.write_nibble(value << 4, mode)
    }

    fn write_nibble(&mut self, high_nibble: u8, mode: u8) -> Result<(), ActuatorError> {
        let byte = (high_nibble & 0xF0) | BACKLIGHT | mode;
        self.bus.write(byte | EN)?;
        self.delay.delay_us(1);
        self.bus.write(byte & !EN)?;
        self.delay.delay_us(50);
        Ok(())
    }
}
