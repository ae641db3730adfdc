//! Inbound line decoder.
//!
//! The collector writes plain ASCII lines at any time:
//! ```text
//! CLOUD_OK\n                             handshake accepted
//! CLOUD_FAIL\n                           handshake refused
//! 23.5|55.0|120|150|2|1.2|-0.5|10.0\n    echo record (display only)
//! ```
//!
//! Only digits, `.`, `-` and `|` are buffered, so the line limit applies
//! to the filtered record and padding or labels cost nothing.  The first
//! few raw characters are kept aside to recognise the handshake tokens.
//! `\r` is dropped, a record that overflows the buffer is discarded whole
//! at the next `\n`, and empty lines are ignored.

use heapless::String;

/// Capacity of the filtered record buffer.
pub const LINE_CAP: usize = 96;

/// Raw prefix kept for token matching; longer than any token.
const WORD_CAP: usize = 32;

pub const TOKEN_CLOUD_OK: &str = "CLOUD_OK";
pub const TOKEN_CLOUD_FAIL: &str = "CLOUD_FAIL";
/// Handshake request written by the device.
pub const TOKEN_CLOUD_CONNECT: &str = "CLOUD_CONNECT";

/// Field separator in echo records.
pub const ECHO_SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    CloudOk,
    CloudFail,
    /// Filtered echo record, separators kept.
    Echo(String<LINE_CAP>),
}

impl Inbound {
    /// Classify one complete line.  `None` for lines with nothing usable.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line {
            TOKEN_CLOUD_OK => return Some(Self::CloudOk),
            TOKEN_CLOUD_FAIL => return Some(Self::CloudFail),
            _ => {}
        }
        let mut record = String::new();
        for ch in line.chars().filter(|c| is_record_char(*c)) {
            // Filtered text is never longer than the line it came from.
            let _ = record.push(ch);
        }
        (!record.is_empty()).then_some(Self::Echo(record))
    }
}

fn is_record_char(ch: char) -> bool {
    ch.is_ascii_digit() || ch == '.' || ch == '-' || ch == ECHO_SEPARATOR
}

/// Byte-at-a-time line accumulator.
pub struct LineDecoder {
    /// Record characters of the current line.
    record: String<LINE_CAP>,
    /// Raw start of the current line, leading spaces skipped.
    word: String<WORD_CAP>,
    /// The current line outgrew `word` and cannot be a token.
    long_line: bool,
    /// Set once the current record overflowed; cleared at the next `\n`.
    discarding: bool,
    dropped_lines: u32,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self {
            record: String::new(),
            word: String::new(),
            long_line: false,
            discarding: false,
            dropped_lines: 0,
        }
    }

    /// Feed one byte.  Returns a message when a line completes.
    pub fn push(&mut self, byte: u8) -> Option<Inbound> {
        match byte {
            b'\n' => {
                let msg = self.complete_line();
                self.reset();
                msg
            }
            b'\r' => None,
            b if b.is_ascii() && !b.is_ascii_control() => {
                if !self.discarding {
                    self.accept(char::from(b));
                }
                None
            }
            _ => None,
        }
    }

    fn accept(&mut self, ch: char) {
        if !self.long_line && !(self.word.is_empty() && ch == ' ') && self.word.push(ch).is_err() {
            self.long_line = true;
        }
        if is_record_char(ch) && self.record.push(ch).is_err() {
            self.discarding = true;
            self.dropped_lines = self.dropped_lines.wrapping_add(1);
            self.record.clear();
        }
    }

    fn complete_line(&self) -> Option<Inbound> {
        if self.discarding {
            None
        } else if !self.long_line {
            Inbound::parse(&self.word)
        } else {
            (!self.record.is_empty()).then(|| Inbound::Echo(self.record.clone()))
        }
    }

    /// Feed a slice; only the last complete message is returned.
    pub fn feed(&mut self, bytes: &[u8]) -> Option<Inbound> {
        let mut last = None;
        for &b in bytes {
            if let Some(msg) = self.push(b) {
                last = Some(msg);
            }
        }
        last
    }

    /// Lines thrown away because they overflowed the buffer.
    pub fn dropped_lines(&self) -> u32 {
        self.dropped_lines
    }

    pub fn reset(&mut self) {
        self.record.clear();
        self.word.clear();
        self.long_line = false;
        self.discarding = false;
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}
