//! Collector link adapters.
//!
//! - [`UartLink`] drives the board UART through the `hw_init` accessors
//!   (a no-op on host builds).
//! - [`SimCollector`] (host only) stands in for the ground station: it
//!   prints every outbound line to stdout, answers `CLOUD_CONNECT` and
//!   echoes telemetry records back pipe-delimited, like the real
//!   collector does.

use crate::app::ports::SerialPort;
use crate::drivers::hw_init;
use crate::error::CommsError;

/// Board UART carrying the collector link.
#[derive(Debug, Default)]
pub struct UartLink;

impl UartLink {
    pub fn new() -> Self {
        Self
    }
}

impl SerialPort for UartLink {
    fn write_line(&mut self, line: &str) -> Result<(), CommsError> {
        hw_init::uart_write(line.as_bytes()).map_err(|_| CommsError::WriteFailed)?;
        if !line.ends_with('\n') {
            hw_init::uart_write(b"\n").map_err(|_| CommsError::WriteFailed)?;
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Option<u8> {
        hw_init::uart_read_byte()
    }
}

#[cfg(not(target_os = "espidf"))]
pub use sim::{HandshakeReply, SimCollector};

#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::collections::VecDeque;
    use std::io::Write;

    use log::debug;

    use super::{CommsError, SerialPort};
    use crate::telemetry::decoder::{TOKEN_CLOUD_CONNECT, TOKEN_CLOUD_FAIL, TOKEN_CLOUD_OK};

    /// How the simulated collector answers a handshake request.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum HandshakeReply {
        Accept,
        Refuse,
        /// Never answer; the device times out.
        Silent,
    }

    pub struct SimCollector {
        reply: HandshakeReply,
        echo_records: bool,
        rx: VecDeque<u8>,
        sent: Vec<String>,
        print: bool,
    }

    impl SimCollector {
        pub fn new(reply: HandshakeReply) -> Self {
            Self {
                reply,
                echo_records: true,
                rx: VecDeque::new(),
                sent: Vec::new(),
                print: true,
            }
        }

        /// Keep output off stdout (tests).
        pub fn quiet(mut self) -> Self {
            self.print = false;
            self
        }

        pub fn with_echo(mut self, echo_records: bool) -> Self {
            self.echo_records = echo_records;
            self
        }

        /// Queue raw bytes as if the collector had sent them.
        pub fn inject(&mut self, bytes: &[u8]) {
            self.rx.extend(bytes);
        }

        /// Every line the device has written, terminators stripped.
        pub fn sent(&self) -> &[String] {
            &self.sent
        }

        fn respond(&mut self, line: &str) {
            if line == TOKEN_CLOUD_CONNECT {
                let token = match self.reply {
                    HandshakeReply::Accept => TOKEN_CLOUD_OK,
                    HandshakeReply::Refuse => TOKEN_CLOUD_FAIL,
                    HandshakeReply::Silent => return,
                };
                debug!("collector(sim): answering {}", token);
                self.inject(token.as_bytes());
                self.inject(b"\n");
            } else if self.echo_records {
                let echoed = line.replace(',', "|");
                self.inject(echoed.as_bytes());
                self.inject(b"\n");
            }
        }
    }

    impl SerialPort for SimCollector {
        fn write_line(&mut self, line: &str) -> Result<(), CommsError> {
            let line = line.trim_end_matches(['\r', '\n']);
            if self.print {
                let mut out = std::io::stdout().lock();
                writeln!(out, "{line}").map_err(|_| CommsError::WriteFailed)?;
            }
            self.sent.push(line.to_owned());
            self.respond(line);
            Ok(())
        }

        fn read_byte(&mut self) -> Option<u8> {
            self.rx.pop_front()
        }
    }

}
