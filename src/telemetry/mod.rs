//! Collector link: outbound records, inbound lines, echo cache, handshake.
//!
//! ```text
//!   Sample + state ──▶ frame::TelemetryRecord ──▶ "t,h,g,d,s,p,r,y\n" ──▶ serial
//!
//!   serial ──▶ decoder::LineDecoder ──▶ Inbound::CloudOk / CloudFail ──▶ cloud::CloudLink
//!                                    └▶ Inbound::Echo ─────────────────▶ echo::EchoCache
//! ```
//!
//! Inbound data never reaches the classifier or the state machine; the
//! echo cache only feeds the display.

pub mod cloud;
pub mod decoder;
pub mod echo;
pub mod frame;

pub use cloud::{CloudLink, LinkStatus};
pub use decoder::{Inbound, LineDecoder};
pub use echo::EchoCache;
pub use frame::TelemetryRecord;
