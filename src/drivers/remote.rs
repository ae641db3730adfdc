//! NEC infrared remote receiver.
//!
//! ## Hardware
//!
//! 38 kHz demodulator, active low.  The GPIO fires on every edge; the ISR
//! only timestamps the edge into a lock-free ring.  [`RemoteReceiver::poll`]
//! (main loop) drains the ring through the [`NecCapture`] decoder.
//!
//! ## NEC framing (µs)
//!
//! | Part          | Mark | Space         |
//! |---------------|------|---------------|
//! | Leader        | 9000 | 4500          |
//! | Repeat leader | 9000 | 2250, + 562 mark |
//! | Bit 0         | 562  | 562           |
//! | Bit 1         | 562  | 1687          |
//!
//! 32 bits follow the leader LSB first, then a closing 562 µs mark.  The
//! code is assembled LSB first into a `u32`.

use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use heapless::Vec;

const LEADER_MARK_US: u32 = 9_000;
const LEADER_SPACE_US: u32 = 4_500;
const REPEAT_SPACE_US: u32 = 2_250;
const BIT_MARK_US: u32 = 562;
const ZERO_SPACE_US: u32 = 562;
const ONE_SPACE_US: u32 = 1_687;
/// Silence longer than this ends whatever frame was in progress.
const FRAME_GAP_US: u32 = 15_000;

/// Durations in a complete data frame: leader pair, 32 bit pairs, stop mark.
const FRAME_DURATIONS: usize = 2 + 32 * 2 + 1;
const REPEAT_DURATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteFrame {
    pub code: u32,
    /// NEC "key still held" frame; carries the last full code.
    pub repeat: bool,
}

/// ±25 % window, the usual NEC receive tolerance.
fn near(measured: u32, nominal: u32) -> bool {
    measured >= nominal * 3 / 4 && measured <= nominal * 5 / 4
}

/// Decode a complete run of mark/space durations.
pub fn decode_durations(durations: &[u32]) -> Option<u32> {
    if durations.len() != FRAME_DURATIONS
        || !near(durations[0], LEADER_MARK_US)
        || !near(durations[1], LEADER_SPACE_US)
    {
        return None;
    }
    let mut code = 0u32;
    for bit in 0..32 {
        let mark = durations[2 + bit * 2];
        let space = durations[3 + bit * 2];
        if !near(mark, BIT_MARK_US) {
            return None;
        }
        if near(space, ONE_SPACE_US) {
            code |= 1 << bit;
        } else if !near(space, ZERO_SPACE_US) {
            return None;
        }
    }
    near(durations[FRAME_DURATIONS - 1], BIT_MARK_US).then_some(code)
}

fn is_repeat(durations: &[u32]) -> bool {
    durations.len() == REPEAT_DURATIONS
        && near(durations[0], LEADER_MARK_US)
        && near(durations[1], REPEAT_SPACE_US)
        && near(durations[2], BIT_MARK_US)
}

/// Edge-timestamp to frame decoder.
pub struct NecCapture {
    last_edge_us: Option<u32>,
    durations: Vec<u32, FRAME_DURATIONS>,
    last_code: Option<u32>,
}

impl NecCapture {
    pub fn new() -> Self {
        Self {
            last_edge_us: None,
            durations: Vec::new(),
            last_code: None,
        }
    }

    /// Feed one edge timestamp (µs, wrapping).
    pub fn push_edge(&mut self, t_us: u32) -> Option<RemoteFrame> {
        let previous = self.last_edge_us.replace(t_us)?;
        let d = t_us.wrapping_sub(previous);
        if d > FRAME_GAP_US {
            self.durations.clear();
            return None;
        }
        if self.durations.is_empty() && !near(d, LEADER_MARK_US) {
            // Not a leader mark: wait for the next gap to resync.
            return None;
        }
        if self.durations.push(d).is_err() {
            self.durations.clear();
            return None;
        }

        if is_repeat(&self.durations) {
            self.durations.clear();
            return self.last_code.map(|code| RemoteFrame { code, repeat: true });
        }
        if self.durations.len() == FRAME_DURATIONS {
            let decoded = decode_durations(&self.durations);
            self.durations.clear();
            if let Some(code) = decoded {
                self.last_code = Some(code);
                return Some(RemoteFrame { code, repeat: false });
            }
        }
        None
    }
}

impl Default for NecCapture {
    fn default() -> Self {
        Self::new()
    }
}

// ── Lock-free SPSC edge ring ──────────────────────────────────
//
// ISR writes (produces), main loop reads (consumes).

const EDGE_RING_CAP: usize = 160;

static EDGE_HEAD: AtomicUsize = AtomicUsize::new(0);
static EDGE_TAIL: AtomicUsize = AtomicUsize::new(0);
static EDGE_BUF: [AtomicU32; EDGE_RING_CAP] = [const { AtomicU32::new(0) }; EDGE_RING_CAP];

/// Record an IR edge.  Safe to call from ISR context.  Returns `false`
/// when the ring is full (edge dropped; the frame will fail to decode).
pub fn remote_edge_isr(t_us: u32) -> bool {
    let head = EDGE_HEAD.load(Ordering::Relaxed);
    let tail = EDGE_TAIL.load(Ordering::Acquire);
    let next = (head + 1) % EDGE_RING_CAP;
    if next == tail {
        return false;
    }
    EDGE_BUF[head].store(t_us, Ordering::Relaxed);
    EDGE_HEAD.store(next, Ordering::Release);
    true
}

fn pop_edge() -> Option<u32> {
    let tail = EDGE_TAIL.load(Ordering::Relaxed);
    let head = EDGE_HEAD.load(Ordering::Acquire);
    if tail == head {
        return None;
    }
    let t = EDGE_BUF[tail].load(Ordering::Relaxed);
    EDGE_TAIL.store((tail + 1) % EDGE_RING_CAP, Ordering::Release);
    Some(t)
}

/// Synthesise the edges of a full NEC frame for `code` into the ring.
#[cfg(not(target_os = "espidf"))]
pub fn sim_press(code: u32) {
    static SIM_CLOCK_US: AtomicU32 = AtomicU32::new(1_000_000);
    let mut t = SIM_CLOCK_US.fetch_add(200_000, Ordering::Relaxed);
    let mut edge = |d: u32| {
        t = t.wrapping_add(d);
        remote_edge_isr(t);
    };
    edge(0);
    edge(LEADER_MARK_US);
    edge(LEADER_SPACE_US);
    for bit in 0..32 {
        edge(BIT_MARK_US);
        edge(if code >> bit & 1 == 1 { ONE_SPACE_US } else { ZERO_SPACE_US });
    }
    edge(BIT_MARK_US);
}

/// Main-loop side of the receiver.
pub struct RemoteReceiver {
    capture: NecCapture,
}

impl RemoteReceiver {
    pub fn new() -> Self {
        Self {
            capture: NecCapture::new(),
        }
    }

    /// Drain pending edges until a frame completes or the ring is empty.
    pub fn poll(&mut self) -> Option<RemoteFrame> {
        while let Some(t) = pop_edge() {
            if let Some(frame) = self.capture.push_edge(t) {
                return Some(frame);
            }
        }
        None
    }
}

impl Default for RemoteReceiver {
    fn default() -> Self {
        Self::new()
    }
}
