//! Non-blocking tone sequencer for the piezo buzzer.
//!
//! A [`TonePattern`] is a fixed list of `(frequency, on, off)` steps.  The
//! main loop calls `tick()` every iteration; the sequencer switches the
//! output on and off as step deadlines pass, so no beep ever blocks the
//! control loop.
//!
//! | Pattern       | Steps                          | Used for                 |
//! |---------------|--------------------------------|--------------------------|
//! | Startup       | 2 × 1000 Hz, 100 on / 100 off  | boot                     |
//! | StateChange   | 1 × 1000 Hz, 100 on / 50 off   | every state transition   |
//! | Environmental | 3 × 2000 Hz, 300 on / 300 off  | fire/blizzard/hurricane/gas, Alert |
//! | Proximity     | 5 × 2000 Hz, 80 on / 70 off    | obstacle, tilt           |

pub const TONE_CHIRP_HZ: u32 = 1_000;
pub const TONE_HAZARD_HZ: u32 = 2_000;

/// Something that can sound a square wave.
pub trait ToneOutput {
    fn start_tone(&mut self, freq_hz: u32);
    fn stop_tone(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneStep {
    pub freq_hz: u32,
    pub on_ms: u32,
    pub off_ms: u32,
}

const fn step(freq_hz: u32, on_ms: u32, off_ms: u32) -> ToneStep {
    ToneStep { freq_hz, on_ms, off_ms }
}

const STARTUP: [ToneStep; 2] = [step(TONE_CHIRP_HZ, 100, 100); 2];
const STATE_CHANGE: [ToneStep; 1] = [step(TONE_CHIRP_HZ, 100, 50)];
const ENVIRONMENTAL: [ToneStep; 3] = [step(TONE_HAZARD_HZ, 300, 300); 3];
const PROXIMITY: [ToneStep; 5] = [step(TONE_HAZARD_HZ, 80, 70); 5];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TonePattern {
    Startup,
    StateChange,
    Environmental,
    Proximity,
}

impl TonePattern {
    pub fn steps(self) -> &'static [ToneStep] {
        match self {
            Self::Startup => &STARTUP,
            Self::StateChange => &STATE_CHANGE,
            Self::Environmental => &ENVIRONMENTAL,
            Self::Proximity => &PROXIMITY,
        }
    }

    /// Total running time including trailing gaps.
    pub fn duration_ms(self) -> u32 {
        self.steps().iter().map(|s| s.on_ms + s.off_ms).sum()
    }
}

#[derive(Debug, Clone, Copy)]
struct Playback {
    pattern: TonePattern,
    step: usize,
    sounding: bool,
    phase_until_ms: u64,
}

pub struct Buzzer<T: ToneOutput> {
    out: T,
    active: Option<Playback>,
}

impl<T: ToneOutput> Buzzer<T> {
    pub fn new(out: T) -> Self {
        Self { out, active: None }
    }

    /// Start `pattern` at `now_ms`, cutting off anything still playing.
    pub fn play(&mut self, pattern: TonePattern, now_ms: u64) {
        let Some(first) = pattern.steps().first() else {
            return;
        };
        self.out.start_tone(first.freq_hz);
        self.active = Some(Playback {
            pattern,
            step: 0,
            sounding: true,
            phase_until_ms: now_ms + u64::from(first.on_ms),
        });
    }

    /// Advance through every phase whose deadline has passed.
    pub fn tick(&mut self, now_ms: u64) {
        while let Some(mut pb) = self.active {
            if now_ms < pb.phase_until_ms {
                return;
            }
            let steps = pb.pattern.steps();
            if pb.sounding {
                self.out.stop_tone();
                pb.sounding = false;
                pb.phase_until_ms += u64::from(steps[pb.step].off_ms);
                self.active = Some(pb);
                continue;
            }
            pb.step += 1;
            match steps.get(pb.step) {
                Some(next) => {
                    self.out.start_tone(next.freq_hz);
                    pb.sounding = true;
                    pb.phase_until_ms += u64::from(next.on_ms);
                    self.active = Some(pb);
                }
                None => self.active = None,
            }
        }
    }

    pub fn silence(&mut self) {
        if self.active.take().is_some() {
            self.out.stop_tone();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    pub fn playing(&self) -> Option<TonePattern> {
        self.active.map(|pb| pb.pattern)
    }
}
