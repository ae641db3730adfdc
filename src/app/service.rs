//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the state machine, the classifier, the acquisition
//! adapter, the dispatcher and the collector link state.  It exposes a
//! clean, hardware-agnostic API.  All I/O flows through port traits
//! injected at call sites, making the entire service testable with mock
//! adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          AppService          │
//! ActuatorPort ◀──│  Hub · Classifier · FSM      │
//!                 │  Dispatcher · CloudLink      │
//!  SerialPort ◀──▶└──────────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, OperatingState, Transition, TransitionInput};
use crate::hazard::{Assessment, Hazard, HazardClassifier};
use crate::sensors::{Sample, SensorHub};
use crate::telemetry::{CloudLink, EchoCache, Inbound, LineDecoder, LinkStatus, TelemetryRecord};

use super::commands::AppCommand;
use super::dispatcher::ActuationDispatcher;
use super::display::{DisplayPage, render};
use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink, SensorPort, SerialPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    fsm: Fsm,
    ctx: FsmContext,
    hub: SensorHub,
    classifier: HazardClassifier,
    dispatcher: ActuationDispatcher,
    link: CloudLink,
    echo: EchoCache,
    decoder: LineDecoder,
    /// Set on entering Idle; the FSM is held until it passes.
    warmup_deadline_ms: Option<u64>,
    last_assessment: Option<Assessment>,
    /// A hazard advisory was shown on the previous sampling tick.
    hazard_active: bool,
    page: DisplayPage,
    tick_count: u64,
    telemetry_sent: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let fsm = Fsm::new(build_state_table(), OperatingState::Off);
        Self {
            fsm,
            ctx: FsmContext::new(),
            hub: SensorHub::new(&config),
            classifier: HazardClassifier::new(&config),
            dispatcher: ActuationDispatcher::new(),
            link: CloudLink::new(u64::from(config.handshake_timeout_ms)),
            echo: EchoCache::new(),
            decoder: LineDecoder::new(),
            warmup_deadline_ms: None,
            last_assessment: None,
            hazard_active: false,
            page: DisplayPage::Standby,
            tick_count: 0,
            telemetry_sent: 0,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter Off, put every actuator in its safe state and sound the
    /// startup tone.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        self.page = self.ctx.commands.page;
        let lines = render(self.page, None, &self.echo);
        self.dispatcher.power_on_reset(self.fsm.current_state(), &lines, hw);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AppService started in {}", self.fsm.current_state());
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an operator command.  Returns `true` if the state changed.
    pub fn handle_command<H>(&mut self, cmd: AppCommand, now_ms: u64, hw: &mut H, sink: &mut impl EventSink) -> bool
    where
        H: ActuatorPort + SerialPort,
    {
        let command = cmd.resolve(self.fsm.current_state());
        let input = TransitionInput::command(command);
        match self.fsm.step(&input, &mut self.ctx) {
            Some(t) => {
                self.on_transition(t, now_ms, hw, sink);
                true
            }
            None => {
                debug!("{:?} ignored in {}", command, self.fsm.current_state());
                false
            }
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One sampling tick: acquire → classify → state machine → dispatch.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`]; this avoids a double mutable borrow while keeping
    /// the port boundary explicit.  The state machine is held while the
    /// warm-up deadline is pending.
    pub fn sensor_tick<H>(&mut self, now_ms: u64, hw: &mut H, sink: &mut impl EventSink) -> Assessment
    where
        H: SensorPort + ActuatorPort + SerialPort,
    {
        self.tick_count += 1;

        let sample = self.hub.acquire(hw);
        let assessment = self.classifier.evaluate(&sample);
        self.last_assessment = Some(assessment);

        if self.warmup_deadline_ms.is_none() {
            let input = TransitionInput::sensors(assessment.gas_hazard, self.critical_fault(&sample));
            if let Some(t) = self.fsm.step(&input, &mut self.ctx) {
                self.on_transition(t, now_ms, hw, sink);
            }
        }

        if self.fsm.current_state().is_on() {
            self.advise(&assessment, &sample, hw, sink);
        }
        assessment
    }

    /// Release the warm-up hold once its deadline has passed and step the
    /// state machine on the latest assessment.
    pub fn poll_warmup<H>(&mut self, now_ms: u64, hw: &mut H, sink: &mut impl EventSink) -> bool
    where
        H: ActuatorPort + SerialPort,
    {
        match self.warmup_deadline_ms {
            Some(deadline) if now_ms >= deadline => {}
            _ => return false,
        }
        self.warmup_deadline_ms = None;
        info!("Warm-up complete");

        let gas_hazard = self.last_assessment.is_some_and(|a| a.gas_hazard);
        let critical_fault = self.hub.latest().is_some_and(|s| self.critical_fault(&s));
        let input = TransitionInput::sensors(gas_hazard, critical_fault);
        if let Some(t) = self.fsm.step(&input, &mut self.ctx) {
            self.on_transition(t, now_ms, hw, sink);
        }
        true
    }

    /// Write one telemetry record.  Skipped while Off or before the first
    /// sample.
    pub fn telemetry_tick(&mut self, serial: &mut impl SerialPort, sink: &mut impl EventSink) -> bool {
        let state = self.fsm.current_state();
        if !state.is_on() {
            return false;
        }
        let Some(sample) = self.hub.latest() else {
            debug!("Telemetry skipped: no sample yet");
            return false;
        };
        let record = TelemetryRecord::new(&sample, state);
        let line = match record.to_line() {
            Ok(line) => line,
            Err(e) => {
                warn!("Telemetry record dropped: {}", e);
                return false;
            }
        };
        if let Err(e) = serial.write_line(&line) {
            warn!("Telemetry write failed: {}", e);
            return false;
        }
        self.telemetry_sent += 1;
        sink.emit(&AppEvent::Telemetry(record));
        true
    }

    /// Advance the Active page rotation.  Other states keep their page.
    pub fn rotate_display(&mut self, hw: &mut impl ActuatorPort) -> bool {
        if self.fsm.current_state() != OperatingState::Active {
            return false;
        }
        self.page = self.page.next(self.echo.has_data());
        hw.show(&self.render_page());
        true
    }

    /// Consume up to `max_bytes` received bytes from the collector link.
    /// Returns the number of bytes consumed.
    pub fn drain_serial(&mut self, serial: &mut impl SerialPort, sink: &mut impl EventSink, max_bytes: usize) -> usize {
        let mut consumed = 0;
        while consumed < max_bytes {
            let Some(byte) = serial.read_byte() else { break };
            consumed += 1;
            if let Some(msg) = self.decoder.push(byte) {
                self.handle_inbound(msg, sink);
            }
        }
        consumed
    }

    /// Check the handshake deadline.
    pub fn poll_handshake(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        if let Some(status) = self.link.poll(now_ms) {
            sink.emit(&AppEvent::Cloud(status));
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> OperatingState {
        self.fsm.current_state()
    }

    pub fn latest_sample(&self) -> Option<Sample> {
        self.hub.latest()
    }

    pub fn last_assessment(&self) -> Option<Assessment> {
        self.last_assessment
    }

    pub fn link_status(&self) -> LinkStatus {
        self.link.status()
    }

    pub fn echo(&self) -> &EchoCache {
        &self.echo
    }

    pub fn page(&self) -> DisplayPage {
        self.page
    }

    pub fn warmup_pending(&self) -> bool {
        self.warmup_deadline_ms.is_some()
    }

    /// Sampling ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn telemetry_sent(&self) -> u64 {
        self.telemetry_sent
    }

    /// Bitmask of sensor channels currently failing.
    pub fn faulted_channels(&self) -> u8 {
        self.hub.faulted_channels()
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn critical_fault(&self, sample: &Sample) -> bool {
        self.config.error_on_critical_sensor_fault && sample.critical_sensors_failed()
    }

    fn on_transition<H>(&mut self, t: Transition, now_ms: u64, hw: &mut H, sink: &mut impl EventSink)
    where
        H: ActuatorPort + SerialPort,
    {
        match t.to {
            OperatingState::Idle => {
                self.warmup_deadline_ms = Some(now_ms.saturating_add(u64::from(self.config.warmup_ms)));
                match self.link.begin(now_ms, hw) {
                    Ok(()) => sink.emit(&AppEvent::Cloud(LinkStatus::Pending)),
                    Err(_) => sink.emit(&AppEvent::Cloud(LinkStatus::NotConnected)),
                }
            }
            OperatingState::Off => {
                self.warmup_deadline_ms = None;
                self.hazard_active = false;
                self.link.abort();
            }
            _ => {}
        }

        self.page = self.ctx.commands.page;
        let lines = self.render_page();
        self.dispatcher.apply_state(t.to, &self.ctx.commands, &lines, hw);
        sink.emit(&AppEvent::StateChanged { from: t.from, to: t.to });
    }

    fn advise(&mut self, assessment: &Assessment, sample: &Sample, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        if assessment.dominant != Hazard::None {
            self.dispatcher
                .apply_hazard(assessment.dominant, sample, &self.ctx.commands, hw);
            self.hazard_active = true;
            sink.emit(&AppEvent::Hazard {
                dominant: assessment.dominant,
                flags: assessment.flags,
            });
        } else if self.hazard_active {
            self.hazard_active = false;
            hw.show(&self.render_page());
            sink.emit(&AppEvent::HazardCleared);
        }
    }

    fn handle_inbound(&mut self, msg: Inbound, sink: &mut impl EventSink) {
        match msg {
            Inbound::CloudOk | Inbound::CloudFail => {
                let ok = msg == Inbound::CloudOk;
                if let Some(status) = self.link.on_token(ok) {
                    if ok {
                        info!("Cloud link connected");
                    } else {
                        warn!("Cloud link refused");
                    }
                    sink.emit(&AppEvent::Cloud(status));
                }
            }
            Inbound::Echo(record) => {
                let fields = self.echo.apply(&record);
                if fields > 0 {
                    sink.emit(&AppEvent::Echo { fields });
                } else {
                    debug!("Echo record with no usable fields: {}", record);
                }
            }
        }
    }

    fn render_page(&self) -> super::display::DisplayLines {
        render(self.page, self.hub.latest().as_ref(), &self.echo)
    }
}
