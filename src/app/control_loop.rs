//! Cooperative control loop.
//!
//! One [`ControlLoop::iterate`] call is one pass of the firmware's main
//! loop.  The caller reads the monotonic clock once and passes it in; the
//! loop never sleeps or blocks.  Order within an iteration is fixed:
//!
//! 1. remote poll (non-repeat frames queue a `Toggle`)
//! 2. scheduler (due timers queue `Timer` events)
//! 3. serial drain (handshake tokens, echo records)
//! 4. handshake deadline
//! 5. warm-up deadline
//! 6. event drain
//! 7. actuator time base (`ActuatorPort::advance`)

use log::info;

use super::commands::AppCommand;
use super::ports::{ActuatorPort, EventSink, RemotePort, SensorPort, SerialPort};
use super::service::AppService;
use crate::config::SystemConfig;
use crate::events::{Event, EventQueue};
use crate::scheduler::{Scheduler, TimerId};

/// Bytes consumed from the collector link per iteration.
pub const SERIAL_BYTES_PER_ITERATION: usize = 128;

/// Everything the loop needs from the board, in one value.
pub trait Board: SensorPort + ActuatorPort + RemotePort + SerialPort {}

impl<T: SensorPort + ActuatorPort + RemotePort + SerialPort> Board for T {}

/// Per-iteration counts, mostly for tests and the host simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IterationReport {
    pub timers_fired: usize,
    pub events_handled: usize,
    pub serial_bytes: usize,
}

pub struct ControlLoop {
    service: AppService,
    scheduler: Scheduler,
    queue: EventQueue,
    iterations: u64,
}

impl ControlLoop {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            scheduler: Scheduler::from_config(&config),
            service: AppService::new(config),
            queue: EventQueue::new(),
            iterations: 0,
        }
    }

    /// Start the service and arm the timers from `now_ms`.
    pub fn start(&mut self, now_ms: u64, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.service.start(hw, sink);
        self.scheduler.start(now_ms);
    }

    /// Queue an operator command for the next event drain.
    pub fn submit(&mut self, cmd: AppCommand) -> bool {
        self.queue.push(Event::Command(cmd))
    }

    /// One pass of the main loop.
    pub fn iterate(&mut self, now_ms: u64, hw: &mut impl Board, sink: &mut impl EventSink) -> IterationReport {
        self.iterations += 1;

        if let Some(frame) = hw.poll_remote() {
            if frame.repeat {
                log::debug!("Remote repeat frame ignored");
            } else {
                info!("Remote code 0x{:08X}", frame.code);
                self.queue.push(Event::Command(AppCommand::Toggle));
            }
        }

        let timers_fired = self.scheduler.poll(now_ms, &mut self.queue);
        let serial_bytes = self.service.drain_serial(hw, sink, SERIAL_BYTES_PER_ITERATION);
        self.service.poll_handshake(now_ms, sink);
        self.service.poll_warmup(now_ms, hw, sink);

        let mut events_handled = 0;
        while let Some(event) = self.queue.pop() {
            events_handled += 1;
            match event {
                Event::Command(cmd) => {
                    self.service.handle_command(cmd, now_ms, hw, sink);
                }
                Event::Timer(TimerId::SensorTick) => {
                    self.service.sensor_tick(now_ms, hw, sink);
                }
                Event::Timer(TimerId::Telemetry) => {
                    self.service.telemetry_tick(hw, sink);
                }
                Event::Timer(TimerId::DisplayRotation) => {
                    self.service.rotate_display(hw);
                }
            }
        }

        hw.advance(now_ms);

        IterationReport {
            timers_fired,
            events_handled,
            serial_bytes,
        }
    }

    pub fn service(&self) -> &AppService {
        &self.service
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Events lost to a full queue.
    pub fn dropped_events(&self) -> u32 {
        self.queue.dropped()
    }
}
