//! Loop event queue.
//!
//! Events are produced by:
//! - the scheduler (timer fires, via [`SchedulerDelegate`])
//! - the remote receiver (decoded button frames)
//! - software (commands injected by the host binary or tests)
//!
//! Events are consumed by the control loop, which drains the queue once
//! per iteration in FIFO order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Scheduler   │────▶│              │     │              │
//! │ IR remote   │────▶│  EventQueue  │────▶│ Control loop │
//! │ Software    │────▶│  (bounded)   │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! The queue is owned by the loop; nothing here is shared with an ISR.
//! A full queue drops the new event with a warning.

use heapless::Deque;
use log::warn;

use crate::app::commands::AppCommand;
use crate::app::ports::SchedulerDelegate;
use crate::scheduler::TimerId;

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A periodic timer fired.
    Timer(TimerId),
    /// Operator command (remote button, console, test).
    Command(AppCommand),
}

pub struct EventQueue {
    queue: Deque<Event, EVENT_QUEUE_CAP>,
    dropped: u32,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            queue: Deque::new(),
            dropped: 0,
        }
    }

    /// Push an event.  Returns `false` if the queue is full (event dropped).
    pub fn push(&mut self, event: Event) -> bool {
        match self.queue.push_back(event) {
            Ok(()) => true,
            Err(event) => {
                self.dropped = self.dropped.wrapping_add(1);
                warn!("event queue full, dropped {:?}", event);
                false
            }
        }
    }

    /// Pop the next event.  `None` if the queue is empty.
    pub fn pop(&mut self) -> Option<Event> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Events lost to a full queue since construction.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerDelegate for EventQueue {
    fn on_timer_fired(&mut self, timer: TimerId) {
        self.push(Event::Timer(timer));
    }
}
