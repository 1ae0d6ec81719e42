use std::collections::VecDeque;

/// Notification sent from the engine to its host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusEvent {
    /// The pending-interrupt line changed.
    InterruptPending(bool),
    /// `EI` or `DI` (or interrupt acknowledge) changed the enable flag.
    InterruptsEnabled(bool),
    /// An `IN` instruction read `port`.
    InputRequested { port: u8 },
    /// An `OUT` instruction wrote `value` to `port`.
    OutputDelivered { port: u8, value: u8 },
}

/// Signalling between the engine and the host environment.
///
/// Holds the interrupt enable flag, at most one pending interrupt request
/// and a bounded queue of [`BusEvent`]s. The host drains the queue between
/// steps instead of registering callbacks. When the queue is full the oldest
/// event is discarded.
#[derive(Clone, Debug)]
pub struct Bus {
    interrupts_enabled: bool,
    pending: Option<u8>,
    events: VecDeque<BusEvent>,
    capacity: usize,
    dropped: u64,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Bus {
    pub fn new(capacity: usize) -> Self {
        Self {
            interrupts_enabled: false,
            pending: None,
            events: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    pub fn reset(&mut self) {
        self.interrupts_enabled = false;
        self.pending = None;
        self.events.clear();
        self.dropped = 0;
    }

    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }

    pub fn set_interrupts_enabled(&mut self, enabled: bool) {
        if self.interrupts_enabled != enabled {
            self.interrupts_enabled = enabled;
            self.emit(BusEvent::InterruptsEnabled(enabled));
        }
    }

    /// Host side: raise an interrupt that the engine services at the start
    /// of its next step. A second request replaces an unserviced one.
    pub fn request_interrupt(&mut self, opcode: u8) {
        let was_pending = self.pending.is_some();
        self.pending = Some(opcode);
        if !was_pending {
            self.emit(BusEvent::InterruptPending(true));
        }
    }

    pub fn interrupt_pending(&self) -> Option<u8> {
        self.pending
    }

    /// Engine side: take the pending request, lowering the line.
    pub fn take_pending(&mut self) -> Option<u8> {
        let opcode = self.pending.take()?;
        self.emit(BusEvent::InterruptPending(false));
        Some(opcode)
    }

    pub(crate) fn input_requested(&mut self, port: u8) {
        self.emit(BusEvent::InputRequested { port });
    }

    pub(crate) fn output_delivered(&mut self, port: u8, value: u8) {
        self.emit(BusEvent::OutputDelivered { port, value });
    }

    pub fn pop_event(&mut self) -> Option<BusEvent> {
        self.events.pop_front()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = BusEvent> + '_ {
        self.events.drain(..)
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Number of events discarded because the queue was full.
    pub fn dropped_events(&self) -> u64 {
        self.dropped
    }

    fn emit(&mut self, event: BusEvent) {
        if self.capacity == 0 {
            self.dropped += 1;
            return;
        }
        if self.events.len() == self.capacity {
            if let Some(old) = self.events.pop_front() {
                log::trace!("bus event queue full, dropping {old:?}");
            }
            self.dropped += 1;
        }
        self.events.push_back(event);
    }
}
