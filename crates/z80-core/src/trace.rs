//! Deterministic trace hooks.

use crate::fault::FaultClass;

/// What caused control to enter an interrupt handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum InterruptSource {
    /// Non-maskable interrupt.
    Nmi,
    /// Maskable interrupt serviced in mode 0.
    Mode0,
    /// Maskable interrupt serviced in mode 1.
    Mode1,
    /// Maskable interrupt serviced in mode 2.
    Mode2,
}

/// Ordered events emitted while stepping with tracing enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TraceEvent {
    /// An opcode was fetched and is about to execute.
    InstructionStart {
        /// Address of the opcode.
        pc: u16,
        /// First opcode byte.
        opcode: u8,
    },
    /// The instruction at `pc` retired.
    InstructionRetired {
        /// Address of the opcode.
        pc: u16,
        /// T-cycles charged.
        cycles: u32,
    },
    /// An interrupt was accepted.
    InterruptAccepted {
        /// Interrupt kind.
        source: InterruptSource,
        /// Handler address now in `PC`.
        vector: u16,
    },
    /// The register bank was reinitialized by a reset request.
    Reset,
    /// A step ended in a fault.
    FaultRaised {
        /// `PC` at the start of the faulting step.
        pc: u16,
        /// Fault class.
        fault_class: FaultClass,
    },
}

/// Receives trace events in execution order.
pub trait TraceSink {
    /// Records an event.
    fn on_event(&mut self, event: TraceEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn on_event(&mut self, _event: TraceEvent) {}
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}
