//! Z80 processor core.
//!
//! The crate models the register bank, the operand addressing forms, the
//! precomputed flags engine, the opcode dispatch tables and the
//! reset/NMI/INT arbitration performed before every fetch. Memory and
//! peripherals stay outside: the processor reaches them only through the
//! [`Bus`] trait.

/// Fixed-width octet and word primitives.
pub mod word;
pub use word::{Octet, Word};

/// Bus protocol the processor consumes.
pub mod bus;
pub use bus::{Bus, BusError};

/// Flat 64 KiB reference bus.
pub mod memory;
pub use memory::{new_address_space, FlatBus, ADDRESS_SPACE_BYTES, FLOATING_BUS_BYTE};

/// Programmer-visible state: registers, flip-flops and interrupt mode.
pub mod state;
pub use state::{InterruptMode, Reg16, Reg8, RegisterBank, RESET_AF_SP};

/// Flag layout, affection algebra and precomputed flag tables.
pub mod flags;
pub use flags::{FlagTables, FlagsAffection};

/// 8-bit and 16-bit operand sources and destinations.
pub mod operand;
pub use operand::{Dst16, Dst8, Src16, Src8};

/// Deterministic T-cycle cost table and lookup helpers.
pub mod timing;
pub use timing::{cycle_cost, CycleCostKind, CYCLE_COST_TABLE};

/// Closed instruction set with size and timing metadata.
pub mod instruction;
pub use instruction::{AluOp, Condition, ExchangeKind, Instruction, RotateOp};

/// Opcode dispatch tables.
pub mod decoder;
pub use decoder::{Decoder, ED_PREFIX};

/// Instruction semantics.
pub mod execute;
pub use execute::{execute_instruction, ExecuteOutcome};

/// Shareable reset/NMI/INT line latch.
pub mod signals;
pub use signals::InterruptLines;

/// Processor arbitration, stepping and run loop.
pub mod processor;
pub use processor::{Processor, RunOutcome, StepOutcome, MODE1_VECTOR, NMI_VECTOR};

/// Trace events and sinks.
pub mod trace;
pub use trace::{InterruptSource, NullTraceSink, TraceEvent, TraceSink};

/// Fault taxonomy.
pub mod fault;
pub use fault::{Fault, FaultClass};

/// Processor configuration.
pub mod config;
pub use config::ProcessorConfig;

#[cfg(test)]
use env_logger as _;
#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
