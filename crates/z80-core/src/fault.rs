use thiserror::Error;

use crate::bus::BusError;

/// Fault classes used by embedders to pick a policy (stop, break, log).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Decoder met an opcode with no assigned instruction.
    Decode,
    /// The bus reported a failed access.
    Bus,
}

/// Fault raised by a processor step; the step's cycles are not charged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum Fault {
    /// Opcode has no entry in the dispatch table.
    #[error("illegal opcode {} at {pc:#06x}", opcode_label(*.prefix, *.opcode))]
    IllegalOpcode {
        /// Prefix byte (`0xED`, ...) when the opcode came from a prefixed page.
        prefix: Option<u8>,
        /// Offending opcode byte.
        opcode: u8,
        /// Address of the first byte of the instruction.
        pc: u16,
    },
    /// Bus failure, passed through unchanged.
    #[error(transparent)]
    Bus(#[from] BusError),
}

fn opcode_label(prefix: Option<u8>, opcode: u8) -> String {
    match prefix {
        Some(prefix) => format!("{prefix:#04x} {opcode:#04x}"),
        None => format!("{opcode:#04x}"),
    }
}

impl Fault {
    /// Returns the policy class for this fault.
    #[must_use]
    pub const fn class(&self) -> FaultClass {
        match self {
            Self::IllegalOpcode { .. } => FaultClass::Decode,
            Self::Bus(_) => FaultClass::Bus,
        }
    }
}
