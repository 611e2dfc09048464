//! Bus protocol consumed by the processor.

use thiserror::Error;

use crate::word::Word;

/// Failure reported by a bus implementation.
///
/// The processor never retries or reinterprets these; they surface from
/// [`crate::Processor::step`] wrapped in [`crate::Fault::Bus`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BusError {
    /// Nothing decodes the address.
    #[error("no device mapped at {addr:#06x}")]
    Unmapped {
        /// Faulting address.
        addr: u16,
    },
    /// Write targeted read-only storage.
    #[error("write to read-only address {addr:#06x}")]
    ReadOnly {
        /// Faulting address.
        addr: u16,
    },
    /// A device reported a transport failure.
    #[error("device at {addr:#06x} failed: {reason}")]
    Device {
        /// Faulting address.
        addr: u16,
        /// Device-supplied description.
        reason: String,
    },
    /// No device answered the interrupt-acknowledge cycle.
    #[error("interrupt acknowledge cycle was not answered")]
    NoAcknowledge,
}

/// Byte-addressed bus the processor reads and writes through.
///
/// Implementations may block inside any call (slow peripherals); the
/// processor issues one operation at a time and waits for it to complete.
pub trait Bus {
    /// Reads one byte.
    ///
    /// # Errors
    ///
    /// Returns a [`BusError`] when the access cannot be completed.
    fn read(&mut self, addr: u16) -> Result<u8, BusError>;

    /// Writes one byte.
    ///
    /// # Errors
    ///
    /// Returns a [`BusError`] when the access cannot be completed.
    fn write(&mut self, addr: u16, value: u8) -> Result<(), BusError>;

    /// Runs an interrupt-acknowledge cycle and returns the byte placed on
    /// the data bus (an opcode in mode 0, a vector low byte in mode 2).
    ///
    /// # Errors
    ///
    /// Returns a [`BusError`] when no device answers.
    fn interrupt_acknowledge(&mut self) -> Result<u8, BusError>;

    /// Reads a little-endian word from `addr` and `addr + 1`.
    ///
    /// # Errors
    ///
    /// Propagates the first failing byte access.
    fn read_word(&mut self, addr: u16) -> Result<u16, BusError> {
        let low = self.read(addr)?;
        let high = self.read(addr.increment())?;
        Ok(u16::from_halves(high, low))
    }

    /// Writes a little-endian word to `addr` and `addr + 1`.
    ///
    /// # Errors
    ///
    /// Propagates the first failing byte access.
    fn write_word(&mut self, addr: u16, value: u16) -> Result<(), BusError> {
        let (high, low) = value.split();
        self.write(addr, low)?;
        self.write(addr.increment(), high)
    }
}
