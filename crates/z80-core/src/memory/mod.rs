//! Flat 64 KiB reference bus.
//!
//! Embedders normally supply their own [`Bus`]; this one backs the tests,
//! the throughput harness and any host that only needs plain RAM with an
//! optional write-protected low region.

use crate::bus::{Bus, BusError};

/// Size in bytes of the flat address space (64 KiB).
pub const ADDRESS_SPACE_BYTES: usize = u16::MAX as usize + 1;

/// Byte returned by an unanswered data bus during interrupt acknowledge.
pub const FLOATING_BUS_BYTE: u8 = 0xFF;

/// Allocates a zeroed 64 KiB backing store.
#[must_use]
pub fn new_address_space() -> Box<[u8]> {
    vec![0; ADDRESS_SPACE_BYTES].into_boxed_slice()
}

/// RAM-only bus with an optional read-only prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatBus {
    memory: Box<[u8]>,
    rom_len: u16,
    acknowledge: Option<u8>,
}

impl Default for FlatBus {
    fn default() -> Self {
        Self::new()
    }
}

impl FlatBus {
    /// Creates a fully writable bus that answers acknowledge cycles with
    /// [`FLOATING_BUS_BYTE`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: new_address_space(),
            rom_len: 0,
            acknowledge: Some(FLOATING_BUS_BYTE),
        }
    }

    /// Creates a bus whose addresses below `rom_len` reject writes.
    #[must_use]
    pub fn with_rom(rom_len: u16) -> Self {
        Self {
            rom_len,
            ..Self::new()
        }
    }

    /// Copies `bytes` into memory starting at `addr`, wrapping past `0xFFFF`.
    ///
    /// Host loads bypass write protection.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        let mut cursor = addr;
        for byte in bytes {
            self.memory[usize::from(cursor)] = *byte;
            cursor = cursor.wrapping_add(1);
        }
    }

    /// Reads a byte without going through the bus protocol.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        self.memory[usize::from(addr)]
    }

    /// Sets the byte supplied on interrupt acknowledge; `None` leaves the
    /// cycle unanswered.
    pub fn set_acknowledge_byte(&mut self, byte: Option<u8>) {
        self.acknowledge = byte;
    }

    /// Full memory image.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.memory
    }
}

impl Bus for FlatBus {
    fn read(&mut self, addr: u16) -> Result<u8, BusError> {
        Ok(self.memory[usize::from(addr)])
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
        if addr < self.rom_len {
            return Err(BusError::ReadOnly { addr });
        }
        self.memory[usize::from(addr)] = value;
        Ok(())
    }

    fn interrupt_acknowledge(&mut self) -> Result<u8, BusError> {
        self.acknowledge.ok_or(BusError::NoAcknowledge)
    }
}

#[cfg(test)]
mod tests {
    use super::{new_address_space, FlatBus, ADDRESS_SPACE_BYTES, FLOATING_BUS_BYTE};
    use crate::bus::{Bus, BusError};

    #[test]
    fn canonical_backing_store_size_is_64kib() {
        let memory = new_address_space();
        assert_eq!(memory.len(), ADDRESS_SPACE_BYTES);
        assert!(memory.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn load_wraps_past_top_of_memory() {
        let mut bus = FlatBus::new();
        bus.load(0xFFFF, &[0xAA, 0xBB]);

        assert_eq!(bus.peek(0xFFFF), 0xAA);
        assert_eq!(bus.peek(0x0000), 0xBB);
    }

    #[test]
    fn rom_prefix_rejects_writes_but_host_load_succeeds() {
        let mut bus = FlatBus::with_rom(0x0100);
        bus.load(0x0000, &[0x3E]);

        assert_eq!(
            bus.write(0x00FF, 1),
            Err(BusError::ReadOnly { addr: 0x00FF })
        );
        assert_eq!(bus.write(0x0100, 1), Ok(()));
        assert_eq!(bus.read(0x0000), Ok(0x3E));
    }

    #[test]
    fn acknowledge_defaults_to_floating_bus_and_can_be_withdrawn() {
        let mut bus = FlatBus::new();
        assert_eq!(bus.interrupt_acknowledge(), Ok(FLOATING_BUS_BYTE));

        bus.set_acknowledge_byte(Some(0x20));
        assert_eq!(bus.interrupt_acknowledge(), Ok(0x20));

        bus.set_acknowledge_byte(None);
        assert_eq!(bus.interrupt_acknowledge(), Err(BusError::NoAcknowledge));
    }
}
