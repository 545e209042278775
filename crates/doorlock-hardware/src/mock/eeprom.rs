//! In-memory EEPROM.

use crate::{
    Result,
    traits::{NonVolatileMemory, check_range},
};
use doorlock_core::constants::{EEPROM_ERASED_BYTE, EEPROM_SIZE};

/// Byte array standing in for an I2C EEPROM. Starts fully erased (`0xFF`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEeprom {
    cells: Vec<u8>,
    writes: usize,
}

impl MemoryEeprom {
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![EEPROM_ERASED_BYTE; size],
            writes: 0,
        }
    }

    /// Wrap an existing memory image.
    pub fn from_image(cells: Vec<u8>) -> Self {
        Self { cells, writes: 0 }
    }

    pub fn image(&self) -> &[u8] {
        &self.cells
    }

    /// Number of write operations performed (a block write counts once).
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl Default for MemoryEeprom {
    fn default() -> Self {
        Self::new(EEPROM_SIZE)
    }
}

impl NonVolatileMemory for MemoryEeprom {
    fn size(&self) -> usize {
        self.cells.len()
    }

    async fn read_byte(&mut self, address: u16) -> Result<u8> {
        check_range(address, 1, self.cells.len())?;
        Ok(self.cells[usize::from(address)])
    }

    async fn write_byte(&mut self, address: u16, value: u8) -> Result<()> {
        check_range(address, 1, self.cells.len())?;
        self.cells[usize::from(address)] = value;
        self.writes += 1;
        Ok(())
    }

    async fn write_bytes(&mut self, address: u16, data: &[u8]) -> Result<()> {
        check_range(address, data.len(), self.cells.len())?;
        let start = usize::from(address);
        self.cells[start..start + data.len()].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }

    async fn read_bytes(&mut self, address: u16, len: usize) -> Result<Vec<u8>> {
        check_range(address, len, self.cells.len())?;
        let start = usize::from(address);
        Ok(self.cells[start..start + len].to_vec())
    }
}
