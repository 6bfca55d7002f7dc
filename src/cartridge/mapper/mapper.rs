//! Mapper trait: ROM and external RAM access through the active banks.

/// Trait for Game Boy bank controllers. The bus routes $0000–$7FFF and $A000–$BFFF here.
pub trait Mapper {
    /// Read from ROM ($0000–$7FFF) or external RAM ($A000–$BFFF).
    fn read(&self, addr: u16) -> u8;
    /// Write to external RAM, or to a bank register when `addr` is in the ROM window.
    fn write(&mut self, addr: u16, data: u8);
    /// ROM bank currently visible at $4000–$7FFF.
    fn rom_bank(&self) -> usize;
    /// External RAM bank currently visible at $A000–$BFFF.
    fn ram_bank(&self) -> usize;
}
