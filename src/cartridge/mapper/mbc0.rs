//! No bank controller: 32 KiB fixed ROM, optional 8 KiB RAM at $A000.

use crate::cartridge::mapper::{banks::Banks, mapper::Mapper};

/// ROM ONLY (and ROM+RAM): fixed mapping, ROM writes ignored.
pub struct Mbc0 {
    banks: Banks,
}

impl Mbc0 {
    pub fn new(rom: Vec<u8>, ram_size: usize) -> Self {
        Self {
            banks: Banks::new(rom, ram_size),
        }
    }
}

impl Mapper for Mbc0 {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => self.banks.read_rom(addr),
            0xA000..=0xBFFF => self.banks.read_ram(addr),
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x7FFF => {} // ROM: no registers
            0xA000..=0xBFFF => self.banks.write_ram(addr, data),
            _ => {}
        }
    }

    fn rom_bank(&self) -> usize {
        self.banks.rom_bank
    }

    fn ram_bank(&self) -> usize {
        self.banks.ram_bank
    }
}
