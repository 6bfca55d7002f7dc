//! MBC3 (real-time clock) and MBC5 (rumble) placeholder.
//!
//! Banking for these controllers is not implemented. The image is mapped like a cartridge
//! without a controller: bank 1 stays at $4000 and register writes are dropped.

use log::warn;

use crate::cartridge::mapper::{MbcKind, banks::Banks, mapper::Mapper};

pub struct Stub {
    banks: Banks,
}

impl Stub {
    pub fn new(kind: MbcKind, rom: Vec<u8>, ram_size: usize) -> Self {
        warn!("{} bank switching is not implemented; ROM bank 1 stays mapped", kind);
        Self {
            banks: Banks::new(rom, ram_size),
        }
    }
}

impl Mapper for Stub {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => self.banks.read_rom(addr),
            0xA000..=0xBFFF => self.banks.read_ram(addr),
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        if let 0xA000..=0xBFFF = addr {
            self.banks.write_ram(addr, data);
        }
    }

    fn rom_bank(&self) -> usize {
        self.banks.rom_bank
    }

    fn ram_bank(&self) -> usize {
        self.banks.ram_bank
    }
}
