//! MBC2: up to 256 KiB ROM, 4-bit RAM cells.
//!
//! [MBC2](https://gbdev.io/pandocs/MBC2.html): writes to $2000–$3FFF select a 4-bit ROM bank
//! (0 reads as 1). There is no RAM banking; RAM writes keep only the low nibble.

use log::debug;

use crate::cartridge::mapper::{banks::Banks, mapper::Mapper};

pub struct Mbc2 {
    banks: Banks,
}

impl Mbc2 {
    pub fn new(rom: Vec<u8>, ram_size: usize) -> Self {
        Self {
            banks: Banks::new(rom, ram_size),
        }
    }
}

impl Mapper for Mbc2 {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => self.banks.read_rom(addr),
            0xA000..=0xBFFF => self.banks.read_ram(addr),
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x2000..=0x3FFF => {
                let mut bank = (data & 0x0F) as usize;
                if bank == 0 {
                    bank = 1;
                }
                self.banks.rom_bank = bank;
                debug!("MBC2 ROM bank {}", bank);
            }
            0xA000..=0xBFFF => self.banks.write_ram(addr, data & 0x0F),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rom_bank_is_four_bits_and_never_zero() {
        let mut mbc = Mbc2::new(vec![0; 0x4000 * 16], 0);
        mbc.write(0x2100, 0x00);
        assert_eq!(mbc.rom_bank(), 1);
        mbc.write(0x2100, 0x3A);
        assert_eq!(mbc.rom_bank(), 0x0A);
    }

    #[test]
    fn ram_keeps_low_nibble() {
        let mut mbc = Mbc2::new(vec![0; 0x8000], 2 * 1024);
        mbc.write(0xA010, 0xAB);
        assert_eq!(mbc.read(0xA010), 0x0B);
    }
}
