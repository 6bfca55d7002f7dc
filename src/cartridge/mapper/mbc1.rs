//! MBC1: up to 2 MiB ROM and 32 KiB RAM.
//!
//! [MBC1](https://gbdev.io/pandocs/MBC1.html): writes to $2000–$3FFF select the low 5 bits of the
//! ROM bank (0 reads as 1). Writes to $4000–$5FFF hold a 2-bit value that is either the RAM bank
//! or ROM bank bits 5–6, depending on the mode latch written at $6000–$7FFF (0 = ROM, 1 = RAM).
//! RAM enable ($0000–$1FFF) is not gated: external RAM is always accessible.

use log::debug;

use crate::cartridge::mapper::{banks::Banks, mapper::Mapper};

/// MBC1 state: shared banks plus the banking mode latch.
pub struct Mbc1 {
    banks: Banks,
    /// 0 = $4000 writes drive ROM bits 5–6, 1 = they drive the RAM bank.
    mode: u8,
}

impl Mbc1 {
    pub fn new(rom: Vec<u8>, ram_size: usize) -> Self {
        Self {
            banks: Banks::new(rom, ram_size),
            mode: 0,
        }
    }
}

impl Mapper for Mbc1 {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => self.banks.read_rom(addr),
            0xA000..=0xBFFF => self.banks.read_ram(addr),
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x1FFF => {} // RAM enable: always on
            0x2000..=0x3FFF => {
                let mut low = (data & 0x1F) as usize;
                if low == 0 {
                    low = 1;
                }
                self.banks.rom_bank = (self.banks.rom_bank & 0x60) | low;
                debug!("MBC1 ROM bank {}", self.banks.rom_bank);
            }
            0x4000..=0x5FFF => {
                let bits = (data & 0x03) as usize;
                if self.mode == 1 {
                    self.banks.ram_bank = bits;
                    debug!("MBC1 RAM bank {}", bits);
                } else {
                    self.banks.rom_bank = (self.banks.rom_bank & 0x1F) | (bits << 5);
                    debug!("MBC1 ROM bank {}", self.banks.rom_bank);
                }
            }
            0x6000..=0x7FFF => self.mode = data & 0x01,
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

#[cfg(test)]
mod tests {
    use super::*;

    /// 8 ROM banks, each filled with its own bank number.
    fn tagged_rom(banks: usize) -> Vec<u8> {
        (0..banks).flat_map(|b| vec![b as u8; 0x4000]).collect()
    }

    #[test]
    fn bank_zero_write_selects_bank_one() {
        let mut mbc = Mbc1::new(tagged_rom(8), 0);
        mbc.write(0x2000, 0x00);
        assert_eq!(mbc.rom_bank(), 1);
        assert_eq!(mbc.read(0x4000), 1);
    }

    #[test]
    fn low_bits_select_rom_bank() {
        let mut mbc = Mbc1::new(tagged_rom(8), 0);
        mbc.write(0x2000, 0x05);
        assert_eq!(mbc.rom_bank(), 5);
        assert_eq!(mbc.read(0x7FFF), 5);
        // Bank 0 window is fixed
        assert_eq!(mbc.read(0x0000), 0);
    }

    #[test]
    fn upper_bits_extend_rom_bank_in_mode_zero() {
        let mut mbc = Mbc1::new(tagged_rom(8), 0);
        mbc.write(0x2000, 0x03);
        mbc.write(0x4000, 0x01);
        assert_eq!(mbc.rom_bank(), 0x23);
        // Bank 0x20 can never be selected: low bits stay non-zero
        mbc.write(0x2000, 0x00);
        assert_eq!(mbc.rom_bank(), 0x21);
    }

    #[test]
    fn mode_one_switches_ram_bank() {
        let mut mbc = Mbc1::new(tagged_rom(2), 32 * 1024);
        mbc.write(0xA000, 0x11);
        mbc.write(0x6000, 0x01);
        mbc.write(0x4000, 0x02);
        assert_eq!(mbc.ram_bank(), 2);
        assert_eq!(mbc.read(0xA000), 0x00);
        mbc.write(0xA000, 0x22);
        mbc.write(0x4000, 0x00);
        assert_eq!(mbc.read(0xA000), 0x11);
        mbc.write(0x4000, 0x02);
        assert_eq!(mbc.read(0xA000), 0x22);
    }

    #[test]
    fn ram_access_is_noop_without_declared_ram() {
        let mut mbc = Mbc1::new(tagged_rom(2), 0);
        mbc.write(0xA000, 0x42);
        assert_eq!(mbc.read(0xA000), 0);
    }
}
