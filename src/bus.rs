//! Memory bus and address decoding for the Game Boy.
//!
//! Maps CPU addresses to the cartridge, PPU, work RAM, joypad, interrupt flag, and high RAM.

use log::debug;

use crate::{
    cartridge::cartridge::Cartridge, controller::Controller, ppu::ppu::Ppu, screen::Screen,
};

pub const WRAM_LEN: usize = 0x2000;
pub const HRAM_LEN: usize = 0x80;

pub const JOYPAD_ADDR: u16 = 0xFF00;
pub const INTERRUPT_FLAG_ADDR: u16 = 0xFF0F;
pub const DMA_ADDR: u16 = 0xFF46;
pub const INTERRUPT_ENABLE_ADDR: u16 = 0xFFFF;

/// Trait for memory-mapped I/O and bus access used by the CPU.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, data: u8);

    /// Little-endian: low byte at `addr`, high byte at `addr + 1`.
    fn read16(&mut self, addr: u16) -> u16 {
        let lo = self.read8(addr) as u16;
        let hi = self.read8(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    fn write16(&mut self, addr: u16, data: u16) {
        self.write8(addr, data as u8);
        self.write8(addr.wrapping_add(1), (data >> 8) as u8);
    }
}

/// Main Game Boy bus: cartridge, PPU, joypad, work RAM, high RAM, and IF.
pub struct GameBoyBus {
    pub cart: Cartridge,
    pub ppu: Ppu,
    pub controller: Controller,
    /// $C000–$DFFF, echoed at $E000–$FDFF.
    pub wram: [u8; WRAM_LEN],
    /// $FF80–$FFFF; the last byte is the interrupt enable register.
    pub hram: [u8; HRAM_LEN],
    /// IF ($FF0F).
    pub interrupt_flag: u8,
}

impl GameBoyBus {
    /// Create a new bus with the given cartridge.
    pub fn new(cart: Cartridge) -> Self {
        Self {
            cart,
            ppu: Ppu::new(),
            controller: Controller::new(),
            wram: [0; WRAM_LEN],
            hram: [0; HRAM_LEN],
            interrupt_flag: 0,
        }
    }

    /// IE ($FFFF).
    pub fn interrupt_enable(&self) -> u8 {
        self.hram[HRAM_LEN - 1]
    }

    /// Advance the PPU by `cycles`; entering vblank raises IF bit 0.
    pub fn tick(&mut self, cycles: u32, screen: &mut dyn Screen) {
        if self.ppu.step(cycles, screen) {
            self.interrupt_flag |= 0x01;
        }
    }

    /// Copy 160 bytes from `page << 8` into OAM (OAM DMA from $FF46).
    fn oam_dma(&mut self, page: u8) {
        let start = (page as u16) << 8;
        debug!("OAM DMA from ${:04X}", start);
        for i in 0..self.ppu.oam.len() as u16 {
            let byte = self.read8(start.wrapping_add(i));
            self.ppu.oam[i as usize] = byte;
        }
    }
}

impl Bus for GameBoyBus {
    fn read8(&mut self, addr: u16) -> u8 {
        match addr {
            // Cartridge ROM: bank 0 and switchable bank
            0x0000..=0x7FFF => self.cart.read(addr),
            // VRAM
            0x8000..=0x9FFF => self.ppu.read(addr),
            // External cartridge RAM
            0xA000..=0xBFFF => self.cart.read(addr),
            // Work RAM and its echo
            0xC000..=0xFDFF => self.wram[(addr & 0x1FFF) as usize],
            // OAM
            0xFE00..=0xFE9F => self.ppu.read(addr),
            // Unusable
            0xFEA0..=0xFEFF => 0,
            JOYPAD_ADDR => self.controller.read(),
            INTERRUPT_FLAG_ADDR => self.interrupt_flag,
            // LCD registers (DMA is write-only)
            DMA_ADDR => 0,
            0xFF40..=0xFF4B => self.ppu.read(addr),
            // Timer, serial, sound, and the rest of the I/O window: open bus
            0xFF01..=0xFF7F => 0,
            // High RAM and IE
            0xFF80..=0xFFFF => self.hram[(addr & 0x7F) as usize],
        }
    }

    fn write8(&mut self, addr: u16, data: u8) {
        match addr {
            // Cartridge: bank controller registers
            0x0000..=0x7FFF => self.cart.write(addr, data),
            0x8000..=0x9FFF => self.ppu.write(addr, data),
            0xA000..=0xBFFF => self.cart.write(addr, data),
            0xC000..=0xFDFF => self.wram[(addr & 0x1FFF) as usize] = data,
            0xFE00..=0xFE9F => self.ppu.write(addr, data),
            0xFEA0..=0xFEFF => {}
            JOYPAD_ADDR => self.controller.write(data),
            INTERRUPT_FLAG_ADDR => self.interrupt_flag = data,
            DMA_ADDR => self.oam_dma(data),
            0xFF40..=0xFF4B => self.ppu.write(addr, data),
            0xFF01..=0xFF7F => {}
            0xFF80..=0xFFFF => self.hram[(addr & 0x7F) as usize] = data,
        }
    }
}
