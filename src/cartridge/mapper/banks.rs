//! ROM image and external RAM shared by every controller, plus the bank offset arithmetic.

pub const ROM_BANK_SIZE: usize = 0x4000;
pub const RAM_BANK_SIZE: usize = 0x2000;

/// Backing storage and active bank numbers. Controllers only decide which bank is active.
pub struct Banks {
    rom: Vec<u8>,
    ram: Vec<u8>,
    /// Bank mapped at $4000–$7FFF. Never 0 after a controller write.
    pub rom_bank: usize,
    /// Bank mapped at $A000–$BFFF.
    pub ram_bank: usize,
}

impl Banks {
    /// Wrap a ROM image and allocate `ram_size` bytes of zeroed external RAM. ROM bank starts at 1.
    pub fn new(rom: Vec<u8>, ram_size: usize) -> Self {
        Self {
            rom,
            ram: vec![0; ram_size],
            rom_bank: 1,
            ram_bank: 0,
        }
    }

    fn rom_bank_count(&self) -> usize {
        (self.rom.len() / ROM_BANK_SIZE).max(1)
    }

    /// Read $0000–$3FFF from bank 0, $4000–$7FFF from the active bank (wrapped to the image size).
    pub fn read_rom(&self, addr: u16) -> u8 {
        let phys = match addr {
            0x0000..=0x3FFF => addr as usize,
            0x4000..=0x7FFF => {
                let bank = self.rom_bank % self.rom_bank_count();
                bank * ROM_BANK_SIZE + (addr as usize - 0x4000)
            }
            _ => return 0,
        };
        *self.rom.get(phys).unwrap_or(&0)
    }

    /// Read $A000–$BFFF through the active RAM bank. 0 when no RAM is declared or past its end.
    pub fn read_ram(&self, addr: u16) -> u8 {
        let i = self.ram_index(addr);
        *self.ram.get(i).unwrap_or(&0)
    }

    /// Write $A000–$BFFF through the active RAM bank; ignored when no RAM is declared or past its end.
    pub fn write_ram(&mut self, addr: u16, data: u8) {
        let i = self.ram_index(addr);
        if let Some(b) = self.ram.get_mut(i) {
            *b = data;
        }
    }

    fn ram_index(&self, addr: u16) -> usize {
        self.ram_bank * RAM_BANK_SIZE + (addr.wrapping_sub(0xA000) as usize & 0x1FFF)
    }
}
