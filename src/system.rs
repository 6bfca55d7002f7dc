//! One emulated machine: the CPU, its bus, and the devices the bus owns.

use crate::{
    bus::GameBoyBus, cartridge::cartridge::Cartridge, controller::KeySource, cpu::cpu::Cpu,
    screen::Screen,
};

pub struct GameBoy {
    pub cpu: Cpu<GameBoyBus>,
}

impl GameBoy {
    /// Build a machine around `cart` in its post-boot state.
    pub fn new(cart: Cartridge) -> Self {
        let mut cpu = Cpu::new(GameBoyBus::new(cart));
        cpu.reset();
        Self { cpu }
    }

    /// Emulate one instruction: sample the keys, run the CPU, then advance the PPU by the
    /// cycles it reported. Returns those cycles; 0 means execution hit an invalid opcode.
    pub fn step(&mut self, keys: &dyn KeySource, screen: &mut dyn Screen) -> u32 {
        self.cpu.bus.controller.step(keys);
        let cycles = self.cpu.step();
        if cycles > 0 {
            self.cpu.bus.tick(cycles, screen);
        }
        cycles
    }

    /// Step until the PPU has flushed one more frame. Returns false if an invalid opcode
    /// stopped execution first.
    pub fn run_frame(&mut self, keys: &dyn KeySource, screen: &mut dyn Screen) -> bool {
        let target = self.cpu.bus.ppu.frame_count + 1;
        while self.cpu.bus.ppu.frame_count < target {
            if self.step(keys, screen) == 0 {
                return false;
            }
        }
        true
    }
}
