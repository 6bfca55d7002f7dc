//! Gbm: a Game Boy (DMG) emulator written in Rust.
//!
//! Implements the DMG chipset as documented in the
//! [Pan Docs](https://gbdev.io/pandocs/): the Sharp LR35902 CPU, the picture
//! processing unit, cartridge bank controllers (MBC1, MBC2), and the joypad latch.
//!
//! ## Modules (Pan Docs references)
//!
//! - **bus** – [Memory map](https://gbdev.io/pandocs/Memory_Map.html): cartridge, VRAM,
//!   WRAM + echo, OAM, I/O window, HRAM, interrupt flag/enable
//! - **cartridge** – [Cartridge header](https://gbdev.io/pandocs/The_Cartridge_Header.html);
//!   [MBCs](https://gbdev.io/pandocs/MBCs.html) none, MBC1, MBC2 (MBC3/MBC5 stubbed)
//! - **controller** – [Joypad input](https://gbdev.io/pandocs/Joypad_Input.html): $FF00 select lines
//! - **cpu** – [CPU instruction set](https://gbdev.io/pandocs/CPU_Instruction_Set.html),
//!   [interrupts](https://gbdev.io/pandocs/Interrupts.html), HALT
//! - **logger** – coloured console backend for the `log` facade
//! - **ppu** – [Rendering](https://gbdev.io/pandocs/Rendering.html), [LCDC](https://gbdev.io/pandocs/LCDC.html),
//!   [STAT](https://gbdev.io/pandocs/STAT.html), 160×144 background scanlines
//! - **screen** – display sink the PPU flushes finished frames into
//! - **system** – one emulated machine and its per-instruction driving order

pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod logger;
pub mod ppu;
pub mod screen;
pub mod system;
