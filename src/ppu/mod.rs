//! PPU (Picture Processing Unit) emulation for the Game Boy.
//!
//! See [Rendering](https://gbdev.io/pandocs/Rendering.html), [LCDC](https://gbdev.io/pandocs/LCDC.html),
//! [STAT](https://gbdev.io/pandocs/STAT.html). Handles the four-mode scanline timing (456 cycles per
//! line, 154 lines per frame), vblank interrupt, background rendering, VRAM, OAM, and the
//! 160×144 framebuffer.

pub mod ppu;
