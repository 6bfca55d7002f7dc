//! Game Boy PPU implementation.
//!
//! Mode timing, LCD registers ($FF40–$FF4B), VRAM ($8000–$9FFF), OAM ($FE00–$FE9F), background
//! scanline rendering, and the colour-index framebuffer flushed to a [`Screen`] at vblank.

use log::debug;

use crate::screen::{Frame, SCREEN_HEIGHT, SCREEN_WIDTH, Screen};

/// DMG shades for colour indices 0–3 (0xRRGGBB), lightest first.
pub const SHADES: [u32; 4] = [0xFFFFFF, 0xAAAAAA, 0x555555, 0x000000];

pub const VRAM_LEN: usize = 0x2000;
/// OAM: 40 sprites × 4 bytes (Y, X, tile, attributes).
pub const OAM_LEN: usize = 160;

const OAM_SCAN_CYCLES: u32 = 80;
const PIXEL_TRANSFER_CYCLES: u32 = 172;
const HBLANK_CYCLES: u32 = 204;
const SCANLINE_CYCLES: u32 = 456;
const VBLANK_LINE: u8 = 144;
const LAST_LINE: u8 = 153;
/// While the LCD is off the sink still gets a blank frame this often.
const LCD_OFF_FLUSH_CYCLES: u32 = 60_000;

/// LCDC value left by the boot ROM: display on, background on, tile data at $8000.
const LCDC_POWER_UP: u8 = 0x91;

/// STAT mode, as reported in bits 0–1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    PixelTransfer = 3,
}

/// LCDC ($FF40) bit accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcdControl(pub u8);

impl LcdControl {
    /// Bit 7: LCD and PPU enable.
    pub fn display_enabled(self) -> bool {
        self.0 & 0x80 != 0
    }

    /// Bit 4: 1 = tile data at $8000 with unsigned indices, 0 = $8800 with indices biased by $80.
    pub fn unsigned_tile_data(self) -> bool {
        self.0 & 0x10 != 0
    }

    /// Bit 3: 1 = background map at $9C00, 0 = $9800.
    pub fn high_bg_map(self) -> bool {
        self.0 & 0x08 != 0
    }

    /// Bit 0: background enable.
    pub fn bg_enabled(self) -> bool {
        self.0 & 0x01 != 0
    }
}

/// PPU state: timing, LCD registers, VRAM, OAM, and framebuffer.
pub struct Ppu {
    pub vram: [u8; VRAM_LEN],
    pub oam: [u8; OAM_LEN],
    pub lcdc: u8,
    pub scroll_x: u8,
    pub scroll_y: u8,
    pub window_x: u8,
    pub window_y: u8,
    /// LY: current scanline, 0–153.
    pub line: u8,
    /// LYC: compared against LY for STAT bit 2.
    pub line_compare: u8,
    pub mode: Mode,
    /// Cycles accumulated in the current mode (or since the last blank flush with the LCD off).
    pub clock: u32,
    /// Number of frames flushed to a screen.
    pub frame_count: u64,
    /// Colour indices 0–3, row-major 160×144.
    framebuffer: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
    /// Scratch RGB frame handed to the screen on flush.
    rgb: Box<Frame>,
}

impl Ppu {
    /// Create PPU in post-boot state: LCD on, scanline 0, OAM scan.
    pub fn new() -> Self {
        Self {
            vram: [0; VRAM_LEN],
            oam: [0; OAM_LEN],
            lcdc: LCDC_POWER_UP,
            scroll_x: 0,
            scroll_y: 0,
            window_x: 0,
            window_y: 0,
            line: 0,
            line_compare: 0,
            mode: Mode::OamScan,
            clock: 0,
            frame_count: 0,
            framebuffer: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
            rgb: Box::new([SHADES[0]; SCREEN_WIDTH * SCREEN_HEIGHT]),
        }
    }

    pub fn control(&self) -> LcdControl {
        LcdControl(self.lcdc)
    }

    /// Colour-index framebuffer, row-major.
    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    /// Advance by `cycles` CPU cycles, firing every mode transition they cover.
    /// Returns true when this call entered vblank; the frame has then been flushed to `screen`.
    pub fn step(&mut self, cycles: u32, screen: &mut dyn Screen) -> bool {
        self.clock += cycles;

        if !self.control().display_enabled() {
            self.line = 0;
            self.mode = Mode::OamScan;
            if self.clock >= LCD_OFF_FLUSH_CYCLES {
                self.clock -= LCD_OFF_FLUSH_CYCLES;
                self.flush(screen);
            }
            return false;
        }

        let mut entered_vblank = false;
        loop {
            match self.mode {
                Mode::OamScan => {
                    if self.clock < OAM_SCAN_CYCLES {
                        break;
                    }
                    self.clock -= OAM_SCAN_CYCLES;
                    self.mode = Mode::PixelTransfer;
                }
                // End of pixel transfer is treated as the end of the visible line.
                Mode::PixelTransfer => {
                    if self.clock < PIXEL_TRANSFER_CYCLES {
                        break;
                    }
                    self.clock -= PIXEL_TRANSFER_CYCLES;
                    self.mode = Mode::HBlank;
                    self.render_scanline();
                }
                Mode::HBlank => {
                    if self.clock < HBLANK_CYCLES {
                        break;
                    }
                    self.clock -= HBLANK_CYCLES;
                    self.line += 1;
                    if self.line == VBLANK_LINE {
                        self.mode = Mode::VBlank;
                        entered_vblank = true;
                        self.flush(screen);
                    } else {
                        self.mode = Mode::OamScan;
                    }
                }
                Mode::VBlank => {
                    if self.clock < SCANLINE_CYCLES {
                        break;
                    }
                    self.clock -= SCANLINE_CYCLES;
                    self.line += 1;
                    if self.line > LAST_LINE {
                        self.line = 0;
                        self.mode = Mode::OamScan;
                    }
                }
            }
        }
        entered_vblank
    }

    /// Render the current scanline's background into the framebuffer.
    fn render_scanline(&mut self) {
        let lcdc = self.control();
        let row = self.line as usize * SCREEN_WIDTH;
        let pixels = &mut self.framebuffer[row..row + SCREEN_WIDTH];

        if !lcdc.bg_enabled() {
            pixels.fill(0);
            return;
        }

        let map_base = if lcdc.high_bg_map() { 0x1C00 } else { 0x1800 };
        let tile_base = if lcdc.unsigned_tile_data() { 0x0000 } else { 0x0800 };

        // 256×256 background wraps in both directions.
        let bg_y = self.scroll_y.wrapping_add(self.line);
        let tile_row = (bg_y / 8) as usize;
        let fine_y = (bg_y % 8) as usize;

        for (x, pixel) in pixels.iter_mut().enumerate() {
            let bg_x = self.scroll_x.wrapping_add(x as u8);
            let tile_col = (bg_x / 8) as usize;
            let fine_x = bg_x % 8;

            let mut tile = self.vram[map_base + tile_row * 32 + tile_col];
            if !lcdc.unsigned_tile_data() {
                tile ^= 0x80;
            }

            // 16 bytes per tile, 2 bytes (low plane, high plane) per row.
            let addr = tile_base + tile as usize * 16 + fine_y * 2;
            let low = self.vram[addr];
            let high = self.vram[addr + 1];
            let bit = 7 - fine_x;
            *pixel = (((high >> bit) & 1) << 1) | ((low >> bit) & 1);
        }
    }

    /// Resolve colour indices to RGB and hand the frame to the screen.
    fn flush(&mut self, screen: &mut dyn Screen) {
        for (rgb, &index) in self.rgb.iter_mut().zip(self.framebuffer.iter()) {
            *rgb = SHADES[(index & 3) as usize];
        }
        screen.present(&self.rgb);
        self.frame_count += 1;
        debug!("frame {} flushed", self.frame_count);
    }

    /// Read VRAM, OAM, or an LCD register. Unmapped addresses read 0.
    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0x8000..=0x9FFF => self.vram[(addr & 0x1FFF) as usize],
            0xFE00..=0xFE9F => self.oam[(addr - 0xFE00) as usize],
            0xFF40 => self.lcdc,
            0xFF41 => self.read_status(),
            0xFF42 => self.scroll_y,
            0xFF43 => self.scroll_x,
            0xFF44 => self.line,
            0xFF45 => self.line_compare,
            0xFF4A => self.window_y,
            0xFF4B => self.window_x,
            _ => 0,
        }
    }

    /// Write VRAM, OAM, or an LCD register. Writing LY resets it to 0; STAT writes are dropped.
    pub fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x8000..=0x9FFF => self.vram[(addr & 0x1FFF) as usize] = data,
            0xFE00..=0xFE9F => self.oam[(addr - 0xFE00) as usize] = data,
            0xFF40 => self.write_control(data),
            0xFF42 => self.scroll_y = data,
            0xFF43 => self.scroll_x = data,
            0xFF44 => self.line = 0,
            0xFF45 => self.line_compare = data,
            0xFF4A => self.window_y = data,
            0xFF4B => self.window_x = data,
            _ => {}
        }
    }

    /// STAT ($FF41): bit 2 = LY == LYC, bits 0–1 = mode.
    pub fn read_status(&self) -> u8 {
        let coincidence = if self.line == self.line_compare { 0x04 } else { 0 };
        coincidence | self.mode as u8
    }

    /// LCDC ($FF40). Turning the display off blanks the framebuffer and parks the PPU at line 0;
    /// turning it on restarts line timing from zero.
    fn write_control(&mut self, data: u8) {
        let was_on = self.control().display_enabled();
        self.lcdc = data;
        let is_on = self.control().display_enabled();

        if was_on && !is_on {
            self.framebuffer.fill(0);
            self.line = 0;
            self.mode = Mode::OamScan;
            self.clock = 0;
        } else if !was_on && is_on {
            self.clock = 0;
        }
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingScreen {
        frames: usize,
        last_pixel: u32,
    }

    impl Screen for CountingScreen {
        fn present(&mut self, frame: &Frame) {
            self.frames += 1;
            self.last_pixel = frame[0];
        }
    }

    /// Tile 1 at $8010 with every row set in both planes: colour 3 everywhere.
    fn ppu_with_dark_tile_map() -> Ppu {
        let mut ppu = Ppu::new();
        for i in 0..16 {
            ppu.vram[0x10 + i] = 0xFF;
        }
        for i in 0..(32 * 32) {
            ppu.vram[0x1800 + i] = 1;
        }
        ppu
    }

    #[test]
    fn mode_sequence_for_one_scanline() {
        let mut ppu = ppu_with_dark_tile_map();
        let mut screen = CountingScreen::default();
        assert_eq!((ppu.mode, ppu.line), (Mode::OamScan, 0));

        ppu.step(80, &mut screen);
        assert_eq!(ppu.mode, Mode::PixelTransfer);
        ppu.step(172, &mut screen);
        assert_eq!(ppu.mode, Mode::HBlank);
        ppu.step(204, &mut screen);
        assert_eq!((ppu.mode, ppu.line), (Mode::OamScan, 1));

        // Exactly line 0 was rendered.
        assert!(ppu.framebuffer()[..SCREEN_WIDTH].iter().all(|&c| c == 3));
        assert!(ppu.framebuffer()[SCREEN_WIDTH..2 * SCREEN_WIDTH].iter().all(|&c| c == 0));
        assert_eq!(screen.frames, 0);
    }

    #[test]
    fn thresholds_are_not_crossed_early() {
        let mut ppu = Ppu::new();
        let mut screen = CountingScreen::default();
        ppu.step(79, &mut screen);
        assert_eq!(ppu.mode, Mode::OamScan);
        ppu.step(1, &mut screen);
        assert_eq!(ppu.mode, Mode::PixelTransfer);
    }

    #[test]
    fn vblank_entered_after_144_lines() {
        let mut ppu = Ppu::new();
        let mut screen = CountingScreen::default();
        let mut vblanks = 0;
        for _ in 0..144 {
            for cycles in [80, 172, 204] {
                if ppu.step(cycles, &mut screen) {
                    vblanks += 1;
                }
            }
        }
        assert_eq!(vblanks, 1);
        assert_eq!(ppu.mode, Mode::VBlank);
        assert_eq!(ppu.line, 144);
        assert_eq!(screen.frames, 1);
        assert_eq!(screen.last_pixel, SHADES[0]);
    }

    #[test]
    fn full_frame_flushes_once_and_wraps() {
        let mut ppu = ppu_with_dark_tile_map();
        let mut screen = CountingScreen::default();
        for _ in 0..(154 * 456 / 4) {
            ppu.step(4, &mut screen);
        }
        assert_eq!(screen.frames, 1);
        assert_eq!(screen.last_pixel, SHADES[3]);
        assert_eq!(ppu.line, 0);
        assert_eq!(ppu.mode, Mode::OamScan);
        assert_eq!(ppu.clock, 0);
    }

    #[test]
    fn signed_tile_data_biases_index() {
        let mut ppu = Ppu::new();
        ppu.lcdc = 0x81; // tile data at $8800, map at $9800
        // Map entry 0 → biased index 0x80 → tile at $8800 + 0x80*16 = $9000.
        ppu.vram[0x1000] = 0xFF; // low plane only: colour 1
        ppu.render_scanline();
        assert_eq!(ppu.framebuffer()[0], 1);
        assert_eq!(ppu.framebuffer()[8], 1);
    }

    #[test]
    fn scroll_wraps_around_background() {
        let mut ppu = Ppu::new();
        // Tile 1 is dark, placed only in map column 0.
        for i in 0..16 {
            ppu.vram[0x10 + i] = 0xFF;
        }
        ppu.vram[0x1800] = 1;
        ppu.scroll_x = 0xFC;
        ppu.render_scanline();
        let row = &ppu.framebuffer()[..SCREEN_WIDTH];
        assert!(row[..4].iter().all(|&c| c == 0));
        assert!(row[4..12].iter().all(|&c| c == 3));
        assert_eq!(row[12], 0);
    }

    #[test]
    fn disabled_background_paints_lightest() {
        let mut ppu = ppu_with_dark_tile_map();
        ppu.lcdc = 0x90;
        ppu.render_scanline();
        assert!(ppu.framebuffer()[..SCREEN_WIDTH].iter().all(|&c| c == 0));
    }

    #[test]
    fn display_off_parks_at_line_zero_and_flushes_slowly() {
        let mut ppu = ppu_with_dark_tile_map();
        let mut screen = CountingScreen::default();
        for _ in 0..10 {
            ppu.step(456, &mut screen);
        }
        ppu.write(0xFF40, 0x11);
        assert_eq!(ppu.line, 0);
        assert!(ppu.framebuffer().iter().all(|&c| c == 0));

        ppu.step(59_996, &mut screen);
        assert_eq!(screen.frames, 0);
        ppu.step(4, &mut screen);
        assert_eq!(screen.frames, 1);
        assert_eq!((ppu.mode, ppu.line), (Mode::OamScan, 0));
    }

    #[test]
    fn status_reports_mode_and_coincidence() {
        let mut ppu = Ppu::new();
        let mut screen = CountingScreen::default();
        assert_eq!(ppu.read(0xFF41), 0x04 | Mode::OamScan as u8);
        ppu.write(0xFF45, 1);
        ppu.step(80, &mut screen);
        assert_eq!(ppu.read(0xFF41), Mode::PixelTransfer as u8);
        ppu.step(172 + 204, &mut screen);
        assert_eq!(ppu.read(0xFF41), 0x04 | Mode::OamScan as u8);
    }

    #[test]
    fn writing_ly_resets_it() {
        let mut ppu = Ppu::new();
        let mut screen = CountingScreen::default();
        ppu.step(456 * 5, &mut screen);
        assert_eq!(ppu.read(0xFF44), 5);
        ppu.write(0xFF44, 0x77);
        assert_eq!(ppu.read(0xFF44), 0);
    }
}
