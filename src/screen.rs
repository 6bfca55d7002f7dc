//! Display sink for finished frames.
//!
//! The PPU owns the colour-index framebuffer and the index → RGB mapping; a
//! `Screen` only receives the resolved frame for the duration of one flush.

/// LCD width in pixels.
pub const SCREEN_WIDTH: usize = 160;
/// LCD height in pixels.
pub const SCREEN_HEIGHT: usize = 144;

/// One frame: 160×144 pixels, row-major, 0x00RRGGBB per pixel.
pub type Frame = [u32; SCREEN_WIDTH * SCREEN_HEIGHT];

/// Receives a full frame once per vblank (or at the slow cadence while the LCD is off).
pub trait Screen {
    fn present(&mut self, frame: &Frame);
}

/// Sink that drops every frame.
#[derive(Default)]
pub struct NullScreen;

impl Screen for NullScreen {
    fn present(&mut self, _frame: &Frame) {}
}
