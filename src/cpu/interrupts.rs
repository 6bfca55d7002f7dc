//! Interrupt sources, their priority, and their dispatch vectors.
//!
//! Bit `n` of IF ($FF0F) and IE ($FFFF) belongs to the source with vector `$40 + 8n`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    VBlank = 0,
    LcdStat = 1,
    Timer = 2,
    Serial = 3,
    Joypad = 4,
}

impl Interrupt {
    /// Highest priority first.
    pub const PRIORITY: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::LcdStat,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    pub fn mask(self) -> u8 {
        1 << (self as u8)
    }

    pub fn vector(self) -> u16 {
        0x40 + 8 * (self as u16)
    }

    /// Highest-priority source whose bit is set in `pending` (IF & IE).
    pub fn highest(pending: u8) -> Option<Interrupt> {
        Self::PRIORITY
            .into_iter()
            .find(|interrupt| pending & interrupt.mask() != 0)
    }
}
