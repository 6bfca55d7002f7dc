//! Game Boy bank controllers for ROM/RAM mapping.
//!
//! Mbc0 (no controller), Mbc1, Mbc2, the MBC3/MBC5 stub, and the shared bank storage.

use std::fmt;

/// Bank controller family, decoded from header byte $0147.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbcKind {
    None,
    Mbc1,
    Mbc2,
    /// Real-time clock controller. Banking is not implemented.
    Mbc3,
    /// Rumble-capable controller. Banking is not implemented.
    Mbc5,
}

impl fmt::Display for MbcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MbcKind::None => write!(f, "ROM ONLY"),
            MbcKind::Mbc1 => write!(f, "MBC1"),
            MbcKind::Mbc2 => write!(f, "MBC2"),
            MbcKind::Mbc3 => write!(f, "MBC3"),
            MbcKind::Mbc5 => write!(f, "MBC5"),
        }
    }
}

pub mod banks;
pub mod mapper;

pub mod mbc0;
pub mod mbc1;
pub mod mbc2;
pub mod stub;
