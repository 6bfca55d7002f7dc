//! LR35902 flag register (F) bits. The low nibble always reads 0.

pub const FLAG_ZERO: u8 = 1 << 7;
pub const FLAG_SUBTRACT: u8 = 1 << 6;
pub const FLAG_HALF_CARRY: u8 = 1 << 5;
pub const FLAG_CARRY: u8 = 1 << 4;
