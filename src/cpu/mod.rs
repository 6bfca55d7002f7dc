//! Sharp LR35902 CPU emulation for the Game Boy.
//!
//! See [CPU registers and flags](https://gbdev.io/pandocs/CPU_Registers_and_Flags.html),
//! [instruction set](https://gbdev.io/gb-opcodes/optables/) and
//! [interrupts](https://gbdev.io/pandocs/Interrupts.html).
//! Main and CB-prefixed opcode pages with hardware cycle costs; memory and I/O go through [`Bus`].
//!
//! [`Bus`]: crate::bus::Bus

pub mod cpu;
pub mod flags;
pub mod interrupts;
pub mod registers;
