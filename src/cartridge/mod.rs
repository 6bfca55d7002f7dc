//! Game Boy cartridge loading and bank controller support.
//!
//! - **cartridge**: Loads raw `.gb` images, decodes the header at $0134–$014F, holds the mapper.
//! - **mapper**: no controller, MBC1, MBC2; MBC3/MBC5 are stubs that never switch banks.

pub mod cartridge;
pub mod mapper;
