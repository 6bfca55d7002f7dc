//! Game Boy cartridge loading from raw ROM images (.gb files).
//!
//! Implements the [cartridge header](https://gbdev.io/pandocs/The_Cartridge_Header.html):
//! title at $0134–$0143, controller type at $0147, RAM size code at $0149. The
//! [bank controller](https://gbdev.io/pandocs/MBCs.html) chosen from $0147 translates CPU
//! addresses in $0000–$7FFF and $A000–$BFFF to offsets in the image and external RAM.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{info, warn};

use crate::cartridge::mapper::MbcKind;
use crate::cartridge::mapper::mapper::Mapper;
use crate::cartridge::mapper::mbc0::Mbc0;
use crate::cartridge::mapper::mbc1::Mbc1;
use crate::cartridge::mapper::mbc2::Mbc2;
use crate::cartridge::mapper::stub::Stub;

const TITLE_START: usize = 0x0134;
const TITLE_END: usize = 0x0144;
const TYPE_OFFSET: usize = 0x0147;
const RAM_SIZE_OFFSET: usize = 0x0149;
/// The header ends at $014F; anything shorter cannot be decoded.
const HEADER_END: usize = 0x0150;

/// Decoded cartridge header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    pub type_code: u8,
    pub kind: MbcKind,
    pub ram: bool,
    pub battery: bool,
    pub timer: bool,
    pub rumble: bool,
    /// External RAM size in bytes, from the $0149 code.
    pub ram_size: usize,
}

impl Header {
    /// Decode the header of a full image. Caller guarantees `data.len() >= 0x150`.
    fn parse(data: &[u8]) -> Self {
        let type_code = data[TYPE_OFFSET];
        let (kind, ram, battery, timer, rumble) = match type_code {
            0x00 => (MbcKind::None, false, false, false, false),
            0x01 => (MbcKind::Mbc1, false, false, false, false),
            0x02 => (MbcKind::Mbc1, true, false, false, false),
            0x03 => (MbcKind::Mbc1, true, true, false, false),
            0x05 => (MbcKind::Mbc2, false, false, false, false),
            0x06 => (MbcKind::Mbc2, false, true, false, false),
            0x08 => (MbcKind::None, true, false, false, false),
            0x09 => (MbcKind::None, true, true, false, false),
            0x0F => (MbcKind::Mbc3, false, true, true, false),
            0x10 => (MbcKind::Mbc3, true, true, true, false),
            0x11 => (MbcKind::Mbc3, false, false, false, false),
            0x12 => (MbcKind::Mbc3, true, false, false, false),
            0x13 => (MbcKind::Mbc3, true, true, false, false),
            0x19 => (MbcKind::Mbc5, false, false, false, false),
            0x1A => (MbcKind::Mbc5, true, false, false, false),
            0x1B => (MbcKind::Mbc5, true, true, false, false),
            0x1C => (MbcKind::Mbc5, false, false, false, true),
            0x1D => (MbcKind::Mbc5, true, false, false, true),
            0x1E => (MbcKind::Mbc5, true, true, false, true),
            other => {
                warn!("unknown cartridge type ${:02X}, mapping as ROM ONLY", other);
                (MbcKind::None, false, false, false, false)
            }
        };

        Self {
            title: parse_title(&data[TITLE_START..TITLE_END]),
            type_code,
            kind,
            ram,
            battery,
            timer,
            rumble,
            ram_size: ram_size_from_code(data[RAM_SIZE_OFFSET]),
        }
    }

    /// Number of 8 KiB external RAM banks (a 2 KiB chip still counts as one bank).
    pub fn ram_banks(&self) -> usize {
        self.ram_size.div_ceil(0x2000)
    }
}

/// $0149 RAM size code → bytes. Unknown codes mean no RAM.
pub fn ram_size_from_code(code: u8) -> usize {
    match code {
        0 => 0,
        1 => 2 * 1024,
        2 => 8 * 1024,
        3 => 32 * 1024,
        4 => 128 * 1024,
        _ => 0,
    }
}

/// Space/NUL padded ASCII title.
fn parse_title(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    raw[..end]
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Why an image could not be turned into a cartridge.
#[derive(Debug)]
pub enum CartridgeError {
    Io(std::io::Error),
    /// Image ends before the header does.
    TooShort(usize),
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartridgeError::Io(e) => write!(f, "Failed to read ROM: {}", e),
            CartridgeError::TooShort(len) => {
                write!(f, "ROM image is {} bytes, shorter than its header", len)
            }
        }
    }
}

impl std::error::Error for CartridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CartridgeError::Io(e) => Some(e),
            CartridgeError::TooShort(_) => None,
        }
    }
}

impl From<std::io::Error> for CartridgeError {
    fn from(e: std::io::Error) -> Self {
        CartridgeError::Io(e)
    }
}

/// Cartridge: header plus the mapper that owns ROM, external RAM, and banking state.
/// An unloaded cartridge answers every read with 0 and ignores writes.
pub struct Cartridge {
    header: Option<Header>,
    mapper: Option<Box<dyn Mapper>>,
}

impl Cartridge {
    /// A cartridge slot with nothing inserted.
    pub fn unloaded() -> Self {
        Self {
            header: None,
            mapper: None,
        }
    }

    /// Load from a file. An unreadable or truncated image leaves the cartridge unloaded.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::open(path) {
            Ok(cart) => cart,
            Err(e) => {
                warn!("{}: {}; cartridge left unloaded", path.display(), e);
                Self::unloaded()
            }
        }
    }

    /// Load from a file, reporting why it failed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CartridgeError> {
        let mut file = File::open(path.as_ref())?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Build from an in-memory image. Header byte $0147 picks the controller, $0149 the RAM size.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_END {
            return Err(CartridgeError::TooShort(data.len()));
        }

        let header = Header::parse(&data);
        info!(
            "rom \"{}\" loaded ({} bytes): {} [ram {}] [batt {}] [timer {}] [rumble {}]",
            header.title,
            data.len(),
            header.kind,
            header.ram,
            header.battery,
            header.timer,
            header.rumble
        );
        info!(
            "eram {} bank(s) ({} bytes)",
            header.ram_banks(),
            header.ram_size
        );

        let ram_size = header.ram_size;
        let mapper: Box<dyn Mapper> = match header.kind {
            MbcKind::None => Box::new(Mbc0::new(data, ram_size)),
            MbcKind::Mbc1 => Box::new(Mbc1::new(data, ram_size)),
            MbcKind::Mbc2 => Box::new(Mbc2::new(data, ram_size)),
            kind @ (MbcKind::Mbc3 | MbcKind::Mbc5) => Box::new(Stub::new(kind, data, ram_size)),
        };

        Ok(Self {
            header: Some(header),
            mapper: Some(mapper),
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.mapper.is_some()
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// Read: ROM ($0000–$7FFF) or external RAM ($A000–$BFFF). 0 when unloaded or out of range.
    pub fn read(&self, addr: u16) -> u8 {
        match (&self.mapper, addr) {
            (Some(mapper), 0x0000..=0x7FFF | 0xA000..=0xBFFF) => mapper.read(addr),
            _ => 0,
        }
    }

    /// Write: bank registers (ROM window) or external RAM. Ignored when unloaded.
    pub fn write(&mut self, addr: u16, data: u8) {
        if let (Some(mapper), 0x0000..=0x7FFF | 0xA000..=0xBFFF) = (&mut self.mapper, addr) {
            mapper.write(addr, data);
        }
    }

    /// ROM bank mapped at $4000–$7FFF (1 after load; 0 when unloaded).
    pub fn rom_bank(&self) -> usize {
        self.mapper.as_ref().map_or(0, |m| m.rom_bank())
    }

    /// External RAM bank mapped at $A000–$BFFF.
    pub fn ram_bank(&self) -> usize {
        self.mapper.as_ref().map_or(0, |m| m.ram_bank())
    }
}

impl Default for Cartridge {
    fn default() -> Self {
        Self::unloaded()
    }
}
