use serde::{Deserialize, Serialize};

use crate::error::HeaderError;

/// The header occupies 0x100-0x14F of the cartridge image.
pub const HEADER_END: usize = 0x150;

/// Memory controller / peripheral combination, byte 0x147.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartridgeType {
    RomOnly,
    Mbc1,
    Mbc1Ram,
    Mbc1RamBattery,
    Mbc2,
    Mbc2Battery,
    RomRam,
    RomRamBattery,
    Mbc3,
    Mbc3Ram,
    Mbc3RamBattery,
    Mbc5,
    Mbc5Ram,
    Mbc5RamBattery,
    Unknown(u8),
}

impl From<u8> for CartridgeType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::RomOnly,
            0x01 => Self::Mbc1,
            0x02 => Self::Mbc1Ram,
            0x03 => Self::Mbc1RamBattery,
            0x05 => Self::Mbc2,
            0x06 => Self::Mbc2Battery,
            0x08 => Self::RomRam,
            0x09 => Self::RomRamBattery,
            0x11 => Self::Mbc3,
            0x12 => Self::Mbc3Ram,
            0x13 => Self::Mbc3RamBattery,
            0x19 => Self::Mbc5,
            0x1A => Self::Mbc5Ram,
            0x1B => Self::Mbc5RamBattery,
            _ => Self::Unknown(value),
        }
    }
}

/// ROM size code, byte 0x148. Each step doubles the previous size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RomSize {
    KiB32,
    KiB64,
    KiB128,
    KiB256,
    KiB512,
    MiB1,
    MiB2,
    MiB4,
    MiB8,
    Unknown(u8),
}

impl From<u8> for RomSize {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::KiB32,
            0x01 => Self::KiB64,
            0x02 => Self::KiB128,
            0x03 => Self::KiB256,
            0x04 => Self::KiB512,
            0x05 => Self::MiB1,
            0x06 => Self::MiB2,
            0x07 => Self::MiB4,
            0x08 => Self::MiB8,
            _ => Self::Unknown(value),
        }
    }
}

/// External RAM size code, byte 0x149.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RamSize {
    None,
    KiB2,
    KiB8,
    KiB32,
    KiB128,
    KiB64,
    Unknown(u8),
}

impl From<u8> for RamSize {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::None,
            0x01 => Self::KiB2,
            0x02 => Self::KiB8,
            0x03 => Self::KiB32,
            0x04 => Self::KiB128,
            0x05 => Self::KiB64,
            _ => Self::Unknown(value),
        }
    }
}

/// Parsed view of the fixed-offset cartridge header fields.
#[derive(Serialize, Deserialize)]
pub struct CartridgeHeader {
    nintendo_logo: Vec<u8>,
    title: String,
    manufacturer_code: Vec<u8>,
    color_flag: u8,
    licensee_code: String,
    super_console_flag: u8,
    cartridge_type: CartridgeType,
    rom_size: RomSize,
    ram_size: RamSize,
    destination: u8,
    version: u8,
    header_checksum: u8,
    global_checksum: u16,
}

impl CartridgeHeader {
    pub fn new(data: &[u8]) -> Result<Self, HeaderError> {
        if data.len() < HEADER_END {
            return Err(HeaderError::TooShort(data.len()));
        }

        let nintendo_logo = data[0x104..=0x133].to_vec();
        let title = into_ascii_str(&data[0x134..=0x143])?;
        let manufacturer_code = data[0x13F..=0x141].to_vec();
        let color_flag = data[0x143];
        let licensee_code = licensee_code(data);
        let super_console_flag = data[0x146];
        let cartridge_type = CartridgeType::from(data[0x147]);
        let rom_size = RomSize::from(data[0x148]);
        let ram_size = RamSize::from(data[0x149]);
        let destination = data[0x14A];
        let version = data[0x14C];
        let header_checksum = data[0x14D];
        let global_checksum = u16::from_be_bytes([data[0x14E], data[0x14F]]);

        Ok(Self {
            nintendo_logo,
            title,
            manufacturer_code,
            color_flag,
            licensee_code,
            super_console_flag,
            cartridge_type,
            rom_size,
            ram_size,
            destination,
            version,
            header_checksum,
            global_checksum,
        })
    }

    /// Compressed bitmap shown by the boot sequence.
    pub fn nintendo_logo(&self) -> &[u8] {
        &self.nintendo_logo
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn manufacturer_code(&self) -> &[u8] {
        &self.manufacturer_code
    }

    /// 0x80 marks color-enhanced, 0xC0 color-only cartridges.
    pub const fn color_flag(&self) -> u8 {
        self.color_flag
    }

    pub fn licensee_code(&self) -> &str {
        self.licensee_code.as_str()
    }

    pub const fn super_console_flag(&self) -> u8 {
        self.super_console_flag
    }

    pub const fn cartridge_type(&self) -> CartridgeType {
        self.cartridge_type
    }

    pub const fn rom_size(&self) -> RomSize {
        self.rom_size
    }

    pub const fn ram_size(&self) -> RamSize {
        self.ram_size
    }

    /// 0x00 for the Japanese market, 0x01 elsewhere.
    pub const fn destination(&self) -> u8 {
        self.destination
    }

    pub const fn version(&self) -> u8 {
        self.version
    }

    pub const fn header_checksum(&self) -> u8 {
        self.header_checksum
    }

    pub const fn global_checksum(&self) -> u16 {
        self.global_checksum
    }
}

/// The legacy one-byte code at 0x14B; the escape value 0x33 means the
/// code is spelled out as two letters derived from 0x144-0x145.
fn licensee_code(data: &[u8]) -> String {
    let legacy = data[0x14B];
    if legacy == 0x33 {
        data[0x144..=0x145]
            .iter()
            .map(|byte| char::from(b'a'.wrapping_add(*byte)))
            .collect()
    } else {
        format!("{legacy:02X}")
    }
}

fn into_ascii_str(data: &[u8]) -> Result<String, HeaderError> {
    let end = data
        .iter()
        .position(|&byte| byte == 0)
        .unwrap_or(data.len());

    let string = String::from_utf8(data[..end].to_vec()).map_err(|_| HeaderError::InvalidTitle)?;
    if !string.chars().all(|chr| chr.is_ascii()) {
        return Err(HeaderError::InvalidTitle);
    }

    Ok(string)
}
