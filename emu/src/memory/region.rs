use serde::{Deserialize, Serialize};

/// A fixed-size byte store behind an address mask.
///
/// Every address is ANDed with the mask before indexing, so reads and
/// writes silently wrap instead of erroring. When the backing buffer is
/// smaller than the mask allows (a short ROM image, say), out-of-range
/// reads return 0 and out-of-range writes are dropped.
#[derive(Clone, Serialize, Deserialize)]
pub struct MemoryRegion {
    data: Vec<u8>,
    original: Option<Vec<u8>>,
    mask: u16,
}

impl MemoryRegion {
    /// A zero-filled region of `size` bytes.
    pub fn new(size: usize, mask: u16) -> Self {
        Self {
            data: vec![0; size],
            original: None,
            mask,
        }
    }

    /// A region initialized from `source`, which `reset` restores.
    pub fn with_data(source: Vec<u8>, mask: u16) -> Self {
        Self {
            data: source.clone(),
            original: Some(source),
            mask,
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        self.data.len()
    }

    pub const fn mask(&self) -> u16 {
        self.mask
    }

    pub fn read_byte(&self, address: u16) -> u8 {
        self.data
            .get(usize::from(address & self.mask))
            .copied()
            .unwrap_or(0)
    }

    pub fn write_byte(&mut self, address: u16, value: u8) {
        let index = usize::from(address & self.mask);
        if let Some(slot) = self.data.get_mut(index) {
            *slot = value;
        }
    }

    /// Little-endian: low byte at `address`, high byte at `address + 1`.
    /// The second byte wraps through the mask, not the region length.
    pub fn read_word(&self, address: u16) -> u16 {
        let low = self.read_byte(address);
        let high = self.read_byte(address.wrapping_add(1));

        u16::from_le_bytes([low, high])
    }

    pub fn write_word(&mut self, address: u16, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.write_byte(address, low);
        self.write_byte(address.wrapping_add(1), high);
    }

    /// Restores the initial contents: the source bytes if the region was
    /// built from some, zeroes otherwise.
    pub fn reset(&mut self) {
        match &self.original {
            Some(original) => self.data.copy_from_slice(original),
            None => self.data.fill(0),
        }
    }
}
