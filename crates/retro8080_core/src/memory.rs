use crate::error::LoadError;

/// Total addressable memory size (64 KiB).
pub const MEMORY_SIZE: usize = 0x10000;

/// Flat 64 KiB address space shared by code, data, stack and video RAM.
///
/// Addresses are `u16`, so every access is in range; multi-byte accesses
/// wrap around at the top of memory like the real address bus.
#[derive(Clone)]
pub struct Memory {
    bytes: Box<[u8]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            bytes: vec![0; MEMORY_SIZE].into_boxed_slice(),
        }
    }
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    #[inline]
    pub fn write(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize] = value;
    }

    /// Little-endian 16-bit read (low byte at `addr`).
    pub fn read_word(&self, addr: u16) -> u16 {
        u16::from_le_bytes([self.read(addr), self.read(addr.wrapping_add(1))])
    }

    /// Little-endian 16-bit write (low byte at `addr`).
    pub fn write_word(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(addr, lo);
        self.write(addr.wrapping_add(1), hi);
    }

    /// Copy a program image into memory starting at `base`.
    ///
    /// The image must fit below the top of the address space; nothing is
    /// written when it does not.
    pub fn load(&mut self, base: u16, image: &[u8]) -> Result<(), LoadError> {
        let start = base as usize;
        let end = start
            .checked_add(image.len())
            .filter(|&end| end <= MEMORY_SIZE)
            .ok_or(LoadError::OutOfRange {
                base,
                len: image.len(),
            })?;
        self.bytes[start..end].copy_from_slice(image);
        Ok(())
    }

    /// Borrow `len` bytes starting at `start`.
    ///
    /// # Panics
    ///
    /// Panics if the window leaves the address space.
    pub fn slice(&self, start: u16, len: usize) -> &[u8] {
        let start = start as usize;
        &self.bytes[start..start + len]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}
