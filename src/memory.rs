use std::{fs, path::Path};

use crate::error::{Error, Result};

pub type TypeAddr = u16;

// 8K program ROM followed by 8K of RAM, the top 7K of which is the frame buffer.
pub const MEMORY_SIZE: usize = 0x4000;
pub const RAM_START: TypeAddr = 0x2000;
pub const RAM_END: TypeAddr = 0x4000;
pub const MIRROR_END: TypeAddr = 0x6000;
pub const MIRROR_OFFSET: TypeAddr = 0x2000;
pub const VIDEO_RAM_START: TypeAddr = 0x2400;
pub const VIDEO_RAM_END: TypeAddr = RAM_END;

pub const ROM_CHUNK_SIZE: usize = 0x800;

/// The four program EPROMs and where they sit in the address space.
pub const ROM_LAYOUT: [(&str, TypeAddr); 4] = [
    ("invaders.h", 0x0000),
    ("invaders.g", 0x0800),
    ("invaders.f", 0x1000),
    ("invaders.e", 0x1800),
];

/// Address decoding for the cabinet's memory map.
///
/// Everything below `RAM_START` is ROM and ignores writes. `[0x4000, 0x6000)`
/// aliases the RAM window, and anything past it is unmapped: reads see zero and
/// writes fall on the floor.
pub struct Memory {
    bytes: Box<[u8; MEMORY_SIZE]>,
}

impl Memory {
    pub fn new() -> Self {
        Self {
            bytes: Box::new([0; MEMORY_SIZE]),
        }
    }

    // TODO: only [0x4000, 0x6000) is known to be exercised by the game; check whether
    // boards decode the mirror any further up before widening it.
    fn decode(addr: TypeAddr) -> Option<usize> {
        if addr < RAM_END {
            Some(addr as usize)
        } else if addr < MIRROR_END {
            Some((addr - MIRROR_OFFSET) as usize)
        } else {
            None
        }
    }

    pub fn get(&self, addr: TypeAddr) -> u8 {
        Self::decode(addr).map_or(0, |i| self.bytes[i])
    }

    pub fn set(&mut self, addr: TypeAddr, val: u8) {
        if let Some(i) = Self::decode(addr) {
            if i >= RAM_START as usize {
                self.bytes[i] = val;
            }
        }
    }

    /// The frame buffer, in ascending address order.
    pub fn video_ram(&self) -> &[u8] {
        &self.bytes[VIDEO_RAM_START as usize..VIDEO_RAM_END as usize]
    }

    /// Copies a program image into ROM. Load time is the only time ROM is writable.
    pub fn load_rom(&mut self, name: &str, start: TypeAddr, bytes: &[u8]) -> Result<()> {
        if bytes.len() > ROM_CHUNK_SIZE {
            return Err(Error::RomTooLarge {
                name: name.to_owned(),
                len: bytes.len(),
            });
        }
        let start = start as usize;
        self.bytes[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Loads all four program images from `dir`.
    pub fn load_roms_from_dir(&mut self, dir: &Path) -> Result<()> {
        for (name, start) in ROM_LAYOUT {
            let path = dir.join(name);
            let program = fs::read(&path).map_err(|source| Error::Io { path, source })?;
            self.load_rom(name, start, &program)?;
            log::info!("loaded {name} ({} bytes) at {start:#06x}", program.len());
        }
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
