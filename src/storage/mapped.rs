//! Memory-mapped fixed-width array file
//!
//! Elements are stored little-endian at `i × WIDTH`; the array length is
//! always `file length / WIDTH`. Growing the array resizes the file and
//! remaps it, new slots read as zero.

use crate::error::{Error, Result};
use crate::position::ElementOffset;
use memmap2::MmapMut;
use std::fs::{File, OpenOptions};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// An element type that can live in a [`MappedArray`]
pub trait FixedWidth: Copy + Default + Send + Sync {
    const WIDTH: usize;

    fn write_le(self, out: &mut [u8]);

    fn read_le(bytes: &[u8]) -> Self;
}

impl FixedWidth for u32 {
    const WIDTH: usize = 4;

    #[inline]
    fn write_le(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(bytes);
        u32::from_le_bytes(buf)
    }
}

impl FixedWidth for u64 {
    const WIDTH: usize = 8;

    #[inline]
    fn write_le(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        u64::from_le_bytes(buf)
    }
}

/// Fixed-width array backed by a read-write memory map
pub struct MappedArray<T: FixedWidth> {
    path: PathBuf,
    file: File,
    /// `None` while the file is empty (zero-length files cannot be mapped)
    mmap: Option<MmapMut>,
    len: u64,
    _marker: PhantomData<T>,
}

/// Array of 8-byte token positions (the index layout)
pub type PositionArray = MappedArray<u64>;

/// Array of 4-byte codes (the compressed layout)
pub type CodeArray = MappedArray<u32>;

impl<T: FixedWidth> MappedArray<T> {
    /// Create (or truncate) an empty array file
    pub fn create(path: &Path) -> Result<Self> {
        Self::create_with_len(path, ElementOffset::ZERO)
    }

    /// Create (or truncate) an array file holding `len` zeroed elements
    pub fn create_with_len(path: &Path, len: ElementOffset) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let mut array = Self {
            path: path.to_path_buf(),
            file,
            mmap: None,
            len: 0,
            _marker: PhantomData,
        };
        array.resize(len.get())?;
        Ok(array)
    }

    /// Open an existing array file; trailing bytes short of one element are ignored
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let byte_len = file.metadata()?.len();
        let len = byte_len / T::WIDTH as u64;
        let mmap = if byte_len == 0 {
            None
        } else {
            Some(unsafe { MmapMut::map_mut(&file)? })
        };
        Ok(Self {
            path: path.to_path_buf(),
            file,
            mmap,
            len,
            _marker: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn len(&self) -> ElementOffset {
        ElementOffset(self.len)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn slot(&self, index: ElementOffset) -> Result<usize> {
        if index.get() >= self.len {
            return Err(Error::IndexOutOfRange {
                index: index.get(),
                length: self.len,
            });
        }
        Ok(index.as_usize() * T::WIDTH)
    }

    pub fn get(&self, index: ElementOffset) -> Result<T> {
        let offset = self.slot(index)?;
        // A non-empty length implies a mapping
        let mmap = self.mmap.as_ref().ok_or(Error::IndexOutOfRange {
            index: index.get(),
            length: 0,
        })?;
        Ok(T::read_le(&mmap[offset..offset + T::WIDTH]))
    }

    pub fn set(&mut self, index: ElementOffset, value: T) -> Result<()> {
        let offset = self.slot(index)?;
        let mmap = self.mmap.as_mut().ok_or(Error::IndexOutOfRange {
            index: index.get(),
            length: 0,
        })?;
        value.write_le(&mut mmap[offset..offset + T::WIDTH]);
        Ok(())
    }

    /// Grow the array by one element holding `value`
    pub fn append(&mut self, value: T) -> Result<()> {
        let index = ElementOffset(self.len);
        self.resize(self.len + 1)?;
        self.set(index, value)
    }

    /// Grow the array to at least `len` elements; new slots are zero
    pub fn allocate(&mut self, len: ElementOffset) -> Result<()> {
        if len.get() <= self.len {
            return Ok(());
        }
        self.resize(len.get())
    }

    /// Overwrite every element with `value`
    pub fn fill(&mut self, value: T) -> Result<()> {
        if let Some(mmap) = self.mmap.as_mut() {
            for chunk in mmap.chunks_exact_mut(T::WIDTH) {
                value.write_le(chunk);
            }
        }
        Ok(())
    }

    /// Read every element into memory
    pub fn to_vec(&self) -> Vec<T> {
        match &self.mmap {
            Some(mmap) => mmap
                .chunks_exact(T::WIDTH)
                .take(self.len as usize)
                .map(T::read_le)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn flush(&self) -> Result<()> {
        if let Some(mmap) = &self.mmap {
            mmap.flush()?;
        }
        Ok(())
    }

    /// Flush and release the mapping
    pub fn close(self) -> Result<()> {
        self.flush()
    }

    fn resize(&mut self, len: u64) -> Result<()> {
        let byte_len = len.checked_mul(T::WIDTH as u64).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("array size overflow: {} elements", len),
            )
        })?;

        // Drop the old mapping before changing the file size
        if let Some(mmap) = self.mmap.take() {
            mmap.flush()?;
        }
        self.file.set_len(byte_len)?;
        if byte_len > 0 {
            self.mmap = Some(unsafe { MmapMut::map_mut(&self.file)? });
        }
        self.len = len;
        Ok(())
    }
}
