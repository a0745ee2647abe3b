//! Read-only memory-mapped data file with circular reads

use crate::error::{Error, Result};
use crate::position::ByteOffset;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Largest data file accepted by the tokenizers (2 GiB - 1)
pub const MAX_DATA_FILE_LEN: u64 = i32::MAX as u64;

pub struct DataFile {
    path: PathBuf,
    mmap: Mmap,
}

impl DataFile {
    /// Map a data file. Empty files and files above [`MAX_DATA_FILE_LEN`] are rejected.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let length = file.metadata()?.len();
        if length == 0 {
            return Err(Error::DataFileEmpty {
                path: path.to_path_buf(),
            });
        }
        if length > MAX_DATA_FILE_LEN {
            return Err(Error::DataFileTooLarge {
                path: path.to_path_buf(),
                length,
                limit: MAX_DATA_FILE_LEN,
            });
        }
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            path: path.to_path_buf(),
            mmap,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Length in bytes (never zero)
    #[inline]
    pub fn len(&self) -> ByteOffset {
        ByteOffset(self.mmap.len() as u64)
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }

    /// Fill `buf` starting at `at`, wrapping past the end of the file as many
    /// times as needed
    pub fn read(&self, at: ByteOffset, buf: &mut [u8]) {
        let data: &[u8] = &self.mmap;
        let mut pos = at.wrap(self.len()).as_usize();
        let mut filled = 0;
        while filled < buf.len() {
            let take = (data.len() - pos).min(buf.len() - filled);
            buf[filled..filled + take].copy_from_slice(&data[pos..pos + take]);
            filled += take;
            pos = (pos + take) % data.len();
        }
    }

    /// Release the mapping
    pub fn close(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_circular_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, b"abcdef").unwrap();
        let data = DataFile::open(&path).unwrap();

        let mut buf = [0u8; 4];
        data.read(ByteOffset(4), &mut buf);
        assert_eq!(&buf, b"efab");

        let mut buf = [0u8; 14];
        data.read(ByteOffset(9), &mut buf);
        assert_eq!(&buf, b"defabcdefabcde");
    }

    #[test]
    fn test_empty_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(
            DataFile::open(&path),
            Err(Error::DataFileEmpty { .. })
        ));
    }
}
