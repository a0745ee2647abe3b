//! Variable-length record store
//!
//! Records are appended as `[len: u32 LE][bytes]` and addressed by their
//! append order. The record table is rebuilt by one scan on open; reads go
//! through a memory map that is refreshed after writes.

use crate::error::Result;
use crate::position::ElementOffset;
use memmap2::Mmap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Location of one record's payload within the file
#[derive(Debug, Clone, Copy)]
struct RecordSpan {
    offset: u64,
    len: u32,
}

pub struct RecordStore {
    path: PathBuf,
    writer: BufWriter<File>,
    mmap: Option<Mmap>,
    records: Vec<RecordSpan>,
    end: u64,
    dirty: bool,
}

impl RecordStore {
    /// Open a store, creating the file if it does not exist
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;
        Self::from_file(path, file)
    }

    /// Create an empty store, truncating any existing file
    pub fn create(path: &Path) -> Result<Self> {
        File::create(path)?;
        Self::open(path)
    }

    fn from_file(path: &Path, file: File) -> Result<Self> {
        let byte_len = file.metadata()?.len();
        let mmap = if byte_len == 0 {
            None
        } else {
            Some(unsafe { Mmap::map(&file)? })
        };
        let records = match &mmap {
            Some(mmap) => scan_records(mmap, path)?,
            None => Vec::new(),
        };

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::with_capacity(65536, file),
            mmap,
            records,
            end: byte_len,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> ElementOffset {
        ElementOffset(self.records.len() as u64)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record and return its index
    pub fn append(&mut self, bytes: &[u8]) -> Result<ElementOffset> {
        let len: u32 = bytes.len().try_into().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("record too large: {} bytes", bytes.len()),
            )
        })?;
        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(bytes)?;

        let index = ElementOffset(self.records.len() as u64);
        self.records.push(RecordSpan {
            offset: self.end + 4,
            len,
        });
        self.end += 4 + len as u64;
        self.dirty = true;
        Ok(index)
    }

    /// Get a record by index; `None` for indices never written
    pub fn get(&mut self, index: ElementOffset) -> Result<Option<Vec<u8>>> {
        let Some(span) = self.records.get(index.as_usize()).copied() else {
            return Ok(None);
        };
        self.refresh()?;
        Ok(Some(self.payload(span).to_vec()))
    }

    /// Read every record in index order
    pub fn read_all(&mut self) -> Result<Vec<Vec<u8>>> {
        self.refresh()?;
        Ok(self
            .records
            .iter()
            .map(|&span| self.payload(span).to_vec())
            .collect())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    fn payload(&self, span: RecordSpan) -> &[u8] {
        match &self.mmap {
            Some(mmap) => {
                let start = span.offset as usize;
                &mmap[start..start + span.len as usize]
            }
            None => &[],
        }
    }

    /// Make appended records visible to the read mapping
    fn refresh(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.writer.flush()?;
        self.mmap = None;
        if self.end > 0 {
            self.mmap = Some(unsafe { Mmap::map(self.writer.get_ref())? });
        }
        self.dirty = false;
        Ok(())
    }
}

fn scan_records(data: &[u8], path: &Path) -> Result<Vec<RecordSpan>> {
    let mut records = Vec::new();
    let mut pos = 0usize;
    while pos < data.len() {
        if pos + 4 > data.len() {
            return Err(truncated(path, pos));
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&data[pos..pos + 4]);
        let len = u32::from_le_bytes(len_bytes);
        let start = pos + 4;
        if start + len as usize > data.len() {
            return Err(truncated(path, pos));
        }
        records.push(RecordSpan {
            offset: start as u64,
            len,
        });
        pos = start + len as usize;
    }
    Ok(records)
}

fn truncated(path: &Path, offset: usize) -> crate::error::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!(
            "truncated record at byte {} in {}",
            offset,
            path.display()
        ),
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_append_and_get() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dict.seq");
        let mut store = RecordStore::create(&path).unwrap();

        assert_eq!(store.append(b"hello").unwrap(), ElementOffset(0));
        assert_eq!(store.append(b"").unwrap(), ElementOffset(1));
        assert_eq!(store.append("wörld".as_bytes()).unwrap(), ElementOffset(2));

        assert_eq!(store.get(ElementOffset(0)).unwrap().unwrap(), b"hello");
        assert_eq!(store.get(ElementOffset(1)).unwrap().unwrap(), b"");
        assert_eq!(store.get(ElementOffset(2)).unwrap().unwrap(), "wörld".as_bytes());
        assert!(store.get(ElementOffset(3)).unwrap().is_none());
    }

    #[test]
    fn test_reopen_and_continue() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dict.seq");
        {
            let mut store = RecordStore::create(&path).unwrap();
            store.append(b"a").unwrap();
            store.append(b"bc").unwrap();
            store.close().unwrap();
        }

        let mut store = RecordStore::open(&path).unwrap();
        assert_eq!(store.len(), ElementOffset(2));
        assert_eq!(store.append(b"def").unwrap(), ElementOffset(2));
        let all = store.read_all().unwrap();
        assert_eq!(all, vec![b"a".to_vec(), b"bc".to_vec(), b"def".to_vec()]);
    }

    #[test]
    fn test_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("none.seq");
        let mut store = RecordStore::open(&path).unwrap();
        assert!(store.is_empty());
        assert!(store.read_all().unwrap().is_empty());
        assert!(store.get(ElementOffset(0)).unwrap().is_none());
    }

    #[test]
    fn test_truncated_file_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.seq");
        std::fs::write(&path, [5u8, 0, 0, 0, b'a']).unwrap();
        assert!(RecordStore::open(&path).is_err());
    }
}
