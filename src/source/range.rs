//! Byte-range reads over files

use crate::{Error, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::str::FromStr;

/// A half-open byte range `start..end`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Reject ranges that run backwards or past `len`
    pub fn check(&self, len: usize) -> Result<()> {
        if self.start > self.end || self.end > len {
            return Err(Error::OutOfBounds {
                start: self.start,
                end: self.end,
                len,
            });
        }
        Ok(())
    }
}

/// Parses `start-end`, e.g. `0-2048`
impl FromStr for ByteRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| Error::Config(format!("Failed to parse range: {}", s)))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<usize>()
                .map_err(|e| Error::Config(format!("Failed to parse range {}: {}", s, e)))
        };
        Ok(ByteRange {
            start: parse(start)?,
            end: parse(end)?,
        })
    }
}

/// Read the bytes of `range` from the file at `path`
pub fn read_range(path: impl AsRef<Path>, range: ByteRange) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len() as usize;
    range.check(len)?;

    file.seek(SeekFrom::Start(range.start as u64))?;
    let mut data = vec![0u8; range.len()];
    file.read_exact(&mut data)?;
    Ok(data)
}
