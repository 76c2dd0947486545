//! Fixed-size chunking

use crate::{Error, Result};
use std::io::{ErrorKind, Read};

/// Number of chunks a source of `total_size` bytes splits into
pub fn chunk_count(total_size: u64, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    total_size.div_ceil(chunk_size as u64) as usize
}

/// Iterator over fixed-size chunks of a reader
///
/// - Every chunk is exactly `chunk_size` bytes
/// - A short final chunk is zero-padded up to `chunk_size`
/// - A read that yields no bytes ends iteration without emitting a chunk
///
/// The padding is part of the hashed content, so it must not change.
pub struct ChunkReader<R> {
    reader: R,
    chunk_size: usize,
    bytes_read: u64,
    done: bool,
}

impl<R: Read> ChunkReader<R> {
    /// Wrap a reader; `chunk_size` must be non-zero
    pub fn new(reader: R, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("Chunk size must be greater than zero".into()));
        }
        Ok(ChunkReader {
            reader,
            chunk_size,
            bytes_read: 0,
            done: false,
        })
    }

    /// Total bytes pulled from the underlying reader so far (padding excluded)
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Fill `buf` as far as the reader allows, returning the byte count
    fn fill(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut chunk = vec![0u8; self.chunk_size];
        let filled = match self.fill(&mut chunk) {
            Ok(n) => n,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        self.bytes_read += filled as u64;

        if filled < self.chunk_size {
            self.done = true;
        }
        if filled == 0 {
            return None;
        }
        Some(Ok(chunk))
    }
}
