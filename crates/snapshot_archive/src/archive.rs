//! The archive seam: ordered primitive and byte-payload I/O.
//!
//! Snapshot operations never touch a concrete stream type; they speak to
//! [`ArchiveWrite`] and [`ArchiveRead`]. Both contracts are strictly
//! sequential — values come back exactly in the order they were written,
//! and no random access is required of the backing stream.
//!
//! [`BinaryWriter`] and [`BinaryReader`] are the stock little-endian
//! implementations over any `std::io` stream.

use std::io::{Read, Write};

use crate::error::ArchiveError;

/// Sanity limit on a single byte payload. A length prefix above this is
/// treated as stream corruption rather than honoured with an allocation.
pub const MAX_PAYLOAD_LEN: usize = 256 * 1024 * 1024;

/// Ordered write access to a self-delimiting binary stream.
pub trait ArchiveWrite {
    /// Append a `u16`.
    fn write_u16(&mut self, value: u16) -> Result<(), ArchiveError>;

    /// Append a `u32`.
    fn write_u32(&mut self, value: u32) -> Result<(), ArchiveError>;

    /// Append a `u64`.
    fn write_u64(&mut self, value: u64) -> Result<(), ArchiveError>;

    /// Append raw bytes, without any framing of their own.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ArchiveError>;
}

/// Ordered read access to a stream previously produced through
/// [`ArchiveWrite`].
pub trait ArchiveRead {
    /// Read the next `u16`.
    fn read_u16(&mut self) -> Result<u16, ArchiveError>;

    /// Read the next `u32`.
    fn read_u32(&mut self) -> Result<u32, ArchiveError>;

    /// Read the next `u64`.
    fn read_u64(&mut self) -> Result<u64, ArchiveError>;

    /// Read exactly `count` bytes.
    fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, ArchiveError>;

    /// Read and discard exactly `count` bytes.
    fn skip_bytes(&mut self, count: usize) -> Result<(), ArchiveError> {
        self.read_bytes(count).map(|_| ())
    }
}

/// Little-endian archive writer over any [`std::io::Write`] stream.
#[derive(Debug)]
pub struct BinaryWriter<W: Write> {
    inner: W,
}

impl<W: Write> BinaryWriter<W> {
    /// Wrap a stream.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl BinaryWriter<Vec<u8>> {
    /// Create a writer backed by a fresh in-memory buffer.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Vec::new())
    }
}

impl<W: Write> ArchiveWrite for BinaryWriter<W> {
    fn write_u16(&mut self, value: u16) -> Result<(), ArchiveError> {
        Ok(self.inner.write_all(&value.to_le_bytes())?)
    }

    fn write_u32(&mut self, value: u32) -> Result<(), ArchiveError> {
        Ok(self.inner.write_all(&value.to_le_bytes())?)
    }

    fn write_u64(&mut self, value: u64) -> Result<(), ArchiveError> {
        Ok(self.inner.write_all(&value.to_le_bytes())?)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ArchiveError> {
        Ok(self.inner.write_all(bytes)?)
    }
}

/// Little-endian archive reader over any [`std::io::Read`] stream.
#[derive(Debug)]
pub struct BinaryReader<R: Read> {
    inner: R,
}

impl<R: Read> BinaryReader<R> {
    /// Wrap a stream.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), ArchiveError> {
        self.inner.read_exact(buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ArchiveError::UnexpectedEof { needed: buf.len() }
            } else {
                ArchiveError::Io(e)
            }
        })
    }
}

impl<'a> BinaryReader<&'a [u8]> {
    /// Create a reader over an in-memory buffer.
    #[must_use]
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl<R: Read> ArchiveRead for BinaryReader<R> {
    fn read_u16(&mut self) -> Result<u16, ArchiveError> {
        let mut buf = [0u8; 2];
        self.fill(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_u32(&mut self) -> Result<u32, ArchiveError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u64(&mut self) -> Result<u64, ArchiveError> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, ArchiveError> {
        if count > MAX_PAYLOAD_LEN {
            return Err(ArchiveError::PayloadTooLarge {
                length: count,
                limit: MAX_PAYLOAD_LEN,
            });
        }
        let mut buf = vec![0u8; count];
        self.fill(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_roundtrip() {
        let mut writer = BinaryWriter::in_memory();
        writer.write_u16(0xBEEF).unwrap();
        writer.write_u32(7).unwrap();
        writer.write_u64(u64::MAX).unwrap();
        let buf = writer.into_inner();

        let mut reader = BinaryReader::from_slice(&buf);
        assert_eq!(reader.read_u16().unwrap(), 0xBEEF);
        assert_eq!(reader.read_u32().unwrap(), 7);
        assert_eq!(reader.read_u64().unwrap(), u64::MAX);
    }

    #[test]
    fn test_bytes_roundtrip() {
        let mut writer = BinaryWriter::in_memory();
        writer.write_bytes(b"payload").unwrap();
        let buf = writer.into_inner();

        let mut reader = BinaryReader::from_slice(&buf);
        assert_eq!(reader.read_bytes(7).unwrap(), b"payload");
    }

    #[test]
    fn test_little_endian_layout() {
        let mut writer = BinaryWriter::in_memory();
        writer.write_u32(0x0102_0304).unwrap();
        assert_eq!(writer.into_inner(), vec![0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_short_read_is_eof() {
        let mut reader = BinaryReader::from_slice(&[0x01, 0x02]);
        assert!(matches!(
            reader.read_u32(),
            Err(ArchiveError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_oversized_request_rejected() {
        let mut reader = BinaryReader::from_slice(&[]);
        assert!(matches!(
            reader.read_bytes(MAX_PAYLOAD_LEN + 1),
            Err(ArchiveError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_skip_bytes_advances() {
        let mut writer = BinaryWriter::in_memory();
        writer.write_bytes(&[9, 9, 9]).unwrap();
        writer.write_u32(5).unwrap();
        let buf = writer.into_inner();

        let mut reader = BinaryReader::from_slice(&buf);
        reader.skip_bytes(3).unwrap();
        assert_eq!(reader.read_u32().unwrap(), 5);
    }
}
