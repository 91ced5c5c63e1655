//! On-disk ZIP records and the errors raised while decoding them.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;
use thiserror::Error;

// == Zip Error ==
/// Failure while decoding an archive.
#[derive(Error, Debug)]
pub enum ZipError {
    #[error("not a ZIP archive: end of central directory record not found")]
    MissingEndOfCentralDirectory,

    #[error("invalid {0} signature")]
    BadSignature(&'static str),

    #[error("archive truncated while reading {0}")]
    Truncated(&'static str),

    #[error("entry {name}: expected {expected} bytes, decoded {actual}")]
    SizeMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },

    #[error("entry {name}: CRC-32 mismatch (stored {expected:08x}, computed {actual:08x})")]
    CrcMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    #[error("entry {name}: {source}")]
    Inflate {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record: {0}")]
    Io(#[from] std::io::Error),
}

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl From<u16> for CompressionMethod {
    fn from(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            other => CompressionMethod::Unknown(other),
        }
    }
}

/// End of Central Directory record (22 bytes plus comment).
#[derive(Debug)]
pub struct EndOfCentralDirectory {
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn parse(data: &[u8]) -> Result<Self, ZipError> {
        if data.len() < Self::SIZE {
            return Err(ZipError::Truncated("end of central directory"));
        }
        if &data[0..4] != Self::SIGNATURE {
            return Err(ZipError::BadSignature("end of central directory"));
        }

        let mut cursor = Cursor::new(&data[4..]);
        let _disk_number = cursor.read_u16::<LittleEndian>()?;
        let _disk_with_cd = cursor.read_u16::<LittleEndian>()?;

        Ok(Self {
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    /// Saturated fields mean the real values live in the ZIP64 record.
    pub fn needs_zip64(&self) -> bool {
        self.disk_entries == u16::MAX
            || self.total_entries == u16::MAX
            || self.cd_size == u32::MAX
            || self.cd_offset == u32::MAX
    }
}

/// ZIP64 End of Central Directory locator (20 bytes), immediately before the EOCD.
pub struct Zip64Locator {
    pub eocd64_offset: u64,
}

impl Zip64Locator {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x07";
    pub const SIZE: usize = 20;

    pub fn parse(data: &[u8]) -> Result<Self, ZipError> {
        if data.len() < Self::SIZE {
            return Err(ZipError::Truncated("ZIP64 locator"));
        }
        if &data[0..4] != Self::SIGNATURE {
            return Err(ZipError::BadSignature("ZIP64 locator"));
        }

        let mut cursor = Cursor::new(&data[4..]);
        let _disk_with_eocd64 = cursor.read_u32::<LittleEndian>()?;

        Ok(Self {
            eocd64_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }
}

/// ZIP64 End of Central Directory record (56 bytes minimum).
pub struct Zip64EndOfCentralDirectory {
    pub total_entries: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
}

impl Zip64EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x06";
    pub const MIN_SIZE: usize = 56;

    pub fn parse(data: &[u8]) -> Result<Self, ZipError> {
        if data.len() < Self::MIN_SIZE {
            return Err(ZipError::Truncated("ZIP64 end of central directory"));
        }
        if &data[0..4] != Self::SIGNATURE {
            return Err(ZipError::BadSignature("ZIP64 end of central directory"));
        }

        // record size, versions, disk numbers and per-disk count
        let mut cursor = Cursor::new(&data[4..]);
        cursor.set_position(8 + 2 + 2 + 4 + 4 + 8);

        Ok(Self {
            total_entries: cursor.read_u64::<LittleEndian>()?,
            cd_size: cursor.read_u64::<LittleEndian>()?,
            cd_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }
}

/// Central Directory File Header
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// General purpose flag bit 0.
pub const FLAG_ENCRYPTED: u16 = 0x0001;

/// Extra field tag carrying 64-bit sizes and offsets.
pub const ZIP64_EXTRA_ID: u16 = 0x0001;

/// One file described by the central directory.
#[derive(Debug, Clone)]
pub struct CentralEntry {
    /// Name exactly as stored (separators untouched)
    pub name: String,
    pub flags: u16,
    pub method: CompressionMethod,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub lfh_offset: u64,
}

impl CentralEntry {
    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/') || self.name.ends_with('\\')
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_method_from_u16() {
        assert_eq!(CompressionMethod::from(0), CompressionMethod::Stored);
        assert_eq!(CompressionMethod::from(8), CompressionMethod::Deflate);
        assert_eq!(CompressionMethod::from(9), CompressionMethod::Unknown(9));
    }

    #[test]
    fn test_eocd_rejects_bad_signature() {
        let data = [0u8; EndOfCentralDirectory::SIZE];
        assert!(matches!(
            EndOfCentralDirectory::parse(&data),
            Err(ZipError::BadSignature(_))
        ));
    }

    #[test]
    fn test_eocd_needs_zip64() {
        let mut data = vec![0u8; EndOfCentralDirectory::SIZE];
        data[0..4].copy_from_slice(EndOfCentralDirectory::SIGNATURE);
        data[10..12].copy_from_slice(&u16::MAX.to_le_bytes());
        let eocd = EndOfCentralDirectory::parse(&data).unwrap();
        assert!(eocd.needs_zip64());
    }

    #[test]
    fn test_directory_detection() {
        let entry = CentralEntry {
            name: "COTA\\Race 1\\".to_string(),
            flags: 0,
            method: CompressionMethod::Stored,
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            lfh_offset: 0,
        };
        assert!(entry.is_directory());
        assert!(!entry.is_encrypted());
    }
}
