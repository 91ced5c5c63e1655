//! Archive extraction.
//!
//! The whole archive is already in memory, so parsing works directly on a
//! byte slice:
//! 1. Find the End of Central Directory (EOCD) at the tail
//! 2. Follow the ZIP64 records when the EOCD fields are saturated
//! 3. Walk the Central Directory for every entry's metadata
//! 4. For each selected entry, skip its Local File Header and decode the data

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::{read::DeflateDecoder, Crc};
use std::io::{Cursor, Read};
use std::sync::Arc;
use tracing::warn;

use super::structures::*;

/// Maximum ZIP comment length; bounds the backwards EOCD scan.
const MAX_COMMENT_SIZE: usize = 65535;

/// Upper bound on buffer pre-allocation driven by header-declared sizes.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// Suffix of the entries the service serves.
const TABULAR_SUFFIX: &str = ".csv";

// == Archive Entry ==
/// One decoded tabular file.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Path exactly as stored in the archive
    pub original_path: String,
    /// Path with every backslash replaced by a forward slash
    pub normalized_path: String,
    /// UTF-8 decoded content
    pub content: Arc<str>,
}

/// Listing information for any non-directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFileInfo {
    pub name: String,
    pub size: u64,
    pub is_csv: bool,
}

// == Extracted Archive ==
/// Everything pulled out of one archive in a single pass.
#[derive(Debug, Default)]
pub struct ExtractedArchive {
    /// Decoded CSV entries
    pub entries: Vec<ArchiveEntry>,
    /// All non-directory files, in central directory order
    pub files: Vec<ArchiveFileInfo>,
    /// CSV entries left out because they are encrypted or use an unsupported method
    pub skipped: usize,
    /// Size of the raw archive in bytes
    pub archive_size: u64,
}

/// Returns true for names with a `.csv` suffix in any letter case.
pub fn is_tabular(name: &str) -> bool {
    name.len() >= TABULAR_SUFFIX.len()
        && name.as_bytes()[name.len() - TABULAR_SUFFIX.len()..]
            .eq_ignore_ascii_case(TABULAR_SUFFIX.as_bytes())
}

/// Replaces every backslash with a forward slash.
pub fn normalize_path(name: &str) -> String {
    name.replace('\\', "/")
}

/// Parses `bytes` and decodes every CSV entry.
///
/// Fails as a whole on any structural problem; nothing partial is returned.
pub fn extract(bytes: &[u8]) -> Result<ExtractedArchive, ZipError> {
    let reader = ZipReader::new(bytes);
    let central = reader.central_directory()?;

    let mut archive = ExtractedArchive {
        archive_size: bytes.len() as u64,
        ..Default::default()
    };

    for entry in &central {
        if entry.is_directory() {
            continue;
        }

        let is_csv = is_tabular(&entry.name);
        archive.files.push(ArchiveFileInfo {
            name: entry.name.clone(),
            size: entry.uncompressed_size,
            is_csv,
        });

        if !is_csv {
            continue;
        }

        if entry.is_encrypted() {
            warn!(entry = %entry.name, "Skipping encrypted entry");
            archive.skipped += 1;
            continue;
        }
        if let CompressionMethod::Unknown(method) = entry.method {
            warn!(entry = %entry.name, method, "Skipping entry with unsupported compression");
            archive.skipped += 1;
            continue;
        }

        let data = reader.read_entry(entry)?;
        let content = match String::from_utf8(data) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        };

        archive.entries.push(ArchiveEntry {
            normalized_path: normalize_path(&entry.name),
            original_path: entry.name.clone(),
            content: Arc::from(content),
        });
    }

    Ok(archive)
}

// == Zip Reader ==
/// Random-access view over an in-memory archive.
pub struct ZipReader<'a> {
    data: &'a [u8],
}

impl<'a> ZipReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn slice(&self, offset: u64, len: u64, what: &'static str) -> Result<&'a [u8], ZipError> {
        let start = usize::try_from(offset).map_err(|_| ZipError::Truncated(what))?;
        let len = usize::try_from(len).map_err(|_| ZipError::Truncated(what))?;
        let end = start.checked_add(len).ok_or(ZipError::Truncated(what))?;
        self.data.get(start..end).ok_or(ZipError::Truncated(what))
    }

    /// Finds the EOCD, returning it with its offset.
    ///
    /// Tries the comment-less position first, then scans backwards through
    /// the largest possible comment.
    pub fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64), ZipError> {
        let size = self.data.len();
        if size < EndOfCentralDirectory::SIZE {
            return Err(ZipError::MissingEndOfCentralDirectory);
        }

        let tail = size - EndOfCentralDirectory::SIZE;
        let buf = &self.data[tail..];
        if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && buf[20..22] == [0, 0] {
            return Ok((EndOfCentralDirectory::parse(buf)?, tail as u64));
        }

        let search_start = size.saturating_sub(MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE);
        for i in (search_start..=tail).rev() {
            if &self.data[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
                continue;
            }
            // Accept only if the comment length reaches exactly to the end.
            let comment_len = u16::from_le_bytes([self.data[i + 20], self.data[i + 21]]) as usize;
            if comment_len == size - i - EndOfCentralDirectory::SIZE {
                let eocd = EndOfCentralDirectory::parse(&self.data[i..])?;
                return Ok((eocd, i as u64));
            }
        }

        Err(ZipError::MissingEndOfCentralDirectory)
    }

    fn read_zip64_eocd(&self, eocd_offset: u64) -> Result<Zip64EndOfCentralDirectory, ZipError> {
        let locator_offset = eocd_offset
            .checked_sub(Zip64Locator::SIZE as u64)
            .ok_or(ZipError::Truncated("ZIP64 locator"))?;
        let locator = Zip64Locator::parse(self.slice(
            locator_offset,
            Zip64Locator::SIZE as u64,
            "ZIP64 locator",
        )?)?;

        Zip64EndOfCentralDirectory::parse(self.slice(
            locator.eocd64_offset,
            Zip64EndOfCentralDirectory::MIN_SIZE as u64,
            "ZIP64 end of central directory",
        )?)
    }

    /// Lists every entry described by the central directory.
    pub fn central_directory(&self) -> Result<Vec<CentralEntry>, ZipError> {
        let (eocd, eocd_offset) = self.find_eocd()?;

        let (cd_offset, cd_size, total_entries) = if eocd.needs_zip64() {
            let eocd64 = self.read_zip64_eocd(eocd_offset)?;
            (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries)
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
            )
        };

        let cd = self.slice(cd_offset, cd_size, "central directory")?;
        let capacity = total_entries.min(cd_size / CDFH_MIN_SIZE as u64) as usize;
        let mut entries = Vec::with_capacity(capacity);
        let mut cursor = Cursor::new(cd);

        for _ in 0..total_entries {
            entries.push(parse_central_header(&mut cursor)?);
        }

        Ok(entries)
    }

    /// Offset of the entry's data, past its Local File Header.
    fn data_offset(&self, entry: &CentralEntry) -> Result<u64, ZipError> {
        let lfh = self.slice(entry.lfh_offset, LFH_SIZE as u64, "local file header")?;
        if &lfh[0..4] != LFH_SIGNATURE {
            return Err(ZipError::BadSignature("local file header"));
        }

        let mut cursor = Cursor::new(lfh);
        cursor.set_position(26);
        let name_len = cursor.read_u16::<LittleEndian>()? as u64;
        let extra_len = cursor.read_u16::<LittleEndian>()? as u64;

        Ok(entry.lfh_offset + LFH_SIZE as u64 + name_len + extra_len)
    }

    /// Decodes one entry, verifying its size and CRC-32.
    pub fn read_entry(&self, entry: &CentralEntry) -> Result<Vec<u8>, ZipError> {
        let offset = self.data_offset(entry)?;
        let raw = self.slice(offset, entry.compressed_size, "entry data")?;

        let data = match entry.method {
            CompressionMethod::Stored => raw.to_vec(),
            CompressionMethod::Deflate => {
                let mut out = Vec::with_capacity(entry.uncompressed_size.min(MAX_PREALLOC) as usize);
                // One byte past the declared size is enough to detect overruns.
                DeflateDecoder::new(raw)
                    .take(entry.uncompressed_size.saturating_add(1))
                    .read_to_end(&mut out)
                    .map_err(|source| ZipError::Inflate {
                        name: entry.name.clone(),
                        source,
                    })?;
                out
            }
            CompressionMethod::Unknown(_) => {
                return Err(ZipError::Inflate {
                    name: entry.name.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::Unsupported,
                        "unsupported compression method",
                    ),
                })
            }
        };

        if data.len() as u64 != entry.uncompressed_size {
            return Err(ZipError::SizeMismatch {
                name: entry.name.clone(),
                expected: entry.uncompressed_size,
                actual: data.len() as u64,
            });
        }

        let mut crc = Crc::new();
        crc.update(&data);
        if crc.sum() != entry.crc32 {
            return Err(ZipError::CrcMismatch {
                name: entry.name.clone(),
                expected: entry.crc32,
                actual: crc.sum(),
            });
        }

        Ok(data)
    }
}

fn parse_central_header(cursor: &mut Cursor<&[u8]>) -> Result<CentralEntry, ZipError> {
    let mut sig = [0u8; 4];
    cursor
        .read_exact(&mut sig)
        .map_err(|_| ZipError::Truncated("central directory"))?;
    if sig != CDFH_SIGNATURE {
        return Err(ZipError::BadSignature("central directory file header"));
    }

    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let flags = cursor.read_u16::<LittleEndian>()?;
    let method = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let mut compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let mut uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let name_len = cursor.read_u16::<LittleEndian>()? as usize;
    let extra_len = cursor.read_u16::<LittleEndian>()? as u64;
    let comment_len = cursor.read_u16::<LittleEndian>()? as u64;
    let _disk_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let mut lfh_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let mut name_bytes = vec![0u8; name_len];
    cursor
        .read_exact(&mut name_bytes)
        .map_err(|_| ZipError::Truncated("entry name"))?;
    let name = String::from_utf8_lossy(&name_bytes).into_owned();

    let extra_end = cursor.position() + extra_len;
    while cursor.position() + 4 <= extra_end {
        let header_id = cursor.read_u16::<LittleEndian>()?;
        let field_size = cursor.read_u16::<LittleEndian>()? as u64;
        let field_end = cursor.position() + field_size;

        if header_id == ZIP64_EXTRA_ID {
            // Present only for the header fields that are saturated, in this order.
            if uncompressed_size == u32::MAX as u64 && cursor.position() + 8 <= field_end {
                uncompressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if compressed_size == u32::MAX as u64 && cursor.position() + 8 <= field_end {
                compressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if lfh_offset == u32::MAX as u64 && cursor.position() + 8 <= field_end {
                lfh_offset = cursor.read_u64::<LittleEndian>()?;
            }
        }
        cursor.set_position(field_end);
    }

    let next = extra_end + comment_len;
    if next > cursor.get_ref().len() as u64 {
        return Err(ZipError::Truncated("central directory"));
    }
    cursor.set_position(next);

    Ok(CentralEntry {
        name,
        flags,
        method: CompressionMethod::from(method),
        crc32,
        compressed_size,
        uncompressed_size,
        lfh_offset,
    })
}
