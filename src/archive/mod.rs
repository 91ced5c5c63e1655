//! Archive Module
//!
//! Locating, downloading and decoding remote ZIP archives.
//!
//! # Components
//! - [`ArchiveLocator`]: dataset identifier -> archive URL
//! - [`ArchiveFetcher`]: raw archive bytes over HTTP
//! - [`extract`]: central directory parsing and CSV decoding
//!
//! Supports STORED and DEFLATE entries, archive comments and ZIP64 end
//! records. No encryption and no multi-disk archives.

mod extractor;
mod fetcher;
mod locator;
mod structures;

#[cfg(test)]
pub(crate) mod testing;

pub use extractor::{
    extract, is_tabular, normalize_path, ArchiveEntry, ArchiveFileInfo, ExtractedArchive,
    ZipReader,
};
pub use fetcher::{ArchiveFetcher, FetchError, HttpArchiveFetcher};
pub use locator::{ArchiveLocator, DEFAULT_BASE_URL};
pub use structures::{CentralEntry, CompressionMethod, ZipError};
