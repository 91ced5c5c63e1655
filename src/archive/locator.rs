//! Archive Locator
//!
//! Maps dataset identifiers (track names) to archive download URLs.

use std::collections::HashMap;

use crate::error::{ArchiveError, Result};

/// Host the published track archives live under.
pub const DEFAULT_BASE_URL: &str = "https://trddev.com/hackathon-2025";

/// Identifier -> archive file name. Case variants are explicit rows.
const KNOWN_ARCHIVES: &[(&str, &str)] = &[
    ("barber", "barber-motorsports-park.zip"),
    ("COTA", "circuit-of-the-americas.zip"),
    ("cota", "circuit-of-the-americas.zip"),
    ("indianapolis", "indianapolis.zip"),
    ("road-america", "road-america.zip"),
    ("sebring", "sebring.zip"),
    ("Sonoma", "sonoma.zip"),
    ("sonoma", "sonoma.zip"),
    (
        "virginia-international-raceway",
        "virginia-international-raceway.zip",
    ),
    ("vir", "virginia-international-raceway.zip"),
];

// == Archive Locator ==
/// Static identifier -> URL table. Lookups are exact and case-sensitive.
#[derive(Debug, Clone)]
pub struct ArchiveLocator {
    urls: HashMap<String, String>,
}

impl ArchiveLocator {
    /// Builds a locator from an explicit identifier -> URL table.
    pub fn new<I, K, V>(table: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            urls: table
                .into_iter()
                .map(|(id, url)| (id.into(), url.into()))
                .collect(),
        }
    }

    /// Builds the known track table under `base_url`.
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self::new(
            KNOWN_ARCHIVES
                .iter()
                .map(|(id, file)| (*id, format!("{}/{}", base, file))),
        )
    }

    /// Resolves the archive URL for `dataset`.
    pub fn locate(&self, dataset: &str) -> Result<&str> {
        self.urls
            .get(dataset)
            .map(String::as_str)
            .ok_or_else(|| ArchiveError::DatasetUnknown {
                dataset: dataset.to_string(),
            })
    }

    /// Known identifiers, sorted.
    pub fn datasets(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.urls.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for ArchiveLocator {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_known_track() {
        let locator = ArchiveLocator::default();
        assert_eq!(
            locator.locate("barber").unwrap(),
            "https://trddev.com/hackathon-2025/barber-motorsports-park.zip"
        );
    }

    #[test]
    fn test_aliases_share_url() {
        let locator = ArchiveLocator::default();
        let groups: &[&[&str]] = &[
            &["COTA", "cota"],
            &["Sonoma", "sonoma"],
            &["virginia-international-raceway", "vir"],
        ];

        for group in groups {
            let first = locator.locate(group[0]).unwrap();
            for alias in &group[1..] {
                assert_eq!(locator.locate(alias).unwrap(), first, "alias {alias}");
            }
        }
    }

    #[test]
    fn test_lookup_is_exact() {
        let locator = ArchiveLocator::default();
        // Only declared case variants resolve
        assert!(matches!(
            locator.locate("BARBER"),
            Err(ArchiveError::DatasetUnknown { .. })
        ));
        assert!(locator.locate("monaco").is_err());
        assert!(locator.locate("").is_err());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let locator = ArchiveLocator::with_base_url("http://127.0.0.1:9000/");
        assert_eq!(
            locator.locate("sebring").unwrap(),
            "http://127.0.0.1:9000/sebring.zip"
        );
    }

    #[test]
    fn test_datasets_sorted() {
        let locator = ArchiveLocator::new([("b", "u2"), ("a", "u1")]);
        assert_eq!(locator.datasets(), vec!["a", "b"]);
        assert_eq!(ArchiveLocator::default().datasets().len(), 10);
    }
}
