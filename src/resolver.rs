//! Path Resolver
//!
//! Archive producers disagree on layout: some put files at the root, some
//! under a `track/` or `TRACK/` folder, and some were zipped on Windows with
//! backslash separators. A caller-supplied path is expanded into every key
//! form seen so far.

/// Number of keys [`candidates`] produces.
pub const CANDIDATE_COUNT: usize = 5;

/// Lookup keys for `relative_path` within `dataset`, in priority order:
///
/// 1. the path unchanged
/// 2. prefixed with `dataset/`
/// 3. prefixed with the upper-cased `DATASET/`
/// 4. the path with `/` replaced by `\`
/// 5. form 2 with `/` replaced by `\`
///
/// Duplicates are kept so diagnostics always show all five forms.
pub fn candidates(dataset: &str, relative_path: &str) -> Vec<String> {
    let prefixed = format!("{}/{}", dataset, relative_path);

    vec![
        relative_path.to_string(),
        prefixed.clone(),
        format!("{}/{}", dataset.to_uppercase(), relative_path),
        relative_path.replace('/', "\\"),
        prefixed.replace('/', "\\"),
    ]
}

/// `relative_path` without a leading dataset folder, matched
/// case-insensitively, e.g. `COTA/Race 1/file.csv` -> `Race 1/file.csv`.
///
/// Used as a second lookup round when none of the primary candidates match.
pub fn strip_dataset_prefix<'a>(dataset: &str, relative_path: &'a str) -> Option<&'a str> {
    let (head, rest) = relative_path.split_once(|c: char| c == '/' || c == '\\')?;
    if head.eq_ignore_ascii_case(dataset) && !rest.is_empty() {
        Some(rest)
    } else {
        None
    }
}
