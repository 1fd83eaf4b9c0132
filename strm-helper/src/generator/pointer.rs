//! Path mapping and content synthesis for pointer files.

use crate::utils::{Result, StrmError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Extension given to every pointer file.
pub const POINTER_EXTENSION: &str = "strm";

/// Media suffixes that get a pointer file by default.
pub const DEFAULT_MEDIA_EXTENSIONS: [&str; 17] = [
    ".mp4", ".mkv", ".ts", ".iso", ".rmvb", ".avi", ".mov", ".mpeg", ".mpg", ".wmv", ".3gp",
    ".asf", ".m4v", ".flv", ".m2ts", ".tp", ".f4v",
];

/// Allow-list of media file suffixes, leading dot included. Matching is
/// case sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct MediaExtensions(BTreeSet<String>);

impl MediaExtensions {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            extensions
                .into_iter()
                .map(|ext| {
                    let ext = ext.as_ref().trim();
                    if ext.starts_with('.') {
                        ext.to_string()
                    } else {
                        format!(".{ext}")
                    }
                })
                .filter(|ext| ext.len() > 1)
                .collect(),
        )
    }

    pub fn allows(&self, suffix: &str) -> bool {
        self.0.contains(suffix)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for MediaExtensions {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIA_EXTENSIONS)
    }
}

impl From<Vec<String>> for MediaExtensions {
    fn from(extensions: Vec<String>) -> Self {
        Self::new(extensions)
    }
}

impl From<MediaExtensions> for Vec<String> {
    fn from(extensions: MediaExtensions) -> Self {
        extensions.0.into_iter().collect()
    }
}

/// Settings shared by every entry of a generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    target_dir: PathBuf,
    server_base_url: String,
    media_extensions: MediaExtensions,
}

impl GenerateOptions {
    /// Trailing slashes are dropped from both `target_dir` and
    /// `server_base_url`; a target of `/` stays `/`.
    pub fn new(target_dir: &str, server_base_url: &str) -> Self {
        let trimmed = target_dir.trim_end_matches('/');
        let target_dir = if trimmed.is_empty() && target_dir.starts_with('/') {
            PathBuf::from("/")
        } else {
            PathBuf::from(trimmed)
        };

        Self {
            target_dir,
            server_base_url: server_base_url.trim_end_matches('/').to_string(),
            media_extensions: MediaExtensions::default(),
        }
    }

    pub fn with_media_extensions(mut self, media_extensions: MediaExtensions) -> Self {
        self.media_extensions = media_extensions;
        self
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    pub fn server_base_url(&self) -> &str {
        &self.server_base_url
    }

    pub fn media_extensions(&self) -> &MediaExtensions {
        &self.media_extensions
    }
}

/// Where a remote file lands locally and what its pointer looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerTarget {
    /// Mirror location of the original file (never written)
    pub local_path: PathBuf,

    /// `<parent>/<stem>.strm`
    pub pointer_path: PathBuf,

    /// Original file name with its extension, used in the URL
    pub file_name: String,

    /// Original extension with leading dot, or empty
    pub suffix: String,
}

impl PointerTarget {
    pub fn from_local_path(local_path: PathBuf) -> Self {
        let file_name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = local_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = local_path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let pointer_name = format!("{stem}.{POINTER_EXTENSION}");
        let pointer_path = match local_path.parent() {
            Some(parent) => parent.join(pointer_name),
            None => PathBuf::from(pointer_name),
        };

        Self {
            local_path,
            pointer_path,
            file_name,
            suffix,
        }
    }

    pub fn pointer_key(&self) -> String {
        self.pointer_path.to_string_lossy().into_owned()
    }
}

/// Strip `removal_prefix` from `remote_path` and join the rest onto `target_dir`.
///
/// The prefix has to end on a path-segment boundary: `/Movies` is a prefix of
/// `/Movies/a.mkv` but not of `/Movies2/a.mkv`. `.` and `..` segments are
/// rejected so the result always stays under `target_dir`.
pub fn rebase(remote_path: &str, removal_prefix: &str, target_dir: &Path) -> Result<PathBuf> {
    let outside = || StrmError::PathOutsidePrefix {
        path: remote_path.to_string(),
        prefix: removal_prefix.to_string(),
    };

    let relative = remote_path.strip_prefix(removal_prefix).ok_or_else(outside)?;
    let on_boundary = removal_prefix.is_empty()
        || removal_prefix.ends_with('/')
        || relative.is_empty()
        || relative.starts_with('/');
    if !on_boundary {
        return Err(outside());
    }

    let mut local = target_dir.to_path_buf();
    for segment in relative.split('/').filter(|segment| !segment.is_empty()) {
        if segment == "." || segment == ".." {
            return Err(StrmError::RelativeSegment {
                path: remote_path.to_string(),
                segment: segment.to_string(),
            });
        }
        local.push(segment);
    }
    Ok(local)
}

/// `<server_base_url>/<content_handle>/<file_name>`, no trailing newline.
pub fn pointer_content(server_base_url: &str, content_handle: &str, file_name: &str) -> String {
    format!("{server_base_url}/{content_handle}/{file_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebase_strips_traversal_root() -> Result<()> {
        let local = rebase(
            "/Library/Movies/a/b/video.mkv",
            "/Library/Movies",
            Path::new("/mirror"),
        )?;
        assert_eq!(local, PathBuf::from("/mirror/a/b/video.mkv"));
        Ok(())
    }

    #[test]
    fn test_rebase_from_index_root_keeps_structure() -> Result<()> {
        let local = rebase("/Movies/Inception.mkv", "", Path::new("/mirror"))?;
        assert_eq!(local, PathBuf::from("/mirror/Movies/Inception.mkv"));
        Ok(())
    }

    #[test]
    fn test_rebase_rejects_foreign_paths() {
        let result = rebase("/Shows/x.mkv", "/Movies", Path::new("/mirror"));
        assert!(matches!(result, Err(StrmError::PathOutsidePrefix { .. })));

        let partial = rebase("/Movies2/x.mkv", "/Movies", Path::new("/mirror"));
        assert!(matches!(partial, Err(StrmError::PathOutsidePrefix { .. })));
    }

    #[test]
    fn test_rebase_rejects_relative_segments() {
        for path in ["/../evil.mkv", "/Movies/../../x.mkv", "/a/./b.mkv", "/.."] {
            let result = rebase(path, "", Path::new("/mirror"));
            assert!(
                matches!(result, Err(StrmError::RelativeSegment { .. })),
                "{path} was accepted"
            );
        }

        let dotted = rebase("/..hidden/...mkv", "", Path::new("/mirror"));
        assert_eq!(dotted.ok(), Some(PathBuf::from("/mirror/..hidden/...mkv")));
    }

    #[test]
    fn test_pointer_target() {
        let target = PointerTarget::from_local_path(PathBuf::from("/mirror/a/b/video.mkv"));
        assert_eq!(target.pointer_path, PathBuf::from("/mirror/a/b/video.strm"));
        assert_eq!(target.file_name, "video.mkv");
        assert_eq!(target.suffix, ".mkv");
        assert_eq!(target.pointer_key(), "/mirror/a/b/video.strm");

        let dotted = PointerTarget::from_local_path(PathBuf::from("/mirror/The.Matrix.1999.mp4"));
        assert_eq!(dotted.pointer_path, PathBuf::from("/mirror/The.Matrix.1999.strm"));
        assert_eq!(dotted.suffix, ".mp4");

        let bare = PointerTarget::from_local_path(PathBuf::from("/mirror/README"));
        assert_eq!(bare.suffix, "");
    }

    #[test]
    fn test_media_extensions_case_sensitive() {
        let extensions = MediaExtensions::default();
        assert_eq!(extensions.len(), 17);
        assert!(extensions.allows(".mkv"));
        assert!(extensions.allows(".m2ts"));
        assert!(!extensions.allows(".MKV"));
        assert!(!extensions.allows(".txt"));
        assert!(!extensions.allows(""));
    }

    #[test]
    fn test_media_extensions_normalize_leading_dot() {
        let extensions = MediaExtensions::new(["mkv", ".mp4", " ", "."]);
        assert_eq!(extensions.len(), 2);
        assert!(extensions.allows(".mkv"));
    }

    #[test]
    fn test_options_trim_trailing_slashes() {
        let options = GenerateOptions::new("/mirror//", "http://host:1234/");
        assert_eq!(options.target_dir(), Path::new("/mirror"));
        assert_eq!(options.server_base_url(), "http://host:1234");

        let root = GenerateOptions::new("/", "http://srv");
        assert_eq!(root.target_dir(), Path::new("/"));
    }

    #[test]
    fn test_pointer_content_format() {
        assert_eq!(
            pointer_content("http://host:1234", "abc123", "movie.mkv"),
            "http://host:1234/abc123/movie.mkv"
        );
    }
}
