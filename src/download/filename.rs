//! Destination path resolution for downloaded files.
//!
//! Relative paths come from listing-page links, so every segment is
//! sanitized and dot segments are dropped before anything touches disk. An
//! existing file is never overwritten: a numeric suffix is inserted before
//! the extension instead (`report.txt`, `report_1.txt`, `report_2.txt`, ...).

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::fs::{File, OpenOptions};

use super::error::DownloadError;

/// How matched files are laid out under the output directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputLayout {
    /// Recreate the repository's directory structure (`out/src/lib.rs`).
    #[default]
    Mirror,
    /// Put every file directly in the output directory (`out/lib.rs`).
    Flatten,
}

/// Sanitizes one path segment for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

/// Splits a repository-relative path into sanitized segments.
///
/// Empty, `.` and `..` segments are dropped so the result can never climb
/// out of the output directory.
fn safe_segments(relative_path: &str) -> Vec<String> {
    relative_path
        .split(['/', '\\'])
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .map(sanitize_filename)
        .collect()
}

/// Resolves where `relative_path` should be written, before collision checks.
///
/// Returns the parent directory and the file name. A path with no usable
/// segment falls back to `download.bin` directly under `output_dir`.
pub(crate) fn destination_parts(
    output_dir: &Path,
    relative_path: &str,
    layout: OutputLayout,
) -> (PathBuf, String) {
    let mut segments = safe_segments(relative_path);
    let Some(file_name) = segments.pop() else {
        return (output_dir.to_path_buf(), "download.bin".to_string());
    };

    let parent = match layout {
        OutputLayout::Mirror => segments
            .iter()
            .fold(output_dir.to_path_buf(), |dir, segment| dir.join(segment)),
        OutputLayout::Flatten => output_dir.to_path_buf(),
    };
    (parent, file_name)
}

/// Highest numeric suffix tried before falling back to a timestamp.
const MAX_COLLISION_SUFFIX: u32 = 10_000;

/// Returns the `n`th candidate name: `filename` itself for 0, otherwise a
/// numeric suffix before the extension.
///
/// A leading dot is part of the stem, so `.cursorrules` becomes `.cursorrules_1`.
fn candidate_name(filename: &str, n: u64) -> String {
    if n == 0 {
        return filename.to_string();
    }
    let (stem, ext) = match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
        _ => (filename, ""),
    };
    format!("{stem}_{n}{ext}")
}

/// Creates a new file in `dir`, never touching an existing one.
///
/// Tries `file.txt`, then `file_1.txt`, `file_2.txt`, ... Each candidate is
/// opened with `create_new`, so a file appearing between attempts is skipped
/// rather than truncated.
///
/// # Errors
///
/// Returns [`DownloadError::Io`] for any failure other than the candidate
/// already existing, or when every candidate is taken.
pub(crate) async fn create_unique_file(
    dir: &Path,
    filename: &str,
) -> Result<(PathBuf, File), DownloadError> {
    let fallback = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    let candidates = (0..u64::from(MAX_COLLISION_SUFFIX)).chain(std::iter::once(fallback));

    let mut last_path = dir.join(filename);
    for n in candidates {
        let path = dir.join(candidate_name(filename, n));
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => last_path = path,
            Err(e) => return Err(DownloadError::io(&path, e)),
        }
    }
    Err(DownloadError::io(
        &last_path,
        std::io::Error::new(ErrorKind::AlreadyExists, "no unused file name left"),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_filename_removes_invalid_chars() {
        assert_eq!(sanitize_filename("file:name.txt"), "file_name.txt");
        assert_eq!(sanitize_filename("file*name.txt"), "file_name.txt");
        assert_eq!(sanitize_filename("file<name>.txt"), "file_name_.txt");
        assert_eq!(sanitize_filename("file|name.txt"), "file_name.txt");
    }

    #[test]
    fn test_sanitize_filename_preserves_valid_chars() {
        assert_eq!(sanitize_filename(".cursorrules"), ".cursorrules");
        assert_eq!(sanitize_filename("file (1).md"), "file (1).md");
        assert_eq!(sanitize_filename("日本語.md"), "日本語.md");
    }

    #[test]
    fn test_destination_parts_mirror_keeps_directories() {
        let out = Path::new("/out");
        let (parent, name) = destination_parts(out, "src/bin/main.rs", OutputLayout::Mirror);
        assert_eq!(parent, Path::new("/out/src/bin"));
        assert_eq!(name, "main.rs");
    }

    #[test]
    fn test_destination_parts_flatten_uses_basename() {
        let out = Path::new("/out");
        let (parent, name) = destination_parts(out, "src/bin/main.rs", OutputLayout::Flatten);
        assert_eq!(parent, Path::new("/out"));
        assert_eq!(name, "main.rs");
    }

    #[test]
    fn test_destination_parts_drops_traversal_segments() {
        let out = Path::new("/out");
        let (parent, name) = destination_parts(out, "../../etc/./passwd", OutputLayout::Mirror);
        assert_eq!(parent, Path::new("/out/etc"));
        assert_eq!(name, "passwd");
        assert!(!parent.components().any(|c| c == Component::ParentDir));
    }

    #[test]
    fn test_destination_parts_empty_path_falls_back() {
        let out = Path::new("/out");
        let (parent, name) = destination_parts(out, "/..//", OutputLayout::Mirror);
        assert_eq!(parent, Path::new("/out"));
        assert_eq!(name, "download.bin");
    }

    #[test]
    fn test_candidate_name_suffixes() {
        assert_eq!(candidate_name("report.txt", 0), "report.txt");
        assert_eq!(candidate_name("report.txt", 2), "report_2.txt");
        assert_eq!(candidate_name(".cursorrules", 1), ".cursorrules_1");
        assert_eq!(candidate_name("Makefile", 1), "Makefile_1");
        assert_eq!(candidate_name("archive.tar.gz", 1), "archive.tar_1.gz");
    }

    #[tokio::test]
    async fn test_create_unique_file_no_conflict() {
        let temp_dir = TempDir::new().unwrap();
        let (path, _file) = create_unique_file(temp_dir.path(), "report.txt")
            .await
            .unwrap();
        assert_eq!(path, temp_dir.path().join("report.txt"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_create_unique_file_counts_up_and_keeps_existing() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("report.txt"), b"original").unwrap();

        let (first, _) = create_unique_file(temp_dir.path(), "report.txt")
            .await
            .unwrap();
        let (second, _) = create_unique_file(temp_dir.path(), "report.txt")
            .await
            .unwrap();

        assert_eq!(first, temp_dir.path().join("report_1.txt"));
        assert_eq!(second, temp_dir.path().join("report_2.txt"));
        assert_eq!(
            std::fs::read(temp_dir.path().join("report.txt")).unwrap(),
            b"original"
        );
    }

    #[tokio::test]
    async fn test_create_unique_file_dotfile_keeps_leading_dot() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(".cursorrules"), b"1").unwrap();
        let (path, _) = create_unique_file(temp_dir.path(), ".cursorrules")
            .await
            .unwrap();
        assert_eq!(path, temp_dir.path().join(".cursorrules_1"));
    }

    #[tokio::test]
    async fn test_create_unique_file_missing_directory_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent");
        let result = create_unique_file(&missing, "a.py").await;
        assert!(matches!(result, Err(DownloadError::Io { .. })));
    }
}
