//! Identity codec
//!
//! Maps between local working-copy paths and `(storage_block_id, file_name)`.
//! Working-copy directories are named `<TAG>_<blockId>_<random>`; everything
//! below that directory is the block's file name, so nested names survive the
//! trip. No registry is needed to recover identity from an open document.

use crate::error::ApiError;
use crate::types::DocumentIdentity;
use regex::Regex;
use std::path::{Component, Path, MAIN_SEPARATOR_STR};
use std::sync::OnceLock;

/// Literal that marks blockpad working-copy directories.
pub const TAG: &str = "blockpad";

/// Separator joining the segments of a working-copy directory name.
pub const SEGMENT_SEPARATOR: char = '_';

/// Directory-name prefix for a block's working copy: `<TAG>_<blockId>_`.
///
/// Ids containing the segment separator or a path separator cannot be decoded
/// unambiguously and are rejected.
pub fn encode_prefix(block_id: &str) -> Result<String, ApiError> {
    validate_block_id(block_id)?;
    Ok(format!(
        "{}{}{}{}",
        TAG, SEGMENT_SEPARATOR, block_id, SEGMENT_SEPARATOR
    ))
}

/// Check that a block id can be embedded in a working-copy directory name.
pub fn validate_block_id(block_id: &str) -> Result<(), ApiError> {
    if block_id.is_empty() {
        return Err(ApiError::ValidationError(
            "Code block id cannot be empty".to_string(),
        ));
    }
    if block_id.contains(SEGMENT_SEPARATOR) {
        return Err(ApiError::ValidationError(format!(
            "Code block id '{}' contains the reserved character '{}'",
            block_id, SEGMENT_SEPARATOR
        )));
    }
    if block_id.contains('/') || block_id.contains('\\') {
        return Err(ApiError::ValidationError(format!(
            "Code block id '{}' contains a path separator",
            block_id
        )));
    }
    Ok(())
}

/// Check that a block file name stays inside its working-copy directory.
///
/// Nested names (`src/main.rs`) are fine; empty names, `..`, `.` and rooted
/// or drive-prefixed names are not.
pub fn validate_file_name(file_name: &str) -> Result<(), ApiError> {
    if file_name.trim().is_empty() {
        return Err(ApiError::ValidationError(
            "File name cannot be empty".to_string(),
        ));
    }
    let escapes = Path::new(file_name).components().any(|component| {
        !matches!(component, Component::Normal(_))
    });
    if escapes {
        return Err(ApiError::ValidationError(format!(
            "File name '{}' must be relative and stay inside the code block",
            file_name
        )));
    }
    Ok(())
}

fn identity_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            let sep = regex::escape(MAIN_SEPARATOR_STR);
            let pattern = format!(
                r"^(?:.*{sep})?{tag}{seg}(?P<id>[^{seg}{sep}]+){seg}[^{sep}]*{sep}(?P<file>.+)$",
                sep = sep,
                tag = regex::escape(TAG),
                seg = SEGMENT_SEPARATOR,
            );
            match Regex::new(&pattern) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    tracing::error!("Invalid working-copy identity pattern {}: {}", pattern, e);
                    None
                }
            }
        })
        .as_ref()
}

/// Recover the document identity from a path.
///
/// The innermost tagged directory wins, so a scratch root that itself looks
/// like a working copy does not shadow the real one. Returns `None` when no
/// segment of the path is a blockpad working-copy directory, meaning the file
/// does not belong to any code block.
pub fn decode(path: &Path) -> Option<DocumentIdentity> {
    let path_str = path.to_str()?;
    let captures = identity_pattern()?.captures(path_str)?;
    let identity = DocumentIdentity {
        storage_block_id: captures.name("id")?.as_str().to_string(),
        file_name: captures.name("file")?.as_str().to_string(),
    };
    tracing::debug!(
        path = %path.display(),
        block_id = %identity.storage_block_id,
        file_name = %identity.file_name,
        "Decoded document identity"
    );
    Some(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn scratch_root() -> PathBuf {
        std::env::temp_dir()
    }

    #[test]
    fn encode_prefix_has_tag_and_id() {
        assert_eq!(encode_prefix("abc123").unwrap(), "blockpad_abc123_");
    }

    #[test]
    fn encode_prefix_rejects_reserved_characters() {
        assert!(matches!(
            encode_prefix("abc_123"),
            Err(ApiError::ValidationError(_))
        ));
        assert!(matches!(
            encode_prefix("abc/123"),
            Err(ApiError::ValidationError(_))
        ));
        assert!(matches!(encode_prefix(""), Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn decode_recovers_block_and_file() {
        let path = scratch_root().join("blockpad_abc123_Xy9k2").join("x.txt");
        let identity = decode(&path).unwrap();
        assert_eq!(identity.storage_block_id, "abc123");
        assert_eq!(identity.file_name, "x.txt");
    }

    #[test]
    fn decode_keeps_nested_file_names() {
        let path = scratch_root()
            .join("blockpad_abc123_Xy9k2")
            .join("src")
            .join("main.rs");
        let identity = decode(&path).unwrap();
        assert_eq!(
            identity.file_name,
            format!("src{}main.rs", MAIN_SEPARATOR_STR)
        );
    }

    #[test]
    fn decode_accepts_underscores_in_random_suffix() {
        let path = scratch_root().join("blockpad_abc123_a_b_c").join("x.txt");
        let identity = decode(&path).unwrap();
        assert_eq!(identity.storage_block_id, "abc123");
        assert_eq!(identity.file_name, "x.txt");
    }

    #[test]
    fn decode_unrelated_path_is_none() {
        assert_eq!(decode(Path::new("/home/user/project/main.rs")), None);
        assert_eq!(decode(Path::new("/tmp/other_abc123_x/main.rs")), None);
        assert_eq!(decode(Path::new("/tmp/myblockpad_abc123_x/main.rs")), None);
    }

    #[test]
    fn decode_directory_itself_is_none() {
        let path = scratch_root().join("blockpad_abc123_Xy9k2");
        assert_eq!(decode(&path), None);
    }

    #[test]
    fn decode_prefers_innermost_tagged_directory() {
        let path = scratch_root()
            .join("blockpad_scratch_dir")
            .join("blockpad_abc123_Xy9")
            .join("x.txt");
        let identity = decode(&path).unwrap();
        assert_eq!(identity.storage_block_id, "abc123");
        assert_eq!(identity.file_name, "x.txt");
    }

    #[test]
    fn file_names_must_stay_inside_working_copy() {
        assert!(validate_file_name("x.txt").is_ok());
        assert!(validate_file_name("src/main.rs").is_ok());
        assert!(validate_file_name(".gitignore").is_ok());

        for name in ["", "  ", "../escaped.txt", "src/../../x", "/etc/passwd", "./x.txt"] {
            assert!(
                matches!(validate_file_name(name), Err(ApiError::ValidationError(_))),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn decode_is_repeatable() {
        let path = scratch_root().join("blockpad_abc123_Xy9k2").join("x.txt");
        assert_eq!(decode(&path), decode(&path));
    }

    proptest! {
        #[test]
        fn prefix_round_trips(
            block_id in "[A-Za-z0-9]{1,32}",
            junk in "[A-Za-z0-9_.]{0,12}",
            file_name in "[A-Za-z0-9-]{1,12}(\\.[a-z]{1,4})?",
        ) {
            let dir = format!("{}{}", encode_prefix(&block_id).unwrap(), junk);
            let path = scratch_root().join(dir).join(&file_name);
            let identity = decode(&path).unwrap();
            prop_assert_eq!(identity.storage_block_id, block_id);
            prop_assert_eq!(identity.file_name, file_name);
        }
    }
}
