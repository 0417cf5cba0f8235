//! Locating entity files inside an extracted dump directory

use std::path::{Path, PathBuf};

use crate::error::{IngestError, IngestResult};

/// List the `.xml` files of a directory in name order
pub fn list_xml_files(dir: &Path) -> IngestResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(IngestError::io(dir))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(IngestError::io(dir))?.path();
        let is_xml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if is_xml && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Find the first `.xml` file whose name contains `hint`, ignoring case
///
/// A missing match is reported as the recoverable `NotFound`; an unreadable
/// directory is not.
pub fn find_entity_file(dir: &Path, hint: &str) -> IngestResult<PathBuf> {
    let needle = hint.to_lowercase();

    list_xml_files(dir)?
        .into_iter()
        .find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .ok_or_else(|| IngestError::NotFound {
            entity: hint.to_string(),
            dir: dir.to_path_buf(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn dump_dir(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in files {
            fs::write(dir.path().join(name), "<root/>").unwrap();
        }
        dir
    }

    #[test]
    fn test_finds_standard_files() {
        let dir = dump_dir(&[
            "Badges.xml",
            "Comments.xml",
            "PostHistory.xml",
            "PostLinks.xml",
            "Posts.xml",
            "Tags.xml",
            "Users.xml",
            "Votes.xml",
        ]);

        let posts = find_entity_file(dir.path(), "Posts").unwrap();
        assert_eq!(posts.file_name().unwrap(), "Posts.xml");

        let history = find_entity_file(dir.path(), "PostHistory").unwrap();
        assert_eq!(history.file_name().unwrap(), "PostHistory.xml");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let dir = dump_dir(&["users.XML"]);
        let users = find_entity_file(dir.path(), "Users").unwrap();
        assert_eq!(users.file_name().unwrap(), "users.XML");
    }

    #[test]
    fn test_ignores_non_xml_files() {
        let dir = dump_dir(&["Votes.csv", "Votes.xml.bak"]);
        let err = find_entity_file(dir.path(), "Votes").unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_first_match_in_name_order() {
        let dir = dump_dir(&["b-Tags.xml", "a-Tags.xml"]);
        let tags = find_entity_file(dir.path(), "tags").unwrap();
        assert_eq!(tags.file_name().unwrap(), "a-Tags.xml");
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = find_entity_file(&dir.path().join("absent"), "Users").unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
        assert!(!err.is_recoverable());
    }
}
