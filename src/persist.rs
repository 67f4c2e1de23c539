use crate::errors::{Error, Result};
use crate::target::{self, Item, TargetCollection};
use log::info;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// How working values are written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Overwrite file contents, or rename files, in place.
    InPlace,
    /// Write results to new files next to the originals.
    Copy,
}

/// What a commit did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Items written or renamed.
    pub written: usize,
    /// Items skipped because their working value equals the original.
    pub unchanged: usize,
}

impl TargetCollection {
    /// Persists every changed working value.
    ///
    /// Items are committed one at a time in collection order and the first
    /// failure aborts the run: earlier items stay committed, later ones are
    /// not attempted. Nothing is written if the original and working lists
    /// differ in length.
    pub fn commit(&self, mode: CommitMode) -> Result<CommitSummary> {
        if self.original.len() != self.working.len() {
            return Err(Error::Integrity {
                original: self.original.len(),
                working: self.working.len(),
            });
        }
        if mode == CommitMode::Copy {
            return Err(Error::NotImplemented("copy commit mode"));
        }
        if !self.backed {
            return Err(Error::Config(
                "collection was built from literal input and has nothing to commit to".into(),
            ));
        }

        let mut summary = CommitSummary::default();
        for (original, working) in self.original.iter().zip(&self.working) {
            if original == working {
                summary.unchanged += 1;
                continue;
            }
            commit_item(original, working)?;
            summary.written += 1;
        }

        info!(
            "committed {} item(s), {} unchanged",
            summary.written, summary.unchanged
        );
        Ok(summary)
    }
}

fn commit_item(original: &Item, working: &Item) -> Result<()> {
    match (original, working) {
        (_, Item::Content { text, source: Some(path) }) => write_atomic(path, text),
        (Item::Pathname { .. }, Item::Pathname { .. }) => {
            match (original.path(), working.path()) {
                (Some(from), Some(to)) => {
                    target::check_stem(working.subject(), &from.display().to_string())?;
                    if from.parent() != to.parent() {
                        return Err(Error::Config(format!(
                            "renaming {} to {} would change its directory",
                            from.display(),
                            to.display()
                        )));
                    }
                    rename(&from, &to)
                }
                _ => Err(Error::Config("pathname item without a path".into())),
            }
        }
        _ => Err(Error::Config(
            "item has no backing file to commit to".into(),
        )),
    }
}

/// Replaces the contents of `path` atomically, keeping its permissions.
fn write_atomic(path: &Path, text: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| Error::io(path, e))?;
    temp_file
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(path, e))?;

    let perms = fs::metadata(path).map_err(|e| Error::io(path, e))?.permissions();
    fs::set_permissions(temp_file.path(), perms).map_err(|e| Error::io(path, e))?;

    temp_file.persist(path).map_err(|e| Error::io(path, e.error))?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Renames `from` to `to`, refusing to replace a different existing file.
fn rename(from: &Path, to: &Path) -> Result<()> {
    if to.file_name().is_none_or(|name| name.is_empty()) {
        return Err(Error::Config(format!(
            "renaming {} would leave an empty file name",
            from.display()
        )));
    }
    if to.exists() {
        return Err(Error::io(
            to,
            io::Error::new(io::ErrorKind::AlreadyExists, "rename target already exists"),
        ));
    }

    fs::rename(from, to).map_err(|e| Error::io(from, e))?;
    info!("renamed {} -> {}", from.display(), to.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerator::WalkOptions;
    use crate::patterns::{Pattern, PatternEngine, ReplacementSpec};
    use crate::target::TargetKind;
    use tempfile::TempDir;

    fn load(kind: TargetKind, root: &Path) -> TargetCollection {
        TargetCollection::from_path(kind, root, &WalkOptions::default(), PatternEngine::default())
            .unwrap()
    }

    #[test]
    fn test_in_place_content_commit() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.md");
        let b = temp_dir.path().join("b.md");
        fs::write(&a, "see [home](https://example.com)").unwrap();
        fs::write(&b, "no links").unwrap();

        let mut collection = load(TargetKind::Content, temp_dir.path());
        collection.strip_markdown_links(false).unwrap();
        let summary = collection.commit(CommitMode::InPlace).unwrap();

        assert_eq!(summary, CommitSummary { written: 1, unchanged: 1 });
        assert_eq!(fs::read_to_string(&a).unwrap(), "see home");
        assert_eq!(fs::read_to_string(&b).unwrap(), "no links");
    }

    #[test]
    fn test_uncommitted_changes_stay_in_memory() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.txt");
        fs::write(&a, "x  y").unwrap();

        let mut collection = load(TargetKind::Content, temp_dir.path());
        collection.remove_extra_whitespaces(false).unwrap();
        assert_eq!(collection.working_values(), vec!["x y"]);
        assert_eq!(fs::read_to_string(&a).unwrap(), "x  y");
    }

    #[test]
    fn test_in_place_pathname_commit_renames() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("file-name-123.txt"), "body").unwrap();

        let mut collection = load(TargetKind::Pathname, temp_dir.path());
        let pattern = Pattern::new("-").unwrap();
        collection
            .search_and_replace(&pattern, &ReplacementSpec::Literal("_".into()), false)
            .unwrap();
        collection.commit(CommitMode::InPlace).unwrap();

        assert!(!sub.join("file-name-123.txt").exists());
        assert_eq!(fs::read_to_string(sub.join("file_name_123.txt")).unwrap(), "body");
    }

    #[test]
    fn test_length_mismatch_is_fatal_and_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        fs::write(&a, "aaa").unwrap();
        fs::write(&b, "aaa").unwrap();

        let mut collection = load(TargetKind::Content, temp_dir.path());
        collection.remove(&Pattern::new("a").unwrap(), false).unwrap();
        collection.working.pop();

        let result = collection.commit(CommitMode::InPlace);
        assert!(matches!(result, Err(Error::Integrity { original: 2, working: 1 })));
        assert_eq!(fs::read_to_string(&a).unwrap(), "aaa");
        assert_eq!(fs::read_to_string(&b).unwrap(), "aaa");
    }

    #[test]
    fn test_literal_collection_cannot_commit() {
        let collection = TargetCollection::from_literals(
            TargetKind::Content,
            vec!["text".into()],
            PatternEngine::default(),
        )
        .unwrap();
        assert!(matches!(collection.commit(CommitMode::InPlace), Err(Error::Config(_))));
    }

    #[test]
    fn test_copy_mode_is_not_implemented() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        let collection = load(TargetKind::Content, temp_dir.path());
        assert!(matches!(
            collection.commit(CommitMode::Copy),
            Err(Error::NotImplemented(_))
        ));
    }

    #[test]
    fn test_rename_collision_aborts_remaining_items() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a-1.txt"), "first").unwrap();
        fs::write(root.join("a_1.txt"), "taken").unwrap();
        fs::write(root.join("b-2.txt"), "second").unwrap();

        let mut collection = load(TargetKind::Pathname, root);
        let pattern = Pattern::new("-").unwrap();
        collection
            .search_and_replace(&pattern, &ReplacementSpec::Literal("_".into()), false)
            .unwrap();

        let result = collection.commit(CommitMode::InPlace);
        assert!(matches!(
            result,
            Err(Error::Io { ref path, ref source }) if *path == root.join("a_1.txt")
                && source.kind() == io::ErrorKind::AlreadyExists
        ));
        assert_eq!(fs::read_to_string(root.join("a_1.txt")).unwrap(), "taken");
        assert!(root.join("a-1.txt").exists());
        assert!(root.join("b-2.txt").exists());
    }

    #[test]
    fn test_pathname_commit_stays_in_directory() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("file-name.txt"), "body").unwrap();

        let mut collection = load(TargetKind::Pathname, temp_dir.path());
        let pattern = Pattern::new("^file-").unwrap();
        let result = collection.search_and_replace(&pattern, &ReplacementSpec::Literal("../".into()), false);
        assert!(matches!(result, Err(Error::Config(_))));

        // A working item staged outside the operations is still refused.
        collection.working[0] = collection.original[0].with_subject("../name".into());
        assert!(matches!(collection.commit(CommitMode::InPlace), Err(Error::Config(_))));
        assert!(sub.join("file-name.txt").exists());
        assert!(!temp_dir.path().join("name.txt").exists());
    }

    #[test]
    fn test_pathname_commit_refuses_empty_stem() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "body").unwrap();

        let mut collection = load(TargetKind::Pathname, temp_dir.path());
        let pattern = Pattern::new("a").unwrap();
        assert!(matches!(collection.remove(&pattern, false), Err(Error::Config(_))));

        collection.working[0] = collection.original[0].with_subject(String::new());
        assert!(matches!(collection.commit(CommitMode::InPlace), Err(Error::Config(_))));
        assert!(temp_dir.path().join("a.txt").exists());
        assert!(!temp_dir.path().join(".txt").exists());
    }
}
