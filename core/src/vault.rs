use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::errors::{ZettelError, ZettelResult};

/// Read-side seam over the note store. Notes are identified by name
/// (file stem); each note has textual content, at most one outgoing
/// link to its parent note, and an ordered list of tags.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Full text content of the note
    async fn read_content(&self, note: &str) -> ZettelResult<String>;

    /// Target of the note's first outgoing link, if any
    async fn parent_link(&self, note: &str) -> ZettelResult<Option<String>>;

    /// Tags attached to the note, in order of appearance
    async fn tags(&self, note: &str) -> ZettelResult<Vec<String>>;
}

/// Extract the target of the first `[[wikilink]]` in a note body.
/// An alias segment (`[[target|alias]]`) is stripped.
pub fn first_link(content: &str) -> Option<String> {
    let start = content.find("[[")?;
    let rest = &content[start + 2..];
    let end = rest.find("]]")?;
    let inner = &rest[..end];
    let target = inner.split('|').next().unwrap_or(inner).trim();
    if target.is_empty() {
        None
    } else {
        Some(target.to_string())
    }
}

/// Extract `#tag` tokens from a note body, in order of appearance.
pub fn extract_tags(content: &str) -> Vec<String> {
    let mut tags = Vec::new();
    for word in content.split_whitespace() {
        if let Some(name) = word.strip_prefix('#') {
            let name: String = name
                .chars()
                .take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '/'))
                .collect();
            if !name.is_empty() {
                tags.push(format!("#{}", name));
            }
        }
    }
    tags
}

/// Filesystem-backed note store: a directory of `<name>.md` files.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a note file inside the vault
    pub fn note_path(&self, note: &str) -> PathBuf {
        self.root.join(format!("{}.md", note))
    }

    pub fn note_exists(&self, note: &str) -> bool {
        self.note_path(note).exists()
    }

    /// Create a new note with the given content. Fails if the note
    /// already exists, so an existing answer is never clobbered.
    pub async fn create_note(&self, note: &str, content: &str) -> ZettelResult<PathBuf> {
        let path = self.note_path(note);
        if path.exists() {
            return Err(ZettelError::VaultError(format!(
                "Note already exists: {}",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content).await?;
        Ok(path)
    }

    /// Append a piece of text to an existing note
    pub async fn append(&self, note: &str, text: &str) -> ZettelResult<()> {
        let path = self.note_path(note);
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .await
            .map_err(|_| ZettelError::NoteNotFound(note.to_string()))?;
        file.write_all(text.as_bytes()).await?;
        Ok(())
    }

    async fn read(&self, note: &str) -> ZettelResult<String> {
        fs::read_to_string(self.note_path(note))
            .await
            .map_err(|_| ZettelError::NoteNotFound(note.to_string()))
    }
}

#[async_trait]
impl NoteStore for FsVault {
    async fn read_content(&self, note: &str) -> ZettelResult<String> {
        self.read(note).await
    }

    async fn parent_link(&self, note: &str) -> ZettelResult<Option<String>> {
        Ok(first_link(&self.read(note).await?))
    }

    async fn tags(&self, note: &str) -> ZettelResult<Vec<String>> {
        Ok(extract_tags(&self.read(note).await?))
    }
}

/// In-memory note store, useful for tests and embedding hosts that keep
/// their own index.
#[derive(Debug, Default)]
pub struct MemoryVault {
    notes: HashMap<String, MemoryNote>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryNote {
    pub content: String,
    pub parent: Option<String>,
    pub tags: Vec<String>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, note: MemoryNote) {
        self.notes.insert(name.to_string(), note);
    }

    fn get(&self, note: &str) -> ZettelResult<&MemoryNote> {
        self.notes
            .get(note)
            .ok_or_else(|| ZettelError::NoteNotFound(note.to_string()))
    }
}

#[async_trait]
impl NoteStore for MemoryVault {
    async fn read_content(&self, note: &str) -> ZettelResult<String> {
        Ok(self.get(note)?.content.clone())
    }

    async fn parent_link(&self, note: &str) -> ZettelResult<Option<String>> {
        Ok(self.get(note)?.parent.clone())
    }

    async fn tags(&self, note: &str) -> ZettelResult<Vec<String>> {
        Ok(self.get(note)?.tags.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn first_link_finds_target() {
        assert_eq!(first_link("see [[other-note]] for more"), Some("other-note".to_string()));
        assert_eq!(first_link("[[a|alias]] [[b]]"), Some("a".to_string()));
        assert_eq!(first_link("no links here"), None);
        assert_eq!(first_link("broken [[link"), None);
    }

    #[test]
    fn extract_tags_keeps_order() {
        let body = "#chat question about rust #answer\nbody text #follow-up";
        assert_eq!(extract_tags(body), vec!["#chat", "#answer", "#follow-up"]);
    }

    #[test]
    fn extract_tags_ignores_bare_hash() {
        assert_eq!(extract_tags("# heading\ntext"), Vec::<String>::new());
    }

    #[tokio::test]
    async fn fs_vault_reads_links_and_tags() {
        let dir = tempdir().unwrap();
        let vault = FsVault::new(dir.path());
        vault
            .create_note("child", "[[parent]] #chat #answer\n\n## Notes:\nhello")
            .await
            .unwrap();

        assert_eq!(
            vault.parent_link("child").await.unwrap(),
            Some("parent".to_string())
        );
        assert_eq!(vault.tags("child").await.unwrap(), vec!["#chat", "#answer"]);
        assert!(vault.read_content("child").await.unwrap().contains("hello"));
    }

    #[tokio::test]
    async fn fs_vault_missing_note_is_not_found() {
        let dir = tempdir().unwrap();
        let vault = FsVault::new(dir.path());
        match vault.read_content("ghost").await {
            Err(ZettelError::NoteNotFound(name)) => assert_eq!(name, "ghost"),
            other => panic!("expected NoteNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fs_vault_create_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let vault = FsVault::new(dir.path());
        vault.create_note("note", "first").await.unwrap();
        assert!(vault.create_note("note", "second").await.is_err());
    }

    #[tokio::test]
    async fn fs_vault_append_extends_content() {
        let dir = tempdir().unwrap();
        let vault = FsVault::new(dir.path());
        vault.create_note("note", "start").await.unwrap();
        vault.append("note", " more").await.unwrap();
        assert_eq!(vault.read_content("note").await.unwrap(), "start more");
    }
}
