use dirs::data_dir;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::config::read_yaml;
use crate::error::{FluxcError, Result};

/// One canned statement from the library file.
///
/// The id is not stored in the file; it is the entry's 1-based position in
/// file order, assigned at load time.
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    pub id: usize,
    pub description: String,
    pub cmd: String,
}

/// File shape: a top-level `commands` list of description/statement pairs.
#[derive(Debug, Deserialize)]
struct LibraryFile {
    commands: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    description: String,
    cmd: String,
}

/// The statement library, re-parsed from disk on every invocation.
#[derive(Debug)]
pub struct Library {
    entries: Vec<LibraryEntry>,
}

impl Library {
    pub fn load(path: &Path) -> Result<Self> {
        let file: LibraryFile = read_yaml(path)?;
        let entries = file
            .commands
            .into_iter()
            .enumerate()
            .map(|(position, raw)| LibraryEntry {
                id: position + 1,
                description: raw.description,
                cmd: raw.cmd,
            })
            .collect();

        Ok(Library { entries })
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    /// Look up an entry by its 1-based id.
    pub fn entry(&self, id: usize) -> Result<&LibraryEntry> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .ok_or(FluxcError::UnknownLibraryId {
                id,
                count: self.entries.len(),
            })
    }

    /// Render the full listing: per entry a `NN:  description` header, the
    /// statement text, and a blank separator line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = writeln!(out, "{:02}:  {}", entry.id, entry.description);
            let _ = writeln!(out, "{}", entry.cmd);
            out.push('\n');
        }
        out
    }

    /// Default library location: `fluxc/library.yml` under the per-user data
    /// directory (`~/.local/share` on Linux).
    pub fn default_path() -> PathBuf {
        data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fluxc")
            .join("library.yml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE_LIBRARY: &str = "\
commands:
  - description: All telegraf values
    cmd: select * from telegraf;
  - description: Recent cpu load
    cmd: select load from cpu where time > now() - 1h;
";

    fn write_library(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("library.yml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_ids_follow_file_order() {
        let dir = TempDir::new().unwrap();
        let path = write_library(&dir, SAMPLE_LIBRARY);

        let library = Library::load(&path).unwrap();
        let ids: Vec<usize> = library.entries().iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(library.entries()[0].description, "All telegraf values");
        assert_eq!(library.entries()[1].cmd, "select load from cpu where time > now() - 1h;");
    }

    #[test]
    fn test_entry_lookup() {
        let dir = TempDir::new().unwrap();
        let path = write_library(&dir, SAMPLE_LIBRARY);
        let library = Library::load(&path).unwrap();

        let entry = library.entry(2).unwrap();
        assert_eq!(entry.description, "Recent cpu load");
    }

    #[test]
    fn test_entry_lookup_out_of_range() {
        let dir = TempDir::new().unwrap();
        let path = write_library(&dir, SAMPLE_LIBRARY);
        let library = Library::load(&path).unwrap();

        let err = library.entry(9).unwrap_err();
        match err {
            FluxcError::UnknownLibraryId { id, count } => {
                assert_eq!(id, 9);
                assert_eq!(count, 2);
            }
            other => panic!("expected UnknownLibraryId, got {other:?}"),
        }
        assert!(library.entry(0).is_err());
    }

    #[test]
    fn test_render_listing_format() {
        let dir = TempDir::new().unwrap();
        let path = write_library(
            &dir,
            "commands:\n  - description: d1\n    cmd: select * from x;\n",
        );
        let library = Library::load(&path).unwrap();

        assert_eq!(library.render(), "01:  d1\nselect * from x;\n\n");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Library::load(&dir.path().join("absent.yml")).unwrap_err();
        assert!(matches!(err, FluxcError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_missing_commands_key() {
        let dir = TempDir::new().unwrap();
        let path = write_library(&dir, "statements: []\n");

        let err = Library::load(&path).unwrap_err();
        match err {
            FluxcError::ConfigMalformed { reason, .. } => {
                assert!(reason.contains("commands"));
            }
            other => panic!("expected ConfigMalformed, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_commands_list() {
        let dir = TempDir::new().unwrap();
        let path = write_library(&dir, "commands: []\n");

        let library = Library::load(&path).unwrap();
        assert!(library.entries().is_empty());
        assert_eq!(library.render(), "");
        assert!(matches!(
            library.entry(1),
            Err(FluxcError::UnknownLibraryId { id: 1, count: 0 })
        ));
    }
}
