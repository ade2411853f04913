//! Snippet pack builder.
//!
//! Collects snippets and writes them as a `.alfredsnippets` archive that the
//! host imports in one go. An archive holds one JSON file per snippet, an
//! `info.plist` with the keyword prefix/suffix and an optional `icon.png`.
//!
//! Packaging is an authoring step: errors are returned as-is.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::{NamedTempFile, TempDir};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{PackageError, PackageResult};
use crate::model::Snippet;

/// Archive extension understood by the host.
pub const ARCHIVE_EXTENSION: &str = "alfredsnippets";

const MANIFEST_NAME: &str = "info.plist";
const ICON_NAME: &str = "icon.png";

/// Pack-wide keyword convention, written as `info.plist`.
#[derive(Debug, Serialize)]
struct PackManifest<'a> {
    snippetkeywordprefix: &'a str,
    snippetkeywordsuffix: &'a str,
}

/// Ordered collection of snippets to be packaged.
#[derive(Debug, Default)]
pub struct SnippetPack {
    snippets: Vec<Snippet>,
}

impl SnippetPack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snippet. Keyword uniqueness is left to the caller.
    pub fn insert(
        &mut self,
        snippet: impl Into<String>,
        name: impl Into<String>,
        keyword: impl Into<String>,
    ) -> &Snippet {
        self.push(Snippet::new(snippet, name, keyword))
    }

    /// Append a fully built snippet.
    pub fn push(&mut self, snippet: Snippet) -> &Snippet {
        self.snippets.push(snippet);
        &self.snippets[self.snippets.len() - 1]
    }

    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    /// Write `<destination>/<name>.alfredsnippets` and return its path.
    ///
    /// `destination` defaults to the current directory. The archive is
    /// assembled next to its final location and renamed into place, so a
    /// half-written archive never shows up under the final name.
    pub fn package(
        &self,
        name: &str,
        destination: Option<&Path>,
        prefix: &str,
        suffix: &str,
        icon: Option<&Path>,
    ) -> PackageResult<PathBuf> {
        let destination = match destination {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir()?,
        };
        let target = destination.join(format!("{}.{}", name, ARCHIVE_EXTENSION));

        let staging = TempDir::new()?;
        let mut files = Vec::with_capacity(self.snippets.len() + 2);

        for snippet in &self.snippets {
            files.push(snippet.save(staging.path())?);
        }

        let manifest_path = staging.path().join(MANIFEST_NAME);
        let manifest = PackManifest {
            snippetkeywordprefix: prefix,
            snippetkeywordsuffix: suffix,
        };
        plist::to_file_xml(&manifest_path, &manifest)?;
        files.push(manifest_path);

        if let Some(icon) = icon {
            let icon_path = staging.path().join(ICON_NAME);
            fs::copy(icon, &icon_path)?;
            files.push(icon_path);
        }

        let mut archive = NamedTempFile::new_in(&destination)?;
        write_archive(archive.as_file_mut(), &files)?;
        archive
            .persist(&target)
            .map_err(|e| PackageError::Persist {
                path: target.clone(),
                source: e.error,
            })?;

        tracing::debug!(
            snippets = self.snippets.len(),
            archive = %target.display(),
            "packaged snippets"
        );
        Ok(target)
    }
}

/// Deflate every file into `out`, stored under its bare file name.
fn write_archive(out: &mut File, files: &[PathBuf]) -> PackageResult<()> {
    let mut zip = ZipWriter::new(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let entry_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("not a file: {}", path.display()),
                )
            })?;
        zip.start_file(entry_name, options)?;
        zip.write_all(&fs::read(path)?)?;
    }

    zip.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn entry_names(path: &Path) -> BTreeSet<String> {
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        archive.file_names().map(|n| n.to_string()).collect()
    }

    fn read_entry(path: &Path, name: &str) -> String {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut contents = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        contents
    }

    #[test]
    fn test_same_name_snippets_do_not_collide() {
        let temp_dir = TempDir::new().unwrap();
        let mut pack = SnippetPack::new();
        let first = pack.insert("first", "Greeting", ":hi:").uid.clone();
        let second = pack.insert("second", "Greeting", ":hello:").uid.clone();

        let archive = pack
            .package("greetings", Some(temp_dir.path()), ";", ";", None)
            .unwrap();
        assert_eq!(archive, temp_dir.path().join("greetings.alfredsnippets"));

        let names = entry_names(&archive);
        assert_eq!(names.len(), 3);
        assert!(names.contains(&format!("Greeting [{}].json", first)));
        assert!(names.contains(&format!("Greeting [{}].json", second)));
        assert!(names.contains("info.plist"));

        let body: serde_json::Value =
            serde_json::from_str(&read_entry(&archive, &format!("Greeting [{}].json", second)))
                .unwrap();
        assert_eq!(body["alfredsnippet"]["keyword"], ":hello:");
    }

    #[test]
    fn test_manifest_records_prefix_and_suffix() {
        let temp_dir = TempDir::new().unwrap();
        let mut pack = SnippetPack::new();
        pack.insert("body", "Name", "kw");

        let archive = pack
            .package("pack", Some(temp_dir.path()), "::", "<&>", None)
            .unwrap();

        let value: plist::Value =
            plist::from_bytes(read_entry(&archive, "info.plist").as_bytes()).unwrap();
        let manifest = value.as_dictionary().unwrap();
        assert_eq!(
            manifest.get("snippetkeywordprefix").and_then(|v| v.as_string()),
            Some("::")
        );
        assert_eq!(
            manifest.get("snippetkeywordsuffix").and_then(|v| v.as_string()),
            Some("<&>")
        );
    }

    #[test]
    fn test_icon_is_copied() {
        let temp_dir = TempDir::new().unwrap();
        let icon = temp_dir.path().join("my-icon.png");
        fs::write(&icon, b"png").unwrap();

        let pack = SnippetPack::new();
        let archive = pack
            .package("empty", Some(temp_dir.path()), "", "", Some(&icon))
            .unwrap();

        let names = entry_names(&archive);
        assert!(names.contains("icon.png"));
        assert_eq!(read_entry(&archive, "icon.png"), "png");
    }

    #[test]
    fn test_missing_icon_fails_without_archive() {
        let temp_dir = TempDir::new().unwrap();
        let mut pack = SnippetPack::new();
        pack.insert("body", "Name", "kw");

        let err = pack
            .package(
                "broken",
                Some(temp_dir.path()),
                "",
                "",
                Some(&temp_dir.path().join("missing.png")),
            )
            .unwrap_err();
        assert!(matches!(err, PackageError::Io(_)));
        assert!(!temp_dir.path().join("broken.alfredsnippets").exists());
    }

    #[test]
    fn test_missing_destination_fails() {
        let temp_dir = TempDir::new().unwrap();
        let pack = SnippetPack::new();
        let result = pack.package(
            "nowhere",
            Some(&temp_dir.path().join("does/not/exist")),
            "",
            "",
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_repackaging_overwrites_archive() {
        let temp_dir = TempDir::new().unwrap();
        let mut pack = SnippetPack::new();
        pack.insert("one", "One", "1");
        pack.package("pack", Some(temp_dir.path()), "", "", None)
            .unwrap();

        pack.insert("two", "Two", "2");
        let archive = pack
            .package("pack", Some(temp_dir.path()), "", "", None)
            .unwrap();
        assert_eq!(entry_names(&archive).len(), 3);
    }
}
