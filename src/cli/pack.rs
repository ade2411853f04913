//! Pack command for `alfred-workflow pack`.
//!
//! Reads snippets from TOML:
//!
//! ```toml
//! [[snippet]]
//! name = "Signature"
//! keyword = "sig"
//! snippet = "Best regards"
//! dontautoexpand = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use console::style;
use serde::Deserialize;

use crate::model::Snippet;
use crate::snippets::SnippetPack;

/// Arguments of the pack command.
#[derive(Debug, Clone)]
pub struct PackOptions {
    pub source: PathBuf,
    pub name: Option<String>,
    pub out: Option<PathBuf>,
    pub prefix: String,
    pub suffix: String,
    pub icon: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct SnippetFile {
    #[serde(rename = "snippet", default)]
    snippets: Vec<SnippetEntry>,
}

#[derive(Debug, Deserialize)]
struct SnippetEntry {
    name: String,
    keyword: String,
    snippet: String,
    dontautoexpand: Option<bool>,
}

/// Build the pack described by `options` and return the archive path.
pub fn run_pack(options: &PackOptions) -> Result<PathBuf> {
    let pack = load_pack(&options.source)?;

    println!(
        "{} {} {}",
        style("✓").green().bold(),
        style(format!("Loaded {}", options.source.display())).cyan(),
        style(format!("({} snippets)", pack.len())).dim()
    );

    let name = match &options.name {
        Some(name) => name.clone(),
        None => default_name(&options.source)?,
    };

    let archive = pack
        .package(
            &name,
            options.out.as_deref(),
            &options.prefix,
            &options.suffix,
            options.icon.as_deref(),
        )
        .context("Failed to write snippet pack")?;

    println!(
        "{} {}",
        style("✓").green().bold(),
        style(format!("Wrote {}", archive.display())).cyan()
    );

    println!();
    for snippet in pack.snippets() {
        println!(
            "  {}{}{}  {}",
            options.prefix,
            style(&snippet.keyword).bold(),
            options.suffix,
            style(&snippet.name).dim()
        );
    }
    println!();
    println!("{}", style("Ready to import!").green().bold());

    Ok(archive)
}

/// Read a snippet TOML file into a pack.
pub fn load_pack(path: &Path) -> Result<SnippetPack> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Snippet file not found: {}", path.display()))?;
    let file: SnippetFile = toml::from_str(&content)
        .with_context(|| format!("Invalid snippet file: {}", path.display()))?;

    if file.snippets.is_empty() {
        bail!("No [[snippet]] entries in {}", path.display());
    }

    let mut pack = SnippetPack::new();
    for entry in file.snippets {
        if entry.keyword.trim().is_empty() {
            bail!("Snippet '{}' has an empty keyword", entry.name);
        }
        let mut snippet = Snippet::new(entry.snippet, entry.name, entry.keyword);
        if let Some(dont) = entry.dontautoexpand {
            snippet.dontautoexpand = dont;
        }
        pack.push(snippet);
    }
    Ok(pack)
}

fn default_name(source: &Path) -> Result<String> {
    source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .with_context(|| format!("Cannot derive a pack name from {}", source.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippets::ARCHIVE_EXTENSION;
    use tempfile::TempDir;

    const SNIPPETS: &str = r#"
[[snippet]]
name = "Signature"
keyword = "sig"
snippet = "Best regards"

[[snippet]]
name = "Shrug"
keyword = "shrug"
snippet = "¯\\_(ツ)_/¯"
dontautoexpand = false
"#;

    fn write_source(temp_dir: &TempDir, content: &str) -> PathBuf {
        let path = temp_dir.path().join("team.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_pack() {
        let temp_dir = TempDir::new().unwrap();
        let pack = load_pack(&write_source(&temp_dir, SNIPPETS)).unwrap();

        assert_eq!(pack.len(), 2);
        assert_eq!(pack.snippets()[0].keyword, "sig");
        assert!(pack.snippets()[0].dontautoexpand);
        assert_eq!(pack.snippets()[1].snippet, "¯\\_(ツ)_/¯");
        assert!(!pack.snippets()[1].dontautoexpand);
    }

    #[test]
    fn test_load_pack_rejects_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_pack(&write_source(&temp_dir, "")).unwrap_err();
        assert!(err.to_string().contains("No [[snippet]] entries"));
    }

    #[test]
    fn test_load_pack_rejects_empty_keyword() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_source(
            &temp_dir,
            "[[snippet]]\nname = \"x\"\nkeyword = \" \"\nsnippet = \"y\"\n",
        );
        assert!(load_pack(&source).is_err());
    }

    #[test]
    fn test_load_pack_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_pack(&temp_dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_run_pack_names_archive_after_source() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("dist");
        fs::create_dir(&out).unwrap();

        let archive = run_pack(&PackOptions {
            source: write_source(&temp_dir, SNIPPETS),
            name: None,
            out: Some(out.clone()),
            prefix: ":".to_string(),
            suffix: ":".to_string(),
            icon: None,
        })
        .unwrap();

        assert_eq!(archive, out.join(format!("team.{}", ARCHIVE_EXTENSION)));
        assert!(archive.is_file());
    }
}
