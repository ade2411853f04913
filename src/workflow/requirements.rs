//! Runtime requirements of a workflow.
//!
//! A workflow may ship a requirements file listing the external tools its
//! handler needs, one declaration per line:
//!
//! ```text
//! # tools used by the handler
//! jq
//! ripgrep>=14:rg
//! fzf>=0.40, <1
//! ```
//!
//! A declaration is a package name, an optional version requirement and an
//! optional `:executable` when the package installs a binary under another
//! name. `==` and `~=` are accepted for `=` and `~`.
//!
//! When something is missing the runner starts a detached install and
//! answers with an informational item instead of calling the handler.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use regex::Regex;
use semver::{Version, VersionReq};

use crate::error::{WorkflowError, WorkflowResult};

/// Characters that end the package name in a declaration.
const VERSION_OPERATORS: &[char] = &['<', '>', '=', '!', '~', ',', ' '];

/// One declaration from the requirements file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Package name, handed to the installer
    pub name: String,
    /// Executable probed to decide whether the package is installed
    pub executable: String,
    /// Accepted versions of the executable, if constrained
    pub version: Option<VersionReq>,
    /// The declaration as written, without comment
    pub declaration: String,
}

impl Requirement {
    /// Parse one line; blank lines and `#` comments yield `None`.
    ///
    /// Fails on a version requirement that cannot be honoured, such as
    /// `!=`.
    pub fn parse(line: &str) -> Result<Option<Self>, semver::Error> {
        let declaration = match line.split_once('#') {
            Some((before, _)) => before.trim(),
            None => line.trim(),
        };
        if declaration.is_empty() {
            return Ok(None);
        }

        let (package, executable) = match declaration.rsplit_once(':') {
            Some((package, executable)) => (package.trim(), executable.trim()),
            None => (declaration, ""),
        };

        let name_end = package.find(VERSION_OPERATORS).unwrap_or(package.len());
        let name = package[..name_end].trim();
        if name.is_empty() {
            return Ok(None);
        }

        let constraint = package[name_end..].trim();
        let version = if constraint.is_empty() {
            None
        } else {
            let constraint = constraint.replace("~=", "~").replace("==", "=");
            Some(VersionReq::parse(&constraint)?)
        };

        let executable = if executable.is_empty() { name } else { executable };
        Ok(Some(Self {
            name: name.to_string(),
            executable: executable.to_string(),
            version,
            declaration: declaration.to_string(),
        }))
    }
}

/// Read the requirements file; `None` when the workflow has none.
pub fn load(path: &Path) -> WorkflowResult<Option<Vec<Requirement>>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no requirements file");
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let mut requirements = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let parsed = Requirement::parse(line).map_err(|e| WorkflowError::Config {
            path: path.to_path_buf(),
            message: format!("line {}: {}", index + 1, e),
        })?;
        requirements.extend(parsed);
    }
    tracing::debug!(count = requirements.len(), "loaded requirements");
    Ok(Some(requirements))
}

/// Capability that checks and installs requirements.
pub trait Installer {
    /// Whether `requirement` is usable right now.
    fn is_satisfied(&self, requirement: &Requirement) -> bool;

    /// Start installing `missing` without waiting for it.
    ///
    /// Returns the command line that was launched, shown to the user.
    fn install(&self, missing: &[Requirement]) -> io::Result<String>;
}

/// Installer that probes executables and spawns a package manager.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    command: Vec<String>,
    package_dir: Option<PathBuf>,
}

impl CommandInstaller {
    /// `command` is the program and leading arguments, e.g. `brew install`.
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            package_dir: None,
        }
    }

    /// Also accept tools found in `<dir>/bin`.
    pub fn with_package_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.package_dir = Some(dir.into());
        self
    }

    /// The full command line for `missing`: the installer followed by the
    /// package names.
    pub fn command_line(&self, missing: &[Requirement]) -> Vec<String> {
        self.command
            .iter()
            .cloned()
            .chain(missing.iter().map(|r| r.name.clone()))
            .collect()
    }

    fn locate(&self, executable: &str) -> Option<PathBuf> {
        if let Some(dir) = &self.package_dir {
            if let Ok(path) = which::which_in(executable, Some(dir.join("bin")), dir) {
                return Some(path);
            }
        }
        which::which(executable).ok()
    }
}

impl Installer for CommandInstaller {
    fn is_satisfied(&self, requirement: &Requirement) -> bool {
        let Some(path) = self.locate(&requirement.executable) else {
            tracing::debug!(executable = %requirement.executable, "executable not found");
            return false;
        };

        let Some(wanted) = &requirement.version else {
            return true;
        };
        match installed_version(&path) {
            Some(version) => {
                tracing::debug!(
                    executable = %path.display(),
                    %version,
                    required = %wanted,
                    "checked version"
                );
                wanted.matches(&version)
            }
            None => {
                tracing::warn!(executable = %path.display(), "cannot determine installed version");
                false
            }
        }
    }

    fn install(&self, missing: &[Requirement]) -> io::Result<String> {
        let (program, leading) = self.command.split_first().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "installer command is empty")
        })?;
        let command_line = self.command_line(missing);

        let mut command = Command::new(program);
        command
            .args(leading)
            .args(missing.iter().map(|r| &r.name))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Own process group, so the install outlives the host killing us.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = command.spawn()?;
        tracing::info!(pid = child.id(), "started requirement install");

        Ok(command_line.join(" "))
    }
}

/// Version reported by `<executable> --version`.
fn installed_version(executable: &Path) -> Option<Version> {
    let output = Command::new(executable)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .ok()?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push('\n');
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    parse_version(&text)
}

/// First dotted number in `text`; missing minor and patch count as 0.
fn parse_version(text: &str) -> Option<Version> {
    let re = Regex::new(r"\b(\d+)(?:\.(\d+))?(?:\.(\d+))?\b").ok()?;
    let caps = re.captures(text)?;
    let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
    Some(Version::new(part(1)?, part(2).unwrap_or(0), part(3).unwrap_or(0)))
}
