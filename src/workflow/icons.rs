//! Icons used by the runner, and remote icon resolution.

use std::path::PathBuf;

use crate::error::WorkflowResult;

/// Icon of the error item, inside the icon directory.
pub const ERROR_ICON: &str = "AlertStopIcon.icns";

/// Icon of the "requirements are installing" item.
pub const DOWNLOAD_ICON: &str = "SideBarDownloadsFolder.icns";

/// Default icon directory: the system icon set shipped with macOS.
pub const SYSTEM_ICON_DIR: &str = "/System/Library/CoreServices/CoreTypes.bundle/Contents/Resources";

/// Capability that turns a remote icon address into a local file.
///
/// The runner calls it for every item whose icon path is an `http(s)`
/// address. Closures `Fn(&str) -> WorkflowResult<PathBuf>` implement it.
pub trait IconDownloader {
    fn download(&self, url: &str) -> WorkflowResult<PathBuf>;
}

impl<F> IconDownloader for F
where
    F: Fn(&str) -> WorkflowResult<PathBuf>,
{
    fn download(&self, url: &str) -> WorkflowResult<PathBuf> {
        self(url)
    }
}
