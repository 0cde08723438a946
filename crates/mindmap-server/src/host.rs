//! Side effects delegated to the environment hosting the session

use std::path::Path;

/// Actions the engine asks the host to perform on its behalf.
pub trait Host: Send + Sync {
    /// Show `path` to the user, at `line` when the host supports it.
    fn open_file(&self, path: &Path, line: Option<u32>) -> anyhow::Result<()>;
}

/// Opens files with the operating system's default handler. Line numbers are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl Host for SystemHost {
    fn open_file(&self, path: &Path, line: Option<u32>) -> anyhow::Result<()> {
        tracing::debug!("Opening {} (line {:?})", path.display(), line);
        open::that(path)?;
        Ok(())
    }
}
