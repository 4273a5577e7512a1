//! Filesystem backend for the vault file.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use crate::crypto::aead::secure_random;

/// Location of a vault file and the operations to read and replace it.
#[derive(Clone, Debug)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole vault file.
    pub fn load(&self) -> Result<Vec<u8>> {
        fs::read(&self.path)
            .with_context(|| format!("failed to read vault file {}", self.path.display()))
    }

    /// Size in bytes and last modification time of the vault file.
    pub fn metadata(&self) -> Result<(u64, SystemTime)> {
        let meta = fs::metadata(&self.path)
            .with_context(|| format!("failed to stat vault file {}", self.path.display()))?;
        Ok((meta.len(), meta.modified()?))
    }

    /// Replaces the vault file with `data`.
    ///
    /// The data goes to a fresh temporary file next to the target, is synced,
    /// and is then renamed over the target; the parent directory is synced
    /// afterwards. A crash leaves either the old or the new file, never a
    /// partial one. Missing parent directories are created.
    pub fn save(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let tmp_path = self.random_tmp_path()?;
        let mut tmp_file = open_private(&tmp_path).context("failed to create temporary file")?;
        let tmp_guard = TmpGuard(&tmp_path);

        let written = tmp_file.write_all(data).and_then(|()| tmp_file.sync_all());
        drop(tmp_file);
        written.context("failed to write temporary file")?;

        self.atomic_replace(&tmp_path)?;
        tmp_guard.disarm();

        if let Some(parent) = self.path.parent() {
            File::open(parent)?.sync_all()?;
        }

        debug!(path = %self.path.display(), bytes = data.len(), "vault file written");
        Ok(())
    }

    /// `<file name>.tmp.<16 hex chars>` in the target's directory.
    fn random_tmp_path(&self) -> Result<PathBuf> {
        let mut buf = [0u8; 8];
        secure_random(&mut buf)?;

        let suffix: String = buf.iter().map(|b| format!("{b:02x}")).collect();
        let file_name = self
            .path
            .file_name()
            .context("vault path has no file name")?
            .to_string_lossy();

        Ok(self.path.with_file_name(format!("{file_name}.tmp.{suffix}")))
    }

    /// Uses `ReplaceFileW` with `REPLACEFILE_WRITE_THROUGH`, since a plain
    /// rename cannot overwrite an existing file on Windows.
    #[cfg(target_os = "windows")]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        use std::ffi::OsStr;
        use std::os::windows::ffi::OsStrExt;
        use windows_sys::Win32::Storage::FileSystem::{REPLACEFILE_WRITE_THROUGH, ReplaceFileW};

        if !self.path.exists() {
            fs::rename(tmp_path, &self.path)?;
            return Ok(());
        }

        fn to_wide(s: &OsStr) -> Vec<u16> {
            s.encode_wide().chain(std::iter::once(0)).collect()
        }

        let target_w = to_wide(self.path.as_os_str());
        let tmp_w = to_wide(tmp_path.as_os_str());

        // SAFETY: both buffers are NUL-terminated UTF-16 and outlive the call;
        // the optional pointers are null.
        let result = unsafe {
            ReplaceFileW(
                target_w.as_ptr(),
                tmp_w.as_ptr(),
                std::ptr::null(),
                REPLACEFILE_WRITE_THROUGH,
                std::ptr::null(),
                std::ptr::null(),
            )
        };

        if result == 0 {
            let err = std::io::Error::last_os_error();
            return Err(err).context("atomic replace failed");
        }

        Ok(())
    }

    /// `rename()` is atomic on the same filesystem.
    #[cfg(not(target_os = "windows"))]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        fs::rename(tmp_path, &self.path).context("atomic replace failed")?;
        Ok(())
    }
}

/// Removes the temporary file on drop unless the replace went through.
struct TmpGuard<'a>(&'a Path);

impl TmpGuard<'_> {
    fn disarm(self) {
        std::mem::forget(self);
    }
}

impl Drop for TmpGuard<'_> {
    fn drop(&mut self) {
        let _ = fs::remove_file(self.0);
    }
}

/// Creates a new file readable only by the owner where the platform allows it.
fn open_private(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}
