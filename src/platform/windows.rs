//! Windows implementations of platform helpers (best-effort, no ACL management).

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use windows_sys::Win32::Storage::FileSystem::{
    FILE_ATTRIBUTE_HIDDEN, FILE_ATTRIBUTE_NORMAL, SetFileAttributesW,
};

/// Exclusively create a lock file: fails with AlreadyExists if anything is at `path`.
/// The file is marked hidden so casual directory listings don't show it.
pub fn create_lock_file(path: &Path) -> io::Result<File> {
    use std::iter::once;
    use std::os::windows::ffi::OsStrExt;

    let f = OpenOptions::new().write(true).create_new(true).open(path)?;
    let wide: Vec<u16> = path.as_os_str().encode_wide().chain(once(0)).collect();
    // Cosmetic only; a failure here does not affect the lock.
    let _ = unsafe { SetFileAttributesW(wide.as_ptr(), FILE_ATTRIBUTE_NORMAL | FILE_ATTRIBUTE_HIDDEN) };
    Ok(f)
}

/// Open log file for appending (no symlink defense available via std on Windows).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Write a brand-new file, refusing to replace anything already at `path`.
pub fn write_new_file_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut f = OpenOptions::new().write(true).create_new(true).open(path)?;
    f.write_all(contents)?;
    f.sync_all()
}
