//! Metadata preservation for copied files.
//! - Copies timestamps (atime, mtime) and, on Unix, permission bits from source to dest.
//! - Extended attributes are copied when the "xattrs" feature is enabled.
//! - Best-effort: failures are logged and never fail the copy.

use filetime::{FileTime, set_file_times};
use std::fs;
use std::path::Path;
use tracing::{trace, warn};

/// Apply `src_meta` (already fetched by the caller) onto `dest`.
pub fn preserve_metadata(src: &Path, dest: &Path, src_meta: &fs::Metadata) {
    let at = FileTime::from_last_access_time(src_meta);
    let mt = FileTime::from_last_modification_time(src_meta);
    if let Err(e) = set_file_times(dest, at, mt) {
        warn!(path = %dest.display(), error = %e, "failed to set atime/mtime on destination");
    } else {
        trace!(path = %dest.display(), "set atime/mtime on destination");
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let src_mode = src_meta.permissions().mode() & 0o7777;
        if let Err(e) = fs::set_permissions(dest, fs::Permissions::from_mode(src_mode)) {
            warn!(path = %dest.display(), mode = format!("{:o}", src_mode), error = %e, "failed to set permissions on destination");
        }
    }

    preserve_xattrs(src, dest);
}

#[cfg(feature = "xattrs")]
fn preserve_xattrs(src: &Path, dest: &Path) {
    let names = match xattr::list(src) {
        Ok(names) => names,
        Err(e) => {
            warn!(src = %src.display(), error = %e, "failed to list xattrs; continuing");
            return;
        }
    };
    for name in names {
        let value = match xattr::get(src, &name) {
            Ok(v) => v.unwrap_or_default(),
            Err(e) => {
                warn!(src = %src.display(), xattr = %name.to_string_lossy(), error = %e, "failed to read xattr");
                continue;
            }
        };
        if let Err(e) = xattr::set(dest, &name, &value) {
            warn!(dest = %dest.display(), xattr = %name.to_string_lossy(), error = %e, "failed to set xattr");
        }
    }
}

#[cfg(not(feature = "xattrs"))]
fn preserve_xattrs(_src: &Path, _dest: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    #[test]
    fn mtime_is_copied() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::write(&src, b"a").unwrap();
        fs::write(&dst, b"a").unwrap();
        let old = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(86_400));
        set_file_times(&src, old, old).unwrap();

        preserve_metadata(&src, &dst, &fs::metadata(&src).unwrap());
        let got = FileTime::from_last_modification_time(&fs::metadata(&dst).unwrap());
        assert_eq!(got.unix_seconds(), old.unix_seconds());
    }
}
