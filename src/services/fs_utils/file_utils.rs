use std::fs;
use std::path::Path;

/// Move a file with `std::fs::rename`, falling back to a `fs_extra`
/// copy-and-delete when the rename fails (likely a cross-device link).
///
/// Never overwrites: if the destination already exists the original error
/// is propagated.
pub fn move_file_cross_device(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::warn!(
                "fs::rename failed (cross-device?): {}. Attempting fallback move...",
                e
            );

            if !from.exists() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Source path does not exist",
                ));
            }

            if to.exists() {
                return Err(e);
            }

            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)?;
            }

            let mut options = fs_extra::file::CopyOptions::new();
            options.overwrite = false;

            fs_extra::file::move_file(from, to, &options)
                .map(|_| ())
                .map_err(|err| std::io::Error::other(err.to_string()))
        }
    }
}
