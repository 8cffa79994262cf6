//! Log file handling for the file output

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use crate::logger::config::FileConfig;

/// Opens the configured log file, creating parent directories first
///
/// The returned `Mutex<File>` is used directly as the layer's writer.
pub(crate) fn open_file_writer(config: &FileConfig) -> io::Result<Mutex<File>> {
    if let Some(parent) = config.path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    open_log_file(&config.path, config.append).map(Mutex::new)
}

fn open_log_file(path: &Path, append: bool) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
}
