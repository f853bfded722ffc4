use std::io::Cursor;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

/// One operator's schedule directory. Mirrors the teacher's `GTFSSource`:
/// a thin wrapper that opens the standard files by name, but tolerant of
/// missing files (they yield an empty row set with a warning) and of a
/// leading UTF-8 BOM, which `csv` does not strip on its own.
pub struct FeedSource {
    dir_path: PathBuf,
}

impl FeedSource {
    pub fn new(dir_path: impl AsRef<Path>) -> FeedSource {
        FeedSource {
            dir_path: dir_path.as_ref().to_path_buf(),
        }
    }

    /// Deserialize every row of `filename` as `T`, or an empty vec (with a
    /// logged warning) if the file is absent.
    pub fn read_rows<T: DeserializeOwned>(&self, filename: &str) -> Vec<T> {
        let path = self.dir_path.join(filename);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                log::warn!("{}: missing or unreadable ({err}), treating as empty", path.display());
                return Vec::new();
            }
        };
        let stripped = contents.strip_prefix('\u{feff}').unwrap_or(&contents);
        let mut reader = csv::ReaderBuilder::new().from_reader(Cursor::new(stripped.as_bytes()));
        let mut rows = Vec::new();
        for result in reader.deserialize::<T>() {
            match result {
                Ok(row) => rows.push(row),
                Err(err) => log::warn!("{}: skipping malformed row: {err}", path.display()),
            }
        }
        rows
    }
}
