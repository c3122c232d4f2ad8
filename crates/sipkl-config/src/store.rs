use std::env;
use std::path::PathBuf;

/// Location of the workbook file. `None` keeps everything in memory.
#[derive(Clone, Debug, Default)]
pub struct StoreConfig {
    pub workbook_path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let workbook_path = match env::var("WORKBOOK_PATH") {
            Ok(path) if path.trim() == ":memory:" => None,
            Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path.trim())),
            _ => Some(PathBuf::from("storage/workbook.json")),
        };

        Self { workbook_path }
    }
}
