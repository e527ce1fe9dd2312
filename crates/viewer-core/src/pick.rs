use std::path::PathBuf;

use crate::config::ViewerConfig;

/// Source of the user's chosen ledger path. `None` means nothing was
/// picked, which callers treat as "keep whatever is loaded".
pub trait FilePicker {
    fn pick(&self) -> Option<PathBuf>;
}

/// Picks the first command-line argument, when present.
#[derive(Debug, Default)]
pub struct ArgsPicker;

impl FilePicker for ArgsPicker {
    fn pick(&self) -> Option<PathBuf> {
        std::env::args_os().nth(1).map(PathBuf::from)
    }
}

/// The explicitly requested ledger path for this run, if any: a picked
/// path wins over the configured `data_file`. `None` means no path was
/// asked for and the default location gets discovered on disk instead.
pub fn requested_data_file(picked: Option<PathBuf>, config: &ViewerConfig) -> Option<PathBuf> {
    picked.or_else(|| config.data_file.clone())
}
