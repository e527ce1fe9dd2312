//! Core wiring for the ledgerguard invoice viewer: configuration, path
//! discovery, and the protected load pipeline that gates every ledger
//! open behind the self-integrity check.

mod config;
pub mod discovery;
mod pick;
mod present;
mod service;

pub use config::{Enforcement, ViewerConfig};
pub use pick::{requested_data_file, ArgsPicker, FilePicker};
pub use present::{render_table, LedgerPresenter, TablePresenter};
pub use service::{is_encrypted_path, Ledger, LedgerService, LoadError};
