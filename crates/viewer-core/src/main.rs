use anyhow::{Context, Result};
use tracing::{error, info, warn};

use viewer_core::{
    discovery, requested_data_file, ArgsPicker, Enforcement, FilePicker, LedgerPresenter,
    LedgerService, LoadError, TablePresenter, ViewerConfig,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = ViewerConfig::load()?;
    let service = LedgerService::from_config(&config);

    info!(
        enforcement = ?config.enforcement,
        block_on_debugger = config.block_on_debugger,
        encryption_ready = service.vault().is_ready(),
        "ledgerguard viewer started"
    );

    let requested = requested_data_file(ArgsPicker.pick(), &config);
    let was_requested = requested.is_some();
    let path = requested.unwrap_or_else(discovery::locate_data_file);

    let ledger = match service.open(&path) {
        Ok(ledger) => ledger,
        Err(LoadError::IntegrityBlocked { summary }) => {
            error!(%summary, "refusing to show ledger data");
            if config.enforcement == Enforcement::Terminate {
                std::process::exit(2);
            }
            anyhow::bail!("protection gate refused the load: {summary}");
        }
        Err(LoadError::Io { path, source })
            if source.kind() == std::io::ErrorKind::NotFound && !was_requested =>
        {
            // The default ledger not shipping alongside the viewer is a
            // setup gap, not a failure.
            warn!(path = %path.display(), "default ledger file not found");
            println!("No ledger loaded. Expected data file: {}", path.display());
            return Ok(());
        }
        Err(err) => return Err(err).context("ledger stays unloaded"),
    };

    TablePresenter.present(&ledger);
    Ok(())
}
