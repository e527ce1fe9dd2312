//! Seals a plaintext ledger file into its `.enc` container, or unseals
//! an existing container, using the same key resolution as the viewer.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::info;

use viewer_core::{discovery, is_encrypted_path, ViewerConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let Some(input) = std::env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: seal <ledger-file>  (plaintext is sealed to <ledger-file>.enc, .enc files are unsealed)");
    };

    let config = ViewerConfig::load()?;
    let key_path = config
        .key_file
        .clone()
        .or_else(discovery::locate_key_file)
        .context("no encryption key configured or discoverable next to the executable")?;

    let mut vault = vault::Vault::new();
    vault
        .load_key(&key_path)
        .with_context(|| format!("cannot load key from {}", key_path.display()))?;

    let raw =
        std::fs::read(&input).with_context(|| format!("cannot read {}", input.display()))?;

    let (bytes, output) = if is_encrypted_path(&input) {
        let plain = vault
            .decrypt(&raw)
            .with_context(|| format!("cannot unseal {}", input.display()))?;
        (plain, input.with_extension(""))
    } else {
        let sealed = vault
            .encrypt(&raw)
            .with_context(|| format!("cannot seal {}", input.display()))?;
        let mut name = input.clone().into_os_string();
        name.push(".enc");
        (sealed, PathBuf::from(name))
    };

    std::fs::write(&output, bytes)
        .with_context(|| format!("cannot write {}", output.display()))?;
    info!(input = %input.display(), output = %output.display(), "container rewritten");
    println!("{} -> {}", input.display(), output.display());
    Ok(())
}
