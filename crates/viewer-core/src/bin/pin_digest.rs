//! Prints the code-region SHA-256 of an executable on disk, in the hex
//! form expected by `LEDGERGUARD_PINNED_CODE_SHA256` and the config
//! file's `pinned_code_sha256` key.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use self_protect::measure_executable_file;

fn main() -> Result<()> {
    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: pin-digest <executable>");
    };

    let digest = measure_executable_file(&path)
        .map_err(|detail| anyhow::anyhow!(detail))
        .with_context(|| format!("cannot measure {}", path.display()))?;
    println!("{digest}");
    Ok(())
}
