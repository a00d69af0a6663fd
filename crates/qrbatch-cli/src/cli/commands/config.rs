//! `qrbatch config` – show config path and effective values.

use anyhow::Result;
use qrbatch_core::config::{self, QrBatchConfig};

pub fn run_config(cfg: &QrBatchConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
