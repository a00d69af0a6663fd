//! `qrbatch url` – print the verification URL for one identifier.

use anyhow::{bail, Result};
use qrbatch_core::config::{QrBatchConfig, SecretMode};
use qrbatch_core::encoder::{self, EncoderSettings, RenderOptions};
use qrbatch_core::input::Identifier;

pub fn run_url(
    cfg: &QrBatchConfig,
    identifier: &str,
    secret: Option<&str>,
    data_uri: bool,
) -> Result<()> {
    let Some(id) = Identifier::parse(identifier) else {
        bail!("invalid identifier \"{identifier}\" (only digits are allowed)");
    };
    let secret = cfg.secret_mode.resolve(secret)?;
    if cfg.secret_mode == SecretMode::User && secret.is_empty() {
        bail!("a secret is required (--secret)");
    }

    let settings = EncoderSettings {
        base_url: cfg.base_url.clone(),
        render: RenderOptions {
            size: cfg.image_size,
            margin: cfg.margin,
        },
    };
    let record = encoder::encode(&id, &secret, &settings)?;
    println!("{}", record.url);
    if data_uri {
        println!("{}", record.data_uri());
    }
    Ok(())
}
