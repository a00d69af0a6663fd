use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Secret used when `secret_mode = "builtin"`.
pub const BUILTIN_SECRET: &str = "vant.plus/check";

/// Largest accepted `image_size`, in pixels.
pub const MAX_IMAGE_SIZE: u32 = 8192;

/// Where the hashing secret comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretMode {
    /// Fixed built-in constant; supplying a secret is an error.
    #[default]
    Builtin,
    /// Caller must supply a non-empty secret for every run.
    User,
}

impl SecretMode {
    /// Pick the secret for a run. In `User` mode an absent secret resolves to the
    /// empty string, which the run rejects before any batch starts. A secret
    /// supplied in `Builtin` mode is an error rather than silently replaced.
    pub fn resolve(self, supplied: Option<&str>) -> Result<String> {
        match (self, supplied) {
            (SecretMode::Builtin, Some(_)) => bail!(
                "secret_mode is \"builtin\"; set secret_mode = \"user\" in the config to use --secret"
            ),
            (SecretMode::Builtin, None) => Ok(BUILTIN_SECRET.to_string()),
            (SecretMode::User, supplied) => Ok(supplied.unwrap_or_default().to_string()),
        }
    }
}

/// Global configuration loaded from `~/.config/qrbatch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QrBatchConfig {
    /// Prefix of the verification URL embedded in every QR code.
    pub base_url: String,
    /// Maximum number of images per archive.
    pub batch_size: usize,
    /// Pause between two archives, in seconds.
    pub batch_delay_secs: u64,
    /// Edge length of each PNG in pixels.
    pub image_size: u32,
    /// Quiet zone around the symbol, in modules.
    pub margin: u32,
    /// Built-in or user-supplied hashing secret.
    pub secret_mode: SecretMode,
    /// Directory archives are written to (None = current directory).
    pub output_dir: Option<PathBuf>,
}

impl Default for QrBatchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://check.vant.plus".to_string(),
            batch_size: 2000,
            batch_delay_secs: 10,
            image_size: 400,
            margin: 2,
            secret_mode: SecretMode::Builtin,
            output_dir: None,
        }
    }
}

impl QrBatchConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_secs(self.batch_delay_secs)
    }

    /// Reject values no run could work with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.image_size == 0 || self.image_size > MAX_IMAGE_SIZE {
            bail!(
                "image_size must be between 1 and {}, got {}",
                MAX_IMAGE_SIZE,
                self.image_size
            );
        }
        let url = url::Url::parse(&self.base_url)
            .with_context(|| format!("invalid base_url: {:?}", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("base_url must be http or https, got {}", url.scheme());
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("qrbatch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<QrBatchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = QrBatchConfig::default();
        default_cfg.validate()?;
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: QrBatchConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = QrBatchConfig::default();
        assert_eq!(cfg.base_url, "https://check.vant.plus");
        assert_eq!(cfg.batch_size, 2000);
        assert_eq!(cfg.batch_delay(), Duration::from_secs(10));
        assert_eq!(cfg.image_size, 400);
        assert_eq!(cfg.margin, 2);
        assert_eq!(cfg.secret_mode, SecretMode::Builtin);
        assert!(cfg.output_dir.is_none());
        cfg.validate().unwrap();
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = QrBatchConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: QrBatchConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.base_url, cfg.base_url);
        assert_eq!(parsed.batch_size, cfg.batch_size);
        assert_eq!(parsed.batch_delay_secs, cfg.batch_delay_secs);
        assert_eq!(parsed.secret_mode, cfg.secret_mode);
    }

    #[test]
    fn config_toml_partial_uses_defaults() {
        let toml = r#"
            batch_size = 500
            secret_mode = "user"
            output_dir = "/tmp/qr"
        "#;
        let cfg: QrBatchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.batch_size, 500);
        assert_eq!(cfg.secret_mode, SecretMode::User);
        assert_eq!(cfg.output_dir.as_deref(), Some(std::path::Path::new("/tmp/qr")));
        assert_eq!(cfg.image_size, 400);
        assert_eq!(cfg.batch_delay_secs, 10);
    }

    #[test]
    fn validate_rejects_zero_batch_size_and_bad_url() {
        let cfg = QrBatchConfig {
            batch_size: 0,
            ..QrBatchConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = QrBatchConfig {
            base_url: "ftp://check.vant.plus".to_string(),
            ..QrBatchConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = QrBatchConfig {
            base_url: String::new(),
            ..QrBatchConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_bounds_image_size() {
        let cases = [
            (0, false),
            (1, true),
            (MAX_IMAGE_SIZE, true),
            (MAX_IMAGE_SIZE + 1, false),
            (200_000, false),
        ];
        for (size, ok) in cases {
            let cfg = QrBatchConfig {
                image_size: size,
                ..QrBatchConfig::default()
            };
            assert_eq!(cfg.validate().is_ok(), ok, "image_size={size}");
        }
    }

    #[test]
    fn secret_mode_resolution() {
        assert_eq!(SecretMode::Builtin.resolve(None).unwrap(), BUILTIN_SECRET);
        assert_eq!(SecretMode::User.resolve(Some("pw")).unwrap(), "pw");
        assert_eq!(SecretMode::User.resolve(Some("  ")).unwrap(), "  ");
        assert_eq!(SecretMode::User.resolve(None).unwrap(), "");
    }

    #[test]
    fn builtin_mode_rejects_supplied_secret() {
        let err = SecretMode::Builtin.resolve(Some("mine")).unwrap_err();
        assert!(err.to_string().contains("secret_mode"));
    }
}
