use std::fs;

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

/// Partner Center application credentials. All three values are required;
/// nothing can be fetched without a token.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub application_id: String,
    pub application_secret: String,
    /// Azure AD tenant of the partner account.
    pub account_id: String,
}

fn config_path() -> Option<std::path::PathBuf> {
    ProjectDirs::from("", "", "meterline").map(|d| d.config_dir().join("config.toml"))
}

/// Load credentials from config.toml, each key overridable through
/// `METERLINE_APPLICATION_ID`, `METERLINE_APPLICATION_SECRET`, and
/// `METERLINE_ACCOUNT_ID`.
pub fn load_config() -> Result<Config> {
    let mut config = read_config_file()?;

    apply_env("METERLINE_APPLICATION_ID", &mut config.application_id);
    apply_env("METERLINE_APPLICATION_SECRET", &mut config.application_secret);
    apply_env("METERLINE_ACCOUNT_ID", &mut config.account_id);

    for (name, value) in [
        ("application_id", &config.application_id),
        ("application_secret", &config.application_secret),
        ("account_id", &config.account_id),
    ] {
        if value.trim().is_empty() {
            bail!("missing credential `{name}` (set it in the config file or the environment)");
        }
    }

    Ok(config)
}

fn read_config_file() -> Result<Config> {
    let Some(path) = config_path() else {
        // No home directory; the env overrides can still fill everything in.
        return Ok(empty_config());
    };

    let data = match fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(empty_config()),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };

    toml::from_str(&data).with_context(|| format!("invalid config at {}", path.display()))
}

fn empty_config() -> Config {
    Config {
        application_id: String::new(),
        application_secret: String::new(),
        account_id: String::new(),
    }
}

fn apply_env(var: &str, target: &mut String) {
    if let Ok(value) = std::env::var(var) {
        if !value.trim().is_empty() {
            *target = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config: Config = toml::from_str(
            r#"
            application_id = "app-guid"
            application_secret = "s3cret"
            account_id = "tenant-guid"
            "#,
        )
        .unwrap();

        assert_eq!(config.application_id, "app-guid");
        assert_eq!(config.account_id, "tenant-guid");
    }

    #[test]
    fn rejects_partial_config() {
        let parsed: std::result::Result<Config, _> =
            toml::from_str(r#"application_id = "app-guid""#);
        assert!(parsed.is_err());
    }
}
