use anyhow::{Context, Result};
use lmsprobe_runtime_config::{apply_env_overrides, HarnessConfig, CONFIG_FILE_NAME};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Effective configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: HarnessConfig,
    /// Config file that was read, if any.
    pub source: Option<PathBuf>,
    pub env_applied: bool,
}

/// Load `explicit`, else `./lmsprobe.toml` when present, else defaults; then
/// apply `LMSPROBE_*` environment overrides.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let source = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            local.exists().then_some(local)
        }
    };

    let mut config = match &source {
        Some(path) => read_config(path)?,
        None => HarnessConfig::default(),
    };
    let env_applied = apply_env_overrides(&mut config);

    Ok(LoadedConfig {
        config,
        source,
        env_applied,
    })
}

fn read_config(path: &Path) -> Result<HarnessConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config at {}", path.display()))
}

impl LoadedConfig {
    /// Template root. Relative paths resolve against the config file's
    /// directory; a missing root falls back to the templates bundled with
    /// the catalog.
    pub fn template_root(&self) -> PathBuf {
        let root = PathBuf::from(&self.config.templates.root);
        let resolved = if root.is_absolute() {
            root
        } else {
            match self.source.as_deref().and_then(Path::parent) {
                Some(dir) if !dir.as_os_str().is_empty() => dir.join(root),
                _ => root,
            }
        };
        if resolved.is_dir() {
            resolved
        } else {
            let bundled = lmsprobe_e2e::bundled_templates_dir();
            warn!(
                root = %resolved.display(),
                fallback = %bundled.display(),
                "template root not found, using bundled templates"
            );
            bundled
        }
    }
}

/// Print the effective config as TOML with secrets masked.
pub fn show_config(loaded: &LoadedConfig) -> Result<()> {
    match &loaded.source {
        Some(path) => println!("# config: {}", path.display()),
        None => println!("# config: defaults (no {CONFIG_FILE_NAME} found)"),
    }
    if loaded.env_applied {
        println!("# LMSPROBE_* environment overrides applied");
    }

    let mut shown = loaded.config.clone();
    mask(&mut shown.service.api_key);
    mask(&mut shown.auth.password);
    mask(&mut shown.fixtures.user_password);
    let rendered = toml::to_string_pretty(&shown).context("Failed to serialize config")?;
    print!("{rendered}");
    Ok(())
}

fn mask(secret: &mut String) {
    if !secret.is_empty() {
        *secret = "********".to_string();
    }
}
