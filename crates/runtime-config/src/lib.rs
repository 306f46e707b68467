//! Harness configuration types.
//!
//! `lmsprobe.toml` is read by the CLI and by the live test suite. Every field
//! has a default, so an empty file (or no file) yields a config pointing at a
//! local deployment. Environment variables override the file afterwards, see
//! [`apply_env_overrides`].

use serde::{Deserialize, Serialize};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "lmsprobe.toml";

pub const ENV_BASE_URL: &str = "LMSPROBE_BASE_URL";
pub const ENV_API_KEY: &str = "LMSPROBE_API_KEY";
pub const ENV_AUTH_URL: &str = "LMSPROBE_AUTH_URL";
pub const ENV_ADMIN_USER: &str = "LMSPROBE_ADMIN_USER";
pub const ENV_ADMIN_PASSWORD: &str = "LMSPROBE_ADMIN_PASSWORD";
pub const ENV_TEMPLATES: &str = "LMSPROBE_TEMPLATES";
pub const ENV_STRICT: &str = "LMSPROBE_STRICT";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HarnessConfig {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub fixtures: FixtureSettings,
    #[serde(default)]
    pub templates: TemplateSettings,
    #[serde(default)]
    pub validation: ValidationSettings,
    #[serde(default)]
    pub runner: RunnerSettings,
}

impl HarnessConfig {
    /// Token issuer base URL; falls back to the service URL.
    pub fn auth_base_url(&self) -> &str {
        if self.auth.base_url.is_empty() {
            &self.service.base_url
        } else {
            &self.auth.base_url
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sent as `Authorization: Bearer <api_key>` when non-empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub route: RouteMode,
    /// Applies to connect and read of every call. No retries.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            route: RouteMode::Gateway,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Which path family requests use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
    /// Through the API gateway (`/api/course/v1/...`).
    #[default]
    Gateway,
    /// Straight to the LMS service (`/v1/course/...`).
    #[serde(alias = "direct")]
    Lms,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Empty means "same host as the service".
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_realm")]
    pub realm: String,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            realm: default_realm(),
            client_id: default_client_id(),
            username: String::new(),
            password: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSettings {
    #[serde(default = "default_root_org_channel")]
    pub root_org_channel: String,
    #[serde(default = "default_root_org_name")]
    pub root_org_name: String,
    /// Existing resource attached to every provisioned course unit.
    #[serde(default = "default_resource_id")]
    pub resource_id: String,
    #[serde(default = "default_user_password")]
    pub user_password: String,
    /// `endDate` is seeded as today plus this many days.
    #[serde(default = "default_batch_days")]
    pub batch_days: i64,
}

impl Default for FixtureSettings {
    fn default() -> Self {
        Self {
            root_org_channel: default_root_org_channel(),
            root_org_name: default_root_org_name(),
            resource_id: default_resource_id(),
            user_password: default_user_password(),
            batch_days: default_batch_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSettings {
    #[serde(default = "default_template_root")]
    pub root: String,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            root: default_template_root(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationSettings {
    /// Report fields present in the response but absent from the template.
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerSettings {
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self { parallel: true }
    }
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_base_url() -> String {
    "http://localhost:9000".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_realm() -> String {
    "sunbird".to_string()
}
fn default_client_id() -> String {
    "admin-cli".to_string()
}
fn default_root_org_channel() -> String {
    "ft_root_channel".to_string()
}
fn default_root_org_name() -> String {
    "FT Root Org".to_string()
}
fn default_resource_id() -> String {
    "do_ft_resource".to_string()
}
fn default_user_password() -> String {
    "Password@123".to_string()
}
fn default_batch_days() -> i64 {
    30
}
fn default_template_root() -> String {
    "templates".to_string()
}

/// Apply `LMSPROBE_*` environment overrides.
/// Returns true when any field was updated.
pub fn apply_env_overrides(config: &mut HarnessConfig) -> bool {
    apply_overrides_from(config, |key| std::env::var(key).ok())
}

/// Same as [`apply_env_overrides`] with an explicit variable source.
pub fn apply_overrides_from<F>(config: &mut HarnessConfig, lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let mut changed = false;

    let mut set = |slot: &mut String, key: &str| {
        if let Some(value) = get(key) {
            *slot = value;
            changed = true;
        }
    };
    set(&mut config.service.base_url, ENV_BASE_URL);
    set(&mut config.service.api_key, ENV_API_KEY);
    set(&mut config.auth.base_url, ENV_AUTH_URL);
    set(&mut config.auth.username, ENV_ADMIN_USER);
    set(&mut config.auth.password, ENV_ADMIN_PASSWORD);
    set(&mut config.templates.root, ENV_TEMPLATES);

    if let Some(value) = get(ENV_STRICT) {
        config.validation.strict = matches!(value.as_str(), "1" | "true" | "yes");
        changed = true;
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg: HarnessConfig = toml::from_str("").expect("parse toml");
        assert_eq!(cfg.service.base_url, "http://localhost:9000");
        assert_eq!(cfg.service.route, RouteMode::Gateway);
        assert_eq!(cfg.service.timeout_secs, 30);
        assert_eq!(cfg.auth.realm, "sunbird");
        assert_eq!(cfg.fixtures.batch_days, 30);
        assert!(!cfg.validation.strict);
        assert!(cfg.runner.parallel);
    }

    #[test]
    fn sections_deserialize_from_toml() {
        let cfg: HarnessConfig = toml::from_str(
            r#"
[service]
base_url = "https://staging.example.org"
api_key = "key"
route = "direct"
timeout_secs = 5

[auth]
base_url = "https://auth.example.org"
username = "admin"
password = "secret"

[fixtures]
root_org_channel = "staging_channel"

[validation]
strict = true

[runner]
parallel = false
"#,
        )
        .expect("parse toml");

        assert_eq!(cfg.service.route, RouteMode::Lms);
        assert_eq!(cfg.service.timeout_secs, 5);
        assert_eq!(cfg.auth_base_url(), "https://auth.example.org");
        assert_eq!(cfg.auth.client_id, "admin-cli");
        assert_eq!(cfg.fixtures.root_org_channel, "staging_channel");
        assert_eq!(cfg.fixtures.resource_id, "do_ft_resource");
        assert!(cfg.validation.strict);
        assert!(!cfg.runner.parallel);
    }

    #[test]
    fn auth_url_falls_back_to_service() {
        let cfg = HarnessConfig::default();
        assert_eq!(cfg.auth_base_url(), cfg.service.base_url);
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_BASE_URL, "http://lms:9000"),
            (ENV_ADMIN_USER, "ft-admin"),
            (ENV_STRICT, "true"),
            (ENV_API_KEY, "   "),
        ]);
        let mut cfg = HarnessConfig::default();
        cfg.service.api_key = "from-file".into();

        let changed = apply_overrides_from(&mut cfg, |k| env.get(k).map(|v| v.to_string()));
        assert!(changed);
        assert_eq!(cfg.service.base_url, "http://lms:9000");
        assert_eq!(cfg.auth.username, "ft-admin");
        assert_eq!(cfg.service.api_key, "from-file");
        assert!(cfg.validation.strict);
    }

    #[test]
    fn no_overrides_is_noop() {
        let mut cfg = HarnessConfig::default();
        assert!(!apply_overrides_from(&mut cfg, |_| None));
        assert_eq!(cfg.service.base_url, default_base_url());
    }
}
