use crate::events::AppEvent;
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{EventKind, RecursiveMode, Watcher};
use nui::CallName;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StubConfig {
    pub name: CallName,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub socket: PathBuf,
    pub timeout_ms: u64,
    pub stubs: Vec<StubConfig>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            socket: PathBuf::from(nui::DEFAULT_SOCKET),
            timeout_ms: 5000,
            stubs: Vec::new(),
        }
    }
}

impl BridgeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn stub_table(&self) -> impl Iterator<Item = (CallName, Value)> + '_ {
        self.stubs.iter().map(|s| (s.name.clone(), s.value.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocaleConfig {
    pub more: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            more: "More...".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub locale: LocaleConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config watch error: {0}")]
    Watch(#[from] notify::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "nui", "overlay").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// `OVERLAY_<SECTION>__<KEY>`, e.g. `OVERLAY_BRIDGE__TIMEOUT_MS=2000`.
fn env_overrides() -> config::Environment {
    config::Environment::with_prefix("OVERLAY")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn layered<S>(file: S, env: config::Environment) -> Result<Config, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let s = config::Config::builder()
        .add_source(file)
        .add_source(env)
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;
    layered(
        config::File::from(config_path).required(false),
        env_overrides(),
    )
}

pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Using default configuration: {}", e);
            Config::default()
        }
    }
}

/// Writes the commented defaults unless a config file is already there.
pub fn write_default_config() -> Result<PathBuf, ConfigError> {
    let path = get_config_path()?;
    if path.exists() {
        log::info!("{} already exists, left untouched", path.display());
        return Ok(path);
    }
    if let Some(dir) = path.parent() {
        fs_err::create_dir_all(dir)?;
    }
    fs_err::write(&path, DEFAULT_CONFIG)?;
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Sends [`AppEvent::ConfigReload`] whenever the config file changes.
pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    if let Err(e) = watch_config(tx).await {
        log::error!("Config watcher stopped: {}", e);
    }
}

async fn watch_config(tx: Sender<AppEvent>) -> Result<(), ConfigError> {
    let config_path = get_config_path()?;
    let config_dir = config_path
        .parent()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .to_path_buf();
    fs_err::create_dir_all(&config_dir)?;

    let (fs_tx, fs_rx) = async_channel::unbounded();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let _ = fs_tx.send_blocking(res);
    })?;
    watcher.watch(&config_dir, RecursiveMode::NonRecursive)?;
    log::debug!("watching {}", config_path.display());

    while let Ok(res) = fs_rx.recv().await {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Watch error: {}", e);
                continue;
            }
        };
        if !touches(&event, &config_path) {
            continue;
        }
        // One reload per burst of queued writes.
        while fs_rx.try_recv().is_ok() {}
        if tx.send(AppEvent::ConfigReload).await.is_err() {
            break;
        }
    }
    Ok(())
}

fn touches(event: &notify::Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_with_env(toml: &str, vars: &[(&str, &str)]) -> Config {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        layered(
            config::File::from_str(toml, config::FileFormat::Toml),
            env_overrides().source(Some(vars)),
        )
        .unwrap()
    }

    fn parse(toml: &str) -> Config {
        parse_with_env(toml, &[])
    }

    #[test]
    fn shipped_config_matches_defaults() {
        assert_eq!(parse(DEFAULT_CONFIG), Config::default());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse("");
        assert_eq!(config.bridge.timeout(), Duration::from_secs(5));
        assert_eq!(config.locale.more, "More...");
    }

    #[test]
    fn stubs_keep_call_names_and_values() {
        let config = parse(
            r#"
            [bridge]
            timeout_ms = 250

            [[bridge.stubs]]
            name = "radialTransition"
            value = true

            [[bridge.stubs]]
            name = "radialClick"
            "#,
        );
        assert_eq!(config.bridge.timeout(), Duration::from_millis(250));
        let stubs: Vec<_> = config.bridge.stub_table().collect();
        assert_eq!(
            stubs,
            [
                (CallName::from("radialTransition"), json!(true)),
                (CallName::from("radialClick"), Value::Null),
            ]
        );
    }

    #[test]
    fn environment_overrides_the_file() {
        let config = parse_with_env(
            "[bridge]\ntimeout_ms = 250\n",
            &[
                ("OVERLAY_BRIDGE__TIMEOUT_MS", "2000"),
                ("OVERLAY_LOCALE__MORE", "Mais..."),
                ("OTHER_BRIDGE__TIMEOUT_MS", "1"),
            ],
        );
        assert_eq!(config.bridge.timeout(), Duration::from_secs(2));
        assert_eq!(config.locale.more, "Mais...");
        assert_eq!(config.bridge.socket, PathBuf::from(nui::DEFAULT_SOCKET));
    }

    #[test]
    fn watcher_reacts_to_the_config_file_only() {
        use notify::event::{AccessKind, CreateKind, ModifyKind};

        const FILE: &str = "/home/me/.config/overlay/config.toml";
        let path = PathBuf::from(FILE);
        let event = |kind, file: &str| notify::Event::new(kind).add_path(PathBuf::from(file));

        assert!(touches(&event(EventKind::Modify(ModifyKind::Any), FILE), &path));
        assert!(touches(&event(EventKind::Create(CreateKind::File), FILE), &path));
        assert!(!touches(&event(EventKind::Access(AccessKind::Any), FILE), &path));
        let swap = "/home/me/.config/overlay/.config.toml.swp";
        assert!(!touches(&event(EventKind::Modify(ModifyKind::Any), swap), &path));
    }
}
