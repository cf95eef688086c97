use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_DESIRED_MODE: &str = "rw-r--r--";
pub const DEFAULT_PROBLEMATIC_CHARS: &str = ":\"\\;*?$#'|";
pub const DEFAULT_SUBSTITUTE_CHAR: &str = ".";
pub const DEFAULT_TEMP_EXTENSIONS: [&str; 2] = [".tmp", "~"];

const LOCAL_CONFIG_NAME: &str = "clean_files";
const HOME_CONFIG_FILE: &str = ".clean_files.toml";
const LEGACY_CONFIG_FILE: &str = ".clean_files";
const ENV_PREFIX: &str = "CLEAN_FILES";

/// Immutable settings shared by every policy in a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Nine-character symbolic mode, e.g. `rw-r--r--`.
    pub desired_mode: String,
    pub problematic_chars: String,
    pub substitute_char: String,
    #[serde(deserialize_with = "deserialize_extensions")]
    pub temp_extensions: Vec<String>,
    pub ignore_patterns: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            desired_mode: DEFAULT_DESIRED_MODE.to_string(),
            problematic_chars: DEFAULT_PROBLEMATIC_CHARS.to_string(),
            substitute_char: DEFAULT_SUBSTITUTE_CHAR.to_string(),
            temp_extensions: DEFAULT_TEMP_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            ignore_patterns: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExtensionList {
    List(Vec<String>),
    Joined(String),
}

/// Accepts a TOML array or the legacy comma separated form (`.tmp, ~`).
fn deserialize_extensions<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match ExtensionList::deserialize(deserializer)? {
        ExtensionList::List(items) => items,
        ExtensionList::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    };
    Ok(items
        .into_iter()
        .map(|ext| ext.trim().to_string())
        .filter(|ext| !ext.is_empty())
        .collect())
}

/// Layered load: `$HOME/.clean_files.toml`, then `clean_files.toml` in the
/// working directory, then `CLEAN_FILES_*` environment variables. An explicit
/// path replaces both file sources and must exist.
pub fn load_configuration(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    match explicit {
        Some(path) => {
            builder = builder.add_source(ConfigFile::from(path).required(true));
        }
        None => {
            let home = std::env::var_os("HOME").map(PathBuf::from);
            for legacy in legacy_config_files(home.as_deref(), Path::new(".")) {
                warn!(
                    "Ignoring {}: settings are read from {} or {}.toml",
                    legacy.display(),
                    HOME_CONFIG_FILE,
                    LOCAL_CONFIG_NAME
                );
            }
            if let Some(home) = home {
                builder = builder.add_source(
                    ConfigFile::from(home.join(HOME_CONFIG_FILE)).required(false),
                );
            }
            builder = builder.add_source(ConfigFile::with_name(LOCAL_CONFIG_NAME).required(false));
        }
    }

    let builder = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Existing `.clean_files` files (untyped `key = value` form) in the home and
/// working directories. They are not loaded.
pub fn legacy_config_files(home: Option<&Path>, cwd: &Path) -> Vec<PathBuf> {
    home.into_iter()
        .chain(std::iter::once(cwd))
        .map(|dir| dir.join(LEGACY_CONFIG_FILE))
        .filter(|path| path.is_file())
        .collect()
}

/// Remove directories that are subdirectories of other directories in the list.
/// Repeated roots collapse to one.
pub fn non_overlapping_directories(dirs: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for dir in dirs {
        if result.iter().any(|kept| dir.starts_with(kept)) {
            continue;
        }
        result.retain(|kept| !kept.starts_with(&dir));
        result.push(dir);
    }

    result
}
