//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\music-curator\config.toml
//! - macOS: ~/Library/Application Support/music-curator/config.toml
//! - Linux: ~/.config/music-curator/config.toml
//!
//! Every section is optional; missing fields fall back to defaults.
//! Provider credentials may also be supplied through the environment
//! (see the CLI), which takes precedence over the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::acquisition::AcquisitionSettings;
use crate::providers::{ProviderConfig, SpotifyCredentials};
use crate::similarity::MatchWeights;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider credentials (absent = provider disabled)
    pub credentials: Credentials,

    /// Library location and database
    pub library: LibraryConfig,

    /// Metadata provider pacing and limits
    pub providers: ProvidersConfig,

    /// External download tools
    pub acquisition: AcquisitionConfig,

    /// Fuzzy matching weights
    pub matching: MatchWeights,

    /// Genre enrichment
    pub genre: GenreConfig,
}

/// Provider credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Spotify Web API client id
    pub spotify_client_id: Option<String>,
    /// Spotify Web API client secret
    pub spotify_client_secret: Option<String>,
}

/// Library settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Root of the organized music tree
    pub root: Option<PathBuf>,
    /// SQLite database file (defaults to the config directory)
    pub database: Option<PathBuf>,
}

/// Metadata provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Upper bound on every HTTP request
    pub request_timeout_secs: u64,
    /// Pause between paginated Spotify calls
    pub spotify_page_interval_ms: u64,
    /// Spotify page size (API maximum is 50)
    pub spotify_page_size: u32,
    /// Pause between MusicBrainz discography calls
    pub musicbrainz_interval_ms: u64,
    /// Albums read by the fallback provider
    pub fallback_album_limit: u32,
    /// Tracks read by the fallback keyword search
    pub fallback_search_limit: u32,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            spotify_page_interval_ms: 200,
            spotify_page_size: 50,
            musicbrainz_interval_ms: 1100,
            fallback_album_limit: 100,
            fallback_search_limit: 100,
        }
    }
}

/// Download tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Per-tool timeout
    pub timeout_secs: u64,
    /// yt-dlp executable
    pub ytdlp_program: String,
    /// spotdl executable
    pub spotdl_program: String,
    /// Audio format requested from the tools
    pub audio_format: String,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            ytdlp_program: "yt-dlp".to_string(),
            spotdl_program: "spotdl".to_string(),
            audio_format: "mp3".to_string(),
        }
    }
}

/// Genre enrichment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenreConfig {
    /// Mandatory pause before every tag lookup
    pub request_interval_ms: u64,
    /// Tags that are never genres (nationalities, demonyms)
    pub denylist: Vec<String>,
}

/// Nationality and demonym tags commonly attached to artists, plus
/// "seen live".
pub const DEFAULT_GENRE_DENYLIST: &[&str] = &[
    "american", "australian", "belgian", "brazilian", "british", "canadian", "danish", "dutch",
    "english", "finnish", "french", "german", "icelandic", "irish", "italian", "jamaican",
    "japanese", "korean", "mexican", "new zealand", "norwegian", "polish", "russian", "scottish",
    "spanish", "swedish", "uk", "us", "usa", "welsh", "seen live",
];

impl Default for GenreConfig {
    fn default() -> Self {
        Self {
            request_interval_ms: 2000,
            denylist: DEFAULT_GENRE_DENYLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    /// Reject settings that would make every request or tool run fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.providers.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "providers.request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.acquisition.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "acquisition.timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Immutable provider configuration handed to the discography aggregator.
    pub fn provider_config(&self) -> ProviderConfig {
        let spotify = match (
            &self.credentials.spotify_client_id,
            &self.credentials.spotify_client_secret,
        ) {
            (Some(id), Some(secret)) if !id.trim().is_empty() && !secret.trim().is_empty() => {
                Some(SpotifyCredentials {
                    client_id: id.trim().to_string(),
                    client_secret: secret.trim().to_string(),
                })
            }
            _ => None,
        };

        ProviderConfig {
            spotify,
            request_timeout: Duration::from_secs(self.providers.request_timeout_secs),
            spotify_page_interval: Duration::from_millis(self.providers.spotify_page_interval_ms),
            spotify_page_size: self.providers.spotify_page_size.clamp(1, 50),
            musicbrainz_interval: Duration::from_millis(self.providers.musicbrainz_interval_ms),
            fallback_album_limit: self.providers.fallback_album_limit,
            fallback_search_limit: self.providers.fallback_search_limit,
        }
    }

    /// Settings for the acquisition cascade.
    pub fn acquisition_settings(&self) -> AcquisitionSettings {
        AcquisitionSettings {
            timeout: Duration::from_secs(self.acquisition.timeout_secs),
            ytdlp_program: self.acquisition.ytdlp_program.clone(),
            spotdl_program: self.acquisition.spotdl_program.clone(),
            audio_format: self.acquisition.audio_format.clone(),
        }
    }

    /// Override credentials with values from the environment or CLI.
    pub fn with_spotify_credentials(
        mut self,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        if client_id.is_some() {
            self.credentials.spotify_client_id = client_id;
        }
        if client_secret.is_some() {
            self.credentials.spotify_client_secret = client_secret;
        }
        self
    }

    /// Database file, defaulting to the config directory.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.library
            .database
            .clone()
            .or_else(|| config_dir().map(|d| d.join(crate::catalog::DEFAULT_DB_NAME)))
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// `<os config dir>/music-curator`
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("music-curator"))
}

/// Default location of `config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location.
///
/// A missing or unreadable file yields the defaults (logged), never an error.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("No config directory on this platform, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from an explicit file, with the same fallback rules.
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<Config>(&contents) {
            Ok(config) => match config.validate() {
                Ok(()) => {
                    tracing::info!("Loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::error!("Invalid config file {:?}: {}", path, e);
                    tracing::warn!("Falling back to defaults");
                    Config::default()
                }
            },
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Falling back to defaults");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)
}

/// Save configuration to `path`.
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    config.validate()?;

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write to a temp file, then rename over the target
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Config written to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// Tests
// ============================================================================
