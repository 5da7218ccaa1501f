use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Label written as the album artist of various-artists releases when none is configured.
pub const DEFAULT_VARIOUS: &str = "Various";

/// Which warnings are reported.  Passed explicitly to every component that
/// can warn; there is no global switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningPolicy {
    /// Master switch.
    pub enabled: bool,
    /// Tag names outside the canonical vocabulary.
    pub unrecognized: bool,
    /// Tag file lines that matched no file.
    pub unused: bool,
}

impl WarningPolicy {
    pub fn silent() -> Self {
        WarningPolicy {
            enabled: false,
            unrecognized: false,
            unused: false,
        }
    }

    pub fn general(&self) -> bool {
        self.enabled
    }

    pub fn unrecognized(&self) -> bool {
        self.enabled && self.unrecognized
    }

    pub fn unused(&self) -> bool {
        self.enabled && self.unused
    }
}

impl Default for WarningPolicy {
    fn default() -> Self {
        WarningPolicy {
            enabled: true,
            unrecognized: true,
            unused: true,
        }
    }
}

/// Configuration defaults that can be saved to a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub various: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_path_regex: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_path_regex: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub infer_from_path: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_title: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_disc: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_instruments: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub classical: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_musicbrainz: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_block: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_block: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_artists: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_tracks: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_unsupported: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warn_unrecognized: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warn_unused: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Config {
    /// Create a new empty config
    pub fn new() -> Self {
        Config {
            various: None,
            read_path_regex: None,
            apply_path_regex: None,
            infer_from_path: None,
            parse_title: None,
            parse_disc: None,
            remove_instruments: None,
            classical: None,
            call_musicbrainz: None,
            artist_block: None,
            work_block: None,
            track_artists: None,
            break_tracks: None,
            output_unsupported: None,
            warnings: None,
            warn_unrecognized: None,
            warn_unused: None,
            user_agent: None,
        }
    }

    /// The built-in defaults, used below saved defaults and command-line flags.
    pub fn builtin() -> Self {
        Config {
            various: Some(DEFAULT_VARIOUS.to_string()),
            infer_from_path: Some(false),
            parse_title: Some(true),
            parse_disc: Some(false),
            remove_instruments: Some(true),
            classical: Some(false),
            call_musicbrainz: Some(false),
            artist_block: Some(true),
            work_block: Some(false),
            track_artists: Some(false),
            break_tracks: Some(false),
            output_unsupported: Some(false),
            warnings: Some(true),
            warn_unrecognized: Some(true),
            warn_unused: Some(true),
            ..Config::new()
        }
    }

    /// Built-in defaults, then saved defaults, then `cli`.
    pub fn resolve(saved: &Config, cli: &Config) -> Self {
        let mut config = Config::builtin();
        config.merge(saved);
        config.merge(cli);
        config
    }

    /// Get the config file path (~/.state/tagsheet/defaults.toml)
    pub fn get_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "HOME environment variable not set"))?;

        let config_dir = Path::new(&home).join(".state").join("tagsheet");
        Ok(config_dir.join("defaults.toml"))
    }

    /// Load config from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load config from a file.  A missing file gives an empty config.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(path, toml_string)?;

        Ok(())
    }

    /// Merge this config with another, preferring values from other
    pub fn merge(&mut self, other: &Config) {
        if other.various.is_some() {
            self.various = other.various.clone();
        }
        if other.read_path_regex.is_some() {
            self.read_path_regex = other.read_path_regex.clone();
        }
        if other.apply_path_regex.is_some() {
            self.apply_path_regex = other.apply_path_regex.clone();
        }
        if other.user_agent.is_some() {
            self.user_agent = other.user_agent.clone();
        }

        let flags = [
            (&mut self.infer_from_path, other.infer_from_path),
            (&mut self.parse_title, other.parse_title),
            (&mut self.parse_disc, other.parse_disc),
            (&mut self.remove_instruments, other.remove_instruments),
            (&mut self.classical, other.classical),
            (&mut self.call_musicbrainz, other.call_musicbrainz),
            (&mut self.artist_block, other.artist_block),
            (&mut self.work_block, other.work_block),
            (&mut self.track_artists, other.track_artists),
            (&mut self.break_tracks, other.break_tracks),
            (&mut self.output_unsupported, other.output_unsupported),
            (&mut self.warnings, other.warnings),
            (&mut self.warn_unrecognized, other.warn_unrecognized),
            (&mut self.warn_unused, other.warn_unused),
        ];
        for (mine, theirs) in flags {
            if theirs.is_some() {
                *mine = theirs;
            }
        }
    }

    /// Label for various-artists releases.
    pub fn various_label(&self) -> &str {
        self.various.as_deref().unwrap_or(DEFAULT_VARIOUS)
    }

    pub fn warning_policy(&self) -> WarningPolicy {
        WarningPolicy {
            enabled: self.warnings.unwrap_or(true),
            unrecognized: self.warn_unrecognized.unwrap_or(true),
            unused: self.warn_unused.unwrap_or(true),
        }
    }

    /// Print the config in a human-readable format
    pub fn print(&self, title: &str) {
        println!("{}:", title);

        let on_off = |flag: bool| if flag { "enabled" } else { "disabled" };

        if let Some(various) = &self.various {
            println!("  Various artists:    {}", various);
        }
        if let Some(regex) = &self.read_path_regex {
            println!("  Read path regex:    {}", regex);
        }
        if let Some(regex) = &self.apply_path_regex {
            println!("  Apply path regex:   {}", regex);
        }
        if let Some(user_agent) = &self.user_agent {
            println!("  User agent:         {}", user_agent);
        }

        let flags = [
            ("Infer from path:", self.infer_from_path),
            ("Parse title:", self.parse_title),
            ("Parse disc:", self.parse_disc),
            ("Strip instruments:", self.remove_instruments),
            ("Classical:", self.classical),
            ("MusicBrainz:", self.call_musicbrainz),
            ("Artist block:", self.artist_block),
            ("Work block:", self.work_block),
            ("Track artists:", self.track_artists),
            ("Break tracks:", self.break_tracks),
            ("Unsupported tags:", self.output_unsupported),
            ("Warnings:", self.warnings),
            ("Unrecognized warn:", self.warn_unrecognized),
            ("Unused warn:", self.warn_unused),
        ];
        for (label, value) in flags {
            if let Some(flag) = value {
                println!("  {:<19} {}", label, on_off(flag));
            }
        }
    }
}

/// Handle `--show-defaults` and `--save-defaults`.
///
/// # Returns
/// `true` when one of them ran and the tool should exit.
pub fn handle_defaults_flags(saved: &Config, cli: &Config, show: bool, save: bool) -> Result<bool> {
    if show {
        Config::builtin().print("Built-in defaults");
        println!();
        let config_path = Config::get_config_path()?;
        if config_path.exists() {
            saved.print(&format!("Saved defaults from {:?}", config_path));
        } else {
            println!("No saved defaults file found at {:?}", config_path);
            println!("Use --save-defaults to create one.");
        }
        return Ok(true);
    }

    if save {
        let mut config_to_save = saved.clone();
        config_to_save.merge(cli);
        config_to_save.save()?;
        println!("Defaults saved to {:?}", Config::get_config_path()?);
        println!();
        config_to_save.print("Saved configuration");
        return Ok(true);
    }

    Ok(false)
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
