use crate::index::{BUCKET_REFINE_THRESHOLD, MAX_SORT_DEPTH};
use crate::token::{Encoding, TokenFileOptions, TokenizerKind, DEFAULT_MAX_CHAR_BYTES};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "tokidx";
const CONFIG_FILE: &str = "config.json";

/// Tool configuration stored in the user's config directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Characters per bucketing round when building an index
    #[serde(default = "default_ngram")]
    pub ngram: usize,

    #[serde(default)]
    pub tokenizer: TokenizerKind,

    /// Encoding name for the char and word tokenizers
    #[serde(default = "default_encoding")]
    pub encoding: String,

    #[serde(default = "default_max_char_bytes")]
    pub max_char_bytes: usize,

    /// Bucket size at which index refinement re-buckets instead of sorting
    #[serde(default = "default_refine_threshold")]
    pub refine_threshold: usize,

    /// Leading characters the index is ordered by
    #[serde(default = "default_sort_depth")]
    pub sort_depth: u64,

    /// Minimum fitness for a mined prefix
    #[serde(default = "default_mining_threshold")]
    pub mining_threshold: i64,

    /// Most mined prefixes put in a dictionary
    #[serde(default = "default_max_dictionary_size")]
    pub max_dictionary_size: usize,
}

fn default_ngram() -> usize {
    2
}

fn default_encoding() -> String {
    Encoding::Utf8.name().to_string()
}

fn default_max_char_bytes() -> usize {
    DEFAULT_MAX_CHAR_BYTES
}

fn default_refine_threshold() -> usize {
    BUCKET_REFINE_THRESHOLD
}

fn default_sort_depth() -> u64 {
    MAX_SORT_DEPTH
}

fn default_mining_threshold() -> i64 {
    200
}

fn default_max_dictionary_size() -> usize {
    256
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ngram: default_ngram(),
            tokenizer: TokenizerKind::default(),
            encoding: default_encoding(),
            max_char_bytes: default_max_char_bytes(),
            refine_threshold: default_refine_threshold(),
            sort_depth: default_sort_depth(),
            mining_threshold: default_mining_threshold(),
            max_dictionary_size: default_max_dictionary_size(),
        }
    }
}

impl Config {
    /// Load config from the config directory, or return default if not found
    pub fn load() -> Result<Self> {
        match get_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from `path`, or return default if the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Save config to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn encoding(&self) -> Result<Encoding> {
        Encoding::from_name(&self.encoding).context("Invalid encoding in config")
    }

    /// Encoding that turns expanded token text back into the original bytes.
    /// Byte tokens are Latin-1 text whatever the configured encoding.
    pub fn expand_encoding(&self) -> Result<Encoding> {
        match self.tokenizer {
            TokenizerKind::Bytes => Ok(Encoding::Latin1),
            _ => self.encoding(),
        }
    }

    pub fn token_file_options(&self) -> Result<TokenFileOptions> {
        Ok(TokenFileOptions {
            encoding: self.encoding()?,
            max_char_bytes: self.max_char_bytes,
            dictionary: None,
        })
    }
}

/// Path of the config file, when the platform has a config directory
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.ngram, 2);
        assert_eq!(config.tokenizer, TokenizerKind::Chars);
        assert_eq!(config.encoding().unwrap(), Encoding::Utf8);
        assert_eq!(config.refine_threshold, 1000);
        assert_eq!(config.sort_depth, 64);
        assert_eq!(config.mining_threshold, 200);
    }

    #[test]
    fn test_config_partial_json() {
        // Missing fields take their defaults
        let json = r#"{"ngram": 3, "tokenizer": "words"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.ngram, 3);
        assert_eq!(config.tokenizer, TokenizerKind::Words);
        assert_eq!(config.max_char_bytes, 4);
    }

    #[test]
    fn test_config_empty_json() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.ngram, 2);
        assert_eq!(config.max_dictionary_size, 256);
    }

    #[test]
    fn test_save_and_load_from() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            encoding: "ISO-8859-1".to_string(),
            mining_threshold: 50,
            ..Config::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.encoding().unwrap(), Encoding::Latin1);
        assert_eq!(loaded.mining_threshold, 50);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.ngram, 2);
    }

    #[test]
    fn test_expand_encoding_follows_tokenizer() {
        let config = Config {
            tokenizer: TokenizerKind::Bytes,
            ..Config::default()
        };
        assert_eq!(config.expand_encoding().unwrap(), Encoding::Latin1);
        let config = Config {
            tokenizer: TokenizerKind::Words,
            encoding: "US-ASCII".to_string(),
            ..Config::default()
        };
        assert_eq!(config.expand_encoding().unwrap(), Encoding::Ascii);
    }

    #[test]
    fn test_bad_encoding() {
        let config = Config {
            encoding: "KOI8-R".to_string(),
            ..Config::default()
        };
        assert!(config.token_file_options().is_err());
    }
}
