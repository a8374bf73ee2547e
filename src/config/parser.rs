use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses and validates configuration text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads the harvester configuration from a TOML file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use udn_harvest::config::load_config;
///
/// let config = load_config(Path::new("udn.toml")).unwrap();
/// println!("Index pages: {:?}", config.discovery.index_urls);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Hex-encoded SHA-256 of the configuration file
///
/// Each crawl cycle records this value, tying its run row to the exact file
/// it ran with.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    Ok(hash_content(&std::fs::read_to_string(path)?))
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Loads a configuration together with the hash of the text it came from
///
/// The file is read once, so the hash always matches the parsed config.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}
