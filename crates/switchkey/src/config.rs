//! RON configuration: trigger mappings and pins.
//!
//! The document maps trigger symbols (a letter or digit) to ordered lists of
//! bundle identifiers; list order is the cycling order. A `pins` table
//! forces a symbol to a single fixed app, which is expressed downstream as a
//! one-element candidate list — the engine has no pin concept.
//!
//! ```ron
//! (
//!     mappings: {
//!         "c": ["com.google.Chrome", "com.apple.iCal"],
//!         "s": ["com.apple.Safari"],
//!     },
//!     pins: {
//!         "t": "com.apple.Terminal",
//!     },
//! )
//! ```

use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;
use switchkey_engine::{AppId, AppMappings, KeyPos};
use tracing::warn;

/// Result alias for configuration loading.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from reading or parsing the config document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// The file is not valid RON or does not match the schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Path that was attempted.
        path: String,
        /// Underlying RON error, with position.
        source: ron::error::SpannedError,
    },
}

/// On-disk document shape.
#[derive(Debug, Deserialize)]
struct RawConfig {
    /// Trigger symbol -> ordered bundle identifiers.
    mappings: HashMap<String, Vec<String>>,
    /// Trigger symbol -> pinned bundle identifier.
    #[serde(default)]
    pins: HashMap<String, String>,
}

/// Loaded and validated configuration.
#[derive(Debug)]
pub struct Config {
    /// Engine-ready trigger mappings (pins already folded in).
    pub mappings: AppMappings,
}

/// Load and validate the config document at `path`.
///
/// Unknown trigger symbols and duplicate candidates are warned about and
/// skipped rather than rejected; an edit to one entry should never take the
/// whole switcher down.
pub fn load(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.display().to_string(),
        source,
    })?;
    let raw: RawConfig = ron::from_str(&text).map_err(|source| Error::Parse {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Config {
        mappings: resolve(raw),
    })
}

/// Translate the raw document into engine mappings.
fn resolve(raw: RawConfig) -> AppMappings {
    let mut mappings = AppMappings::new();
    for (symbol, ids) in raw.mappings {
        let Some(key) = trigger_key(&symbol) else {
            continue;
        };
        let mut list: Vec<AppId> = Vec::with_capacity(ids.len());
        for id in ids {
            let id = AppId::new(id);
            if list.contains(&id) {
                warn!(symbol = %symbol, app = %id, "ignoring_duplicate_candidate");
                continue;
            }
            list.push(id);
        }
        if list.is_empty() {
            continue;
        }
        mappings.insert(key, list);
    }
    for (symbol, id) in raw.pins {
        let Some(key) = trigger_key(&symbol) else {
            continue;
        };
        // A pin wins over whatever the mappings table said for this key.
        mappings.insert(key, vec![AppId::new(id)]);
    }
    mappings
}

/// Parse a trigger symbol into a key position, warning on anything that is
/// not a single letter or digit.
fn trigger_key(symbol: &str) -> Option<KeyPos> {
    let mut chars = symbol.chars();
    let key = match (chars.next(), chars.next()) {
        (Some(c), None) => KeyPos::from_char(c),
        _ => None,
    };
    if key.is_none() {
        warn!(symbol = %symbol, "ignoring_unknown_trigger_symbol");
    }
    key
}
