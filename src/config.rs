use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::counter_engine::{FieldSchema, Geometry};

/// Listen address used when the configuration file does not name one.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:1200";

/// Runtime settings loaded from an INI-style configuration file.
///
/// Everything the store needs to interpret its backing file (table geometry
/// and the field schema) comes from here and must match across restarts;
/// none of it is stored in the file itself.
#[derive(Debug, Clone)]
pub struct Settings {
    pub geometry: Geometry,
    pub fields: Vec<String>,
    pub fields_shortcut: Vec<String>,
    pub filename: PathBuf,
    pub listen: String,
}

impl Settings {
    /// Reads and parses the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, String> {
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("cannot read config file {}: {e}", path.display()))?;
        Self::parse(&raw)
    }

    /// Parses configuration text. Expects a `[Settings]` section with
    /// `key = value` entries; `#` and `;` start comments.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let entries = ini_section(raw, "Settings");

        let geometry = Geometry {
            key_length: require_usize(&entries, "key_length")?,
            max_value_length: require_usize(&entries, "max_value_length")?,
            item_max_count: require_usize(&entries, "item_max_count")?,
            max_search_depth: require_usize(&entries, "max_search_depth")?,
        };
        if geometry.key_length < 2 {
            return Err("key_length must be at least 2 (the probe displacement mutates the final two key bytes)".to_string());
        }

        let fields = split_list(require(&entries, "fields")?);
        let fields_shortcut = split_list(require(&entries, "fields_shortcut")?);
        // surfaces empty/mismatched/duplicate field lists now, at load time
        FieldSchema::new(&fields, &fields_shortcut)?;

        let filename = PathBuf::from(require(&entries, "filename")?);
        let listen = entries
            .get("listen")
            .cloned()
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string());

        Ok(Self {
            geometry,
            fields,
            fields_shortcut,
            filename,
            listen,
        })
    }

    /// Builds the field schema described by this configuration.
    pub fn schema(&self) -> Result<FieldSchema, String> {
        FieldSchema::new(&self.fields, &self.fields_shortcut)
    }
}

fn ini_section(raw: &str, section: &str) -> HashMap<String, String> {
    let mut entries = HashMap::new();
    let mut in_section = false;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = name.trim() == section;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    entries
}

fn require<'a>(entries: &'a HashMap<String, String>, key: &str) -> Result<&'a str, String> {
    entries
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| format!("missing required setting: {key}"))
}

fn require_usize(entries: &HashMap<String, String>, key: &str) -> Result<usize, String> {
    let value = require(entries, key)?;
    let parsed: usize = value
        .parse()
        .map_err(|_| format!("setting {key} must be a positive integer, got {value:?}"))?;
    if parsed == 0 {
        return Err(format!("setting {key} must be a positive integer"));
    }
    Ok(parsed)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .collect()
}
