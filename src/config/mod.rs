use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::models::{BindingStore, CommandSlot, GestureSymbol};

/// Default document name, kept verbatim from earlier releases so existing
/// files are picked up without migration.
pub const DEFAULT_DOCUMENT_NAME: &str = "configuracion_gestos.json";

/// Note written into the info section of every saved document.
const FORMAT_NOTE: &str = "gesto binding document v2; v1 flat ordinal-to-command maps are accepted";

/// Errors from loading, parsing, or saving binding documents.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("binding document not found at {path}")]
    NotFound { path: Utf8PathBuf },

    #[error("binding document is not valid JSON")]
    Parse(#[source] serde_json::Error),

    #[error("binding document has an unrecognized shape")]
    UnsupportedFormat,

    #[error("failed to access {path}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Descriptive entry for one binding, mirrored from the mapping section.
///
/// Regenerated on every save; decode ignores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingDetail {
    pub symbol: String,
    pub ordinal: usize,
    pub command: String,
    pub description: String,
}

/// Document-level metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub total: usize,
    pub created_unix: u64,
    pub format: String,
}

/// The enveloped on-disk shape: the authoritative `mapping` plus
/// human-oriented `details` and `info` sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingDocument {
    pub mapping: IndexMap<String, String>,
    pub details: Vec<BindingDetail>,
    pub info: DocumentInfo,
}

impl BindingDocument {
    /// Snapshot a binding store into its serialized form.
    ///
    /// The protected binding is always present because the store guarantees
    /// it; entries keep the store's insertion order.
    pub fn from_store(store: &BindingStore) -> Self {
        let mut mapping = IndexMap::new();
        let mut details = Vec::new();

        for (symbol, slot) in store.all_bindings() {
            mapping.insert(symbol.ordinal().to_string(), slot.label().to_string());
            details.push(BindingDetail {
                symbol: symbol.label().to_string(),
                ordinal: symbol.ordinal(),
                command: slot.label().to_string(),
                description: format!("Hold {} to trigger {}", symbol.label(), slot.label()),
            });
        }

        let created_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        BindingDocument {
            info: DocumentInfo {
                total: mapping.len(),
                created_unix,
                format: FORMAT_NOTE.to_string(),
            },
            mapping,
            details,
        }
    }
}

/// Parse a binding document in either accepted shape and rebuild the store.
///
/// Accepted shapes:
/// - enveloped: an object with a `mapping` field (plus `details`/`info`,
///   which are ignored here),
/// - flat (legacy): an object mapping ordinal strings directly to command
///   labels.
///
/// Entries with an unparseable or out-of-range ordinal, an unknown command
/// label, or a conflict with an earlier entry are skipped with a warning.
/// The protected binding is installed unconditionally; whatever the document
/// says about the reserved ordinal is not trusted.
///
/// # Errors
/// [`ConfigError::Parse`] for malformed JSON, [`ConfigError::UnsupportedFormat`]
/// when the document matches neither shape.
pub fn decode(text: &str) -> Result<BindingStore, ConfigError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(ConfigError::Parse)?;

    let Some(object) = value.as_object() else {
        return Err(ConfigError::UnsupportedFormat);
    };

    let mapping: IndexMap<String, String> = match object.get("mapping") {
        Some(inner) => serde_json::from_value(inner.clone())
            .map_err(|_| ConfigError::UnsupportedFormat)?,
        None => serde_json::from_value(value.clone())
            .map_err(|_| ConfigError::UnsupportedFormat)?,
    };

    let mut store = BindingStore::new();

    for (key, label) in &mapping {
        let Ok(ordinal) = key.parse::<usize>() else {
            tracing::warn!("skipping binding entry with non-numeric ordinal {:?}", key);
            continue;
        };

        let symbol = match GestureSymbol::from_ordinal(ordinal) {
            Ok(symbol) => symbol,
            Err(err) => {
                tracing::warn!("skipping binding entry: {}", err);
                continue;
            }
        };

        let Some(slot) = CommandSlot::from_label(label) else {
            tracing::warn!("skipping binding entry with unknown command {:?}", label);
            continue;
        };

        if symbol.is_protected() || slot.is_protected() {
            // Never taken from untrusted input; reinstalled below.
            continue;
        }

        if let Err(err) = store.bind(symbol, slot) {
            tracing::warn!("skipping conflicting binding entry: {}", err);
        }
    }

    store.ensure_protected_binding();
    Ok(store)
}

/// Manager for the binding document on disk.
///
/// Owns the configuration directory and document path; creates the directory
/// on construction so the first save cannot fail on a missing parent.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    document_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager rooted at `config_dir`.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).map_err(|source| ConfigError::Io {
                path: config_dir.clone(),
                source,
            })?;
        }

        Ok(Self {
            document_path: config_dir.join(DEFAULT_DOCUMENT_NAME),
            config_dir,
        })
    }

    /// Load the binding document.
    ///
    /// # Errors
    /// [`ConfigError::NotFound`] when no document exists; the caller decides
    /// whether that is fatal. Parse and shape failures as in [`decode`].
    pub fn load(&self) -> Result<BindingStore, ConfigError> {
        if !self.document_path.exists() {
            return Err(ConfigError::NotFound {
                path: self.document_path.clone(),
            });
        }

        let contents =
            fs::read_to_string(&self.document_path).map_err(|source| ConfigError::Io {
                path: self.document_path.clone(),
                source,
            })?;

        let store = decode(&contents)?;
        tracing::info!(
            "loaded {} bindings from {}",
            store.len(),
            self.document_path
        );
        Ok(store)
    }

    /// Load the binding document, falling back to a store that holds only the
    /// protected binding when the document is missing or unreadable.
    ///
    /// I/O failures other than "not found" are still surfaced.
    pub fn load_or_default(&self) -> Result<BindingStore, ConfigError> {
        match self.load() {
            Ok(store) => Ok(store),
            Err(ConfigError::NotFound { path }) => {
                tracing::warn!("no binding document at {}, starting with defaults", path);
                Ok(BindingStore::new())
            }
            Err(ConfigError::Parse(err)) => {
                tracing::warn!("binding document unreadable ({}), starting with defaults", err);
                Ok(BindingStore::new())
            }
            Err(ConfigError::UnsupportedFormat) => {
                tracing::warn!("binding document has an unknown shape, starting with defaults");
                Ok(BindingStore::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Serialize the store and write it to the document path.
    pub fn save(&self, store: &BindingStore) -> Result<(), ConfigError> {
        let document = BindingDocument::from_store(store);
        let json = serde_json::to_string_pretty(&document).map_err(ConfigError::Parse)?;

        fs::write(&self.document_path, json).map_err(|source| ConfigError::Io {
            path: self.document_path.clone(),
            source,
        })?;

        tracing::info!(
            "saved {} bindings to {}",
            document.info.total,
            self.document_path
        );
        Ok(())
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn document_path(&self) -> &Utf8Path {
        &self.document_path
    }
}
