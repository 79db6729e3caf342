use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatLocConfig {
    /// Locale code whose content is authored by hand (default "es").
    pub source_locale: Option<String>,
    pub store: Option<StoreCfg>,
    pub translate: Option<TranslateCfg>,
    pub import: Option<ImportCfg>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreCfg {
    /// Base URL of the REST data API, e.g. `https://db.example.com/rest/v1`.
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslateCfg {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    /// Translate all fields of a record in one provider call, joined by a
    /// structural delimiter, instead of one call per field.
    pub batch_fields: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportCfg {
    /// Field delimiter for bulk files; a single character, default ','.
    pub delimiter: Option<char>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A config file exists but is not valid TOML for the expected shape.
    /// Missing files are not an error; a present-but-broken one is.
    #[error("invalid config at {}: {source}", .path.display())]
    Invalid {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Parse one config file. `None` when the file is absent or unreadable.
fn load_file(path: &std::path::Path) -> Result<Option<CatLocConfig>, ConfigError> {
    let Ok(s) = std::fs::read_to_string(path) else {
        return Ok(None);
    };
    toml::from_str::<CatLocConfig>(&s)
        .map(Some)
        .map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
}

pub fn load_config() -> Result<CatLocConfig, ConfigError> {
    // Search order: CWD/catloc.toml, $HOME/.config/catloc/catloc.toml
    let mut merged = CatLocConfig::default();
    if let Ok(p) = std::env::current_dir() {
        if let Some(cfg) = load_file(&p.join("catloc.toml"))? {
            merged = merge(merged, cfg);
        }
    }
    if let Some(base) = dirs::config_dir() {
        if let Some(cfg) = load_file(&base.join("catloc").join("catloc.toml"))? {
            merged = merge(merged, cfg);
        }
    }
    Ok(merged)
}

fn merge(mut a: CatLocConfig, b: CatLocConfig) -> CatLocConfig {
    if a.source_locale.is_none() {
        a.source_locale = b.source_locale;
    }
    a.store = merge_opt(a.store, b.store, merge_store);
    a.translate = merge_opt(a.translate, b.translate, merge_translate);
    a.import = merge_opt(a.import, b.import, merge_import);
    a
}

fn merge_opt<T: Default>(a: Option<T>, b: Option<T>, f: fn(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(f(a, b)),
        (None, Some(b)) => Some(b),
        (Some(a), None) => Some(a),
        (None, None) => None,
    }
}

fn merge_store(mut a: StoreCfg, b: StoreCfg) -> StoreCfg {
    if a.base_url.is_none() {
        a.base_url = b.base_url;
    }
    if a.api_key.is_none() {
        a.api_key = b.api_key;
    }
    a
}

fn merge_translate(mut a: TranslateCfg, b: TranslateCfg) -> TranslateCfg {
    if a.endpoint.is_none() {
        a.endpoint = b.endpoint;
    }
    if a.api_key.is_none() {
        a.api_key = b.api_key;
    }
    if a.batch_fields.is_none() {
        a.batch_fields = b.batch_fields;
    }
    a
}

fn merge_import(mut a: ImportCfg, b: ImportCfg) -> ImportCfg {
    if a.delimiter.is_none() {
        a.delimiter = b.delimiter;
    }
    a
}
