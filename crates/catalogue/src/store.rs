use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::types::ShoeRecord;
use crate::Result;

/// Errors raised while building or loading a catalogue.
#[derive(Error, Debug)]
pub enum CatalogueError {
    /// The catalogue holds no records.
    #[error("catalogue is empty")]
    Empty,

    /// A record has a blank id.
    #[error("catalogue record at index {index} has no id")]
    MissingId { index: usize },

    /// Two records share an id.
    #[error("duplicate shoe id in catalogue: '{0}'")]
    DuplicateId(String),

    /// A feel score lies outside 1-5.
    #[error("shoe '{id}' has {dimension} score {value}; expected 1-5")]
    InvalidFeel {
        id: String,
        dimension: &'static str,
        value: u8,
    },

    /// The catalogue file does not exist.
    #[error("catalogue file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The catalogue file could not be read.
    #[error("failed to read catalogue file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalogue contents could not be parsed.
    #[error("failed to parse {format} catalogue: {message}")]
    Parse {
        format: CatalogueFormat,
        message: String,
    },

    /// The file extension is not a supported format.
    #[error("unsupported catalogue format: '{0}' (expected .json, .yaml, .yml or .toml)")]
    UnsupportedFormat(String),
}

/// Serialization format of a catalogue file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogueFormat {
    Json,
    Yaml,
    Toml,
}

impl CatalogueFormat {
    /// Infers the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(CatalogueError::UnsupportedFormat(ext)),
        }
    }
}

impl std::fmt::Display for CatalogueFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "JSON"),
            Self::Yaml => write!(f, "YAML"),
            Self::Toml => write!(f, "TOML"),
        }
    }
}

/// JSON and YAML catalogues may be a bare list or wrapped in `shoes`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogueDocument {
    List(Vec<ShoeRecord>),
    Wrapped { shoes: Vec<ShoeRecord> },
}

impl CatalogueDocument {
    fn into_records(self) -> Vec<ShoeRecord> {
        match self {
            Self::List(records) => records,
            Self::Wrapped { shoes } => shoes,
        }
    }
}

#[derive(Deserialize)]
struct TomlDocument {
    #[serde(default)]
    shoes: Vec<ShoeRecord>,
}

/// Immutable, validated list of shoe records indexed by id.
#[derive(Debug, Clone)]
pub struct Catalogue {
    records: Vec<ShoeRecord>,
    index: HashMap<String, usize>,
}

impl Catalogue {
    /// Builds a catalogue, rejecting empty lists, blank or duplicate ids and
    /// out-of-range feel scores.
    pub fn new(records: Vec<ShoeRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(CatalogueError::Empty);
        }

        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(CatalogueError::MissingId { index: i });
            }
            if let Some((dimension, value)) = record.feel.out_of_range() {
                return Err(CatalogueError::InvalidFeel {
                    id: record.id.clone(),
                    dimension: dimension.label(),
                    value,
                });
            }
            if index.insert(record.id.clone(), i).is_some() {
                return Err(CatalogueError::DuplicateId(record.id.clone()));
            }
        }

        Ok(Self { records, index })
    }

    /// Parses and validates a catalogue from a string in `format`.
    pub fn parse(content: &str, format: CatalogueFormat) -> Result<Self> {
        let parse_err = |message: String| CatalogueError::Parse { format, message };
        let records = match format {
            CatalogueFormat::Json => serde_json::from_str::<CatalogueDocument>(content)
                .map_err(|e| parse_err(e.to_string()))?
                .into_records(),
            CatalogueFormat::Yaml => serde_yaml::from_str::<CatalogueDocument>(content)
                .map_err(|e| parse_err(e.to_string()))?
                .into_records(),
            CatalogueFormat::Toml => {
                toml::from_str::<TomlDocument>(content)
                    .map_err(|e| parse_err(e.to_string()))?
                    .shoes
            }
        };
        Self::new(records)
    }

    /// Shorthand for [`Catalogue::parse`] with JSON input.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::parse(content, CatalogueFormat::Json)
    }

    pub fn get(&self, id: &str) -> Option<&ShoeRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShoeRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a constructed catalogue; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Source of the immutable shoe list consumed by the engine.
pub trait CatalogueProvider: Send + Sync {
    /// Returns the full catalogue. An empty or missing catalogue is an error.
    fn load(&self) -> Result<Arc<Catalogue>>;
}

/// Provider over an already-built catalogue.
#[derive(Debug, Clone)]
pub struct StaticCatalogue(Arc<Catalogue>);

impl StaticCatalogue {
    pub fn new(catalogue: Catalogue) -> Self {
        Self(Arc::new(catalogue))
    }
}

impl CatalogueProvider for StaticCatalogue {
    fn load(&self) -> Result<Arc<Catalogue>> {
        Ok(Arc::clone(&self.0))
    }
}

/// Provider that reads a JSON, YAML or TOML file on each load.
#[derive(Debug, Clone)]
pub struct FileCatalogue {
    path: PathBuf,
}

impl FileCatalogue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogueProvider for FileCatalogue {
    fn load(&self) -> Result<Arc<Catalogue>> {
        if !self.path.exists() {
            return Err(CatalogueError::NotFound(self.path.clone()));
        }
        let format = CatalogueFormat::from_path(&self.path)?;
        let content = std::fs::read_to_string(&self.path).map_err(|source| CatalogueError::Io {
            path: self.path.clone(),
            source,
        })?;
        let catalogue = Catalogue::parse(&content, format)?;

        tracing::debug!(
            target: "stride::catalogue",
            path = %self.path.display(),
            shoes = catalogue.len(),
            "Loaded catalogue"
        );

        Ok(Arc::new(catalogue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_SHOE: &str = r#"[{
        "id": "a",
        "brand": "Brand",
        "model": "Alpha",
        "categories": { "daily": true },
        "feel": { "cushion": 3, "bounce": 3, "stability": 3, "rocker": 3, "ground_feel": 3, "weight_feel": 3 },
        "specs": { "weight_g": 260, "heel_drop_mm": 8.0 }
    }]"#;

    #[test]
    fn test_empty_catalogue_rejected() {
        let err = Catalogue::new(vec![]).unwrap_err();
        assert!(matches!(err, CatalogueError::Empty));
    }

    #[test]
    fn test_parse_bare_json_list() {
        let catalogue = Catalogue::from_json_str(ONE_SHOE).unwrap();
        assert_eq!(catalogue.len(), 1);
        assert!(catalogue.contains("a"));
        assert!(catalogue.get("missing").is_none());
    }

    #[test]
    fn test_parse_wrapped_json() {
        let wrapped = format!("{{\"shoes\": {}}}", ONE_SHOE);
        let catalogue = Catalogue::from_json_str(&wrapped).unwrap();
        assert_eq!(catalogue.get("a").unwrap().model, "Alpha");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let doubled = ONE_SHOE.replacen(
            "}]",
            "}, {\"id\": \"a\", \"brand\": \"B\", \"model\": \"M\", \"feel\": { \"cushion\": 3, \"bounce\": 3, \"stability\": 3, \"rocker\": 3, \"ground_feel\": 3, \"weight_feel\": 3 }, \"specs\": { \"weight_g\": 260, \"heel_drop_mm\": 8.0 }}]",
            1,
        );
        let err = Catalogue::from_json_str(&doubled).unwrap_err();
        assert!(matches!(err, CatalogueError::DuplicateId(ref id) if id == "a"));
    }

    #[test]
    fn test_invalid_feel_rejected() {
        let bad = ONE_SHOE.replace("\"cushion\": 3", "\"cushion\": 0");
        let err = Catalogue::from_json_str(&bad).unwrap_err();
        assert!(err.to_string().contains("cushion score 0"));
    }

    #[test]
    fn test_parse_error_names_format() {
        let err = Catalogue::parse("not: [valid", CatalogueFormat::Yaml).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse YAML catalogue"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            CatalogueFormat::from_path(Path::new("shoes.YML")).unwrap(),
            CatalogueFormat::Yaml
        );
        assert!(matches!(
            CatalogueFormat::from_path(Path::new("shoes.csv")),
            Err(CatalogueError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let provider = FileCatalogue::new("/definitely/not/here.json");
        assert!(matches!(
            provider.load(),
            Err(CatalogueError::NotFound(_))
        ));
    }

    #[test]
    fn test_static_provider_shares_catalogue() {
        let provider = StaticCatalogue::new(Catalogue::from_json_str(ONE_SHOE).unwrap());
        let a = provider.load().unwrap();
        let b = provider.load().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
