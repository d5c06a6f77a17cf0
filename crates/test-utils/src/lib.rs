//! Shared test utilities for stride crates.
//!
//! An environment-variable guard for tests that touch process-global
//! state, plus builders for catalogue fixtures.

use std::path::PathBuf;
use stride_catalogue::{
    Catalogue, CategoryFlags, Descriptions, FeelScores, Fit, Meta, PlateMaterial, ReleaseStatus,
    ShoeRecord, Specs, Support, Surface, ToeBox, WetGrip, Width,
};

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = stride_test_utils::set_env_var("STRIDE_DOC_VAR", Some("value"));
/// assert_eq!(std::env::var("STRIDE_DOC_VAR").as_deref(), Ok("value"));
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Builds a validated catalogue, panicking on invalid fixtures.
pub fn catalogue_of(records: Vec<ShoeRecord>) -> Catalogue {
    match Catalogue::new(records) {
        Ok(catalogue) => catalogue,
        Err(e) => panic!("invalid test catalogue: {e}"),
    }
}

/// A catalogue written to a temporary JSON file.
///
/// The tempdir is removed when this struct is dropped.
pub struct CatalogueFile {
    pub tempdir: tempfile::TempDir,
    pub path: PathBuf,
}

impl CatalogueFile {
    pub fn json(records: &[ShoeRecord]) -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("catalogue.json");
        let body = serde_json::to_string_pretty(records).map_err(std::io::Error::other)?;
        std::fs::write(&path, body)?;
        Ok(Self { tempdir, path })
    }
}

/// Fluent builder for [`ShoeRecord`] fixtures.
///
/// Defaults: no category flags, every feel score 3, 250 g, 8 mm drop, no
/// plate, brand "Brand" and the id as model name.
#[derive(Debug, Clone)]
pub struct ShoeBuilder {
    record: ShoeRecord,
}

impl ShoeBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            record: ShoeRecord {
                id: id.to_string(),
                brand: "Brand".to_string(),
                model: id.to_string(),
                version: None,
                categories: CategoryFlags::default(),
                feel: FeelScores {
                    cushion: 3,
                    bounce: 3,
                    stability: 3,
                    rocker: 3,
                    ground_feel: 3,
                    weight_feel: 3,
                },
                specs: Specs {
                    weight_g: 250,
                    heel_drop_mm: 8.0,
                    plate: PlateMaterial::None,
                },
                fit: Fit::default(),
                meta: Meta::default(),
                descriptions: Descriptions::default(),
            },
        }
    }

    pub fn daily(mut self) -> Self {
        self.record.categories.daily = true;
        self
    }

    pub fn recovery(mut self) -> Self {
        self.record.categories.recovery = true;
        self
    }

    pub fn workout(mut self) -> Self {
        self.record.categories.workout = true;
        self
    }

    pub fn race(mut self) -> Self {
        self.record.categories.race = true;
        self
    }

    /// Sets the trail flag and a trail surface.
    pub fn trail(mut self) -> Self {
        self.record.categories.trail = true;
        self.record.meta.surface = Surface::Trail;
        self
    }

    pub fn super_versatile(mut self) -> Self {
        self.record.categories.super_versatile = true;
        self
    }

    /// Feel scores in dimension order: cushion, bounce, stability, rocker,
    /// ground feel, weight feel.
    pub fn feel(mut self, scores: [u8; 6]) -> Self {
        let [cushion, bounce, stability, rocker, ground_feel, weight_feel] = scores;
        self.record.feel = FeelScores {
            cushion,
            bounce,
            stability,
            rocker,
            ground_feel,
            weight_feel,
        };
        self
    }

    pub fn weight(mut self, grams: u32) -> Self {
        self.record.specs.weight_g = grams;
        self
    }

    pub fn drop(mut self, mm: f32) -> Self {
        self.record.specs.heel_drop_mm = mm;
        self
    }

    pub fn plate(mut self, plate: PlateMaterial) -> Self {
        self.record.specs.plate = plate;
        self
    }

    pub fn support(mut self, support: Support) -> Self {
        self.record.fit.support = support;
        self
    }

    pub fn toe_box(mut self, toe_box: ToeBox) -> Self {
        self.record.fit.toe_box = toe_box;
        self
    }

    pub fn widths(mut self, widths: Vec<Width>) -> Self {
        self.record.fit.widths = widths;
        self
    }

    pub fn brand(mut self, brand: &str) -> Self {
        self.record.brand = brand.to_string();
        self
    }

    pub fn release(mut self, release: ReleaseStatus) -> Self {
        self.record.meta.release = release;
        self
    }

    pub fn wet_grip(mut self, grip: WetGrip) -> Self {
        self.record.meta.wet_grip = grip;
        self
    }

    pub fn descriptions(mut self, descriptions: Descriptions) -> Self {
        self.record.descriptions = descriptions;
        self
    }

    pub fn build(self) -> ShoeRecord {
        self.record
    }
}
