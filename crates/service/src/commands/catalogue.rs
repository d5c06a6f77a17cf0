//! CLI handler for the `catalogue` command.

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;
use stride_catalogue::{Catalogue, Category};

use super::catalogue_provider;

/// Handle the `catalogue` command.
pub(crate) fn handle_catalogue_command(catalogue: Option<PathBuf>) -> Result<()> {
    let catalogue = catalogue_provider(catalogue)?.load()?;
    print!("{}", summarise(&catalogue));
    Ok(())
}

fn summarise(catalogue: &Catalogue) -> String {
    let mut per_category: BTreeMap<Category, usize> = BTreeMap::new();
    let mut per_brand: BTreeMap<&str, usize> = BTreeMap::new();
    let mut trail_only = 0;
    let mut plated = 0;

    for shoe in catalogue.iter() {
        for category in shoe.categories.categories() {
            *per_category.entry(category).or_default() += 1;
        }
        *per_brand.entry(shoe.brand.as_str()).or_default() += 1;
        if shoe.categories.is_trail_only() {
            trail_only += 1;
        }
        if shoe.specs.plate.is_present() {
            plated += 1;
        }
    }

    let mut out = format!("Catalogue OK: {} shoes\n\nBy category:\n", catalogue.len());
    for category in Category::ALL {
        let count = per_category.get(&category).copied().unwrap_or(0);
        out.push_str(&format!("  {:<9} {count}\n", category.label()));
    }
    out.push_str(&format!("  trail-only {trail_only}, plated {plated}\n"));
    out.push_str(&format!("\nBrands ({}):\n", per_brand.len()));
    for (brand, count) in per_brand {
        out.push_str(&format!("  {brand} ({count})\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_catalogue::PlateMaterial;
    use stride_test_utils::{catalogue_of, ShoeBuilder};

    #[test]
    fn test_summary_counts() {
        let catalogue = catalogue_of(vec![
            ShoeBuilder::new("a").daily().brand("Hoka").build(),
            ShoeBuilder::new("b").race().brand("Hoka").plate(PlateMaterial::Carbon).build(),
            ShoeBuilder::new("c").trail().brand("Salomon").build(),
        ]);
        let text = summarise(&catalogue);
        assert!(text.starts_with("Catalogue OK: 3 shoes"));
        assert!(text.contains("  race      1"));
        assert!(text.contains("trail-only 1, plated 1"));
        assert!(text.contains("Hoka (2)"));
    }
}
