//! Hard filters applied before any scoring.

use serde::Serialize;
use stride_catalogue::{FeelDimension, PlateMaterial, ShoeRecord};

use super::Constraints;
use crate::table::Cutoffs;

/// Why a shoe was removed from the candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    Owned,
    Brand,
    /// Trail shoe for a road request, or road shoe for a trail request.
    Surface,
    Category,
    BeginnerCarbon,
    /// Too far from an explicit feel or heel-drop preference.
    Preference,
}

/// Filters that hold at every relaxation stage.
pub(crate) fn passes_base_filters(
    shoe: &ShoeRecord,
    constraints: &Constraints,
) -> Result<(), Exclusion> {
    if constraints.excluded_ids.contains(&shoe.id) {
        return Err(Exclusion::Owned);
    }
    if let Some(brands) = &constraints.brands {
        if !brands.allows(&shoe.brand) {
            return Err(Exclusion::Brand);
        }
    }
    let flags = &shoe.categories;
    if constraints.wants_trail() {
        if !flags.trail {
            return Err(Exclusion::Surface);
        }
    } else if flags.is_trail_only() {
        return Err(Exclusion::Surface);
    }
    if constraints.exclude_carbon && shoe.specs.plate == PlateMaterial::Carbon {
        return Err(Exclusion::BeginnerCarbon);
    }
    Ok(())
}

/// Checks every hard filter; the first failing one is returned.
pub fn passes_hard_filters(shoe: &ShoeRecord, constraints: &Constraints) -> Result<(), Exclusion> {
    passes_base_filters(shoe, constraints)?;
    if !constraints
        .categories
        .iter()
        .any(|c| shoe.categories.satisfies(*c))
    {
        return Err(Exclusion::Category);
    }
    Ok(())
}

/// Explicit preferences act as a loose filter until relaxation drops them.
pub(crate) fn within_preference_tolerance(
    shoe: &ShoeRecord,
    constraints: &Constraints,
    cutoffs: &Cutoffs,
) -> Result<(), Exclusion> {
    let feel_miss = FeelDimension::ALL.into_iter().any(|d| {
        constraints
            .feel
            .get(d)
            .explicit_value()
            .is_some_and(|target| shoe.feel.get(d).abs_diff(target) > cutoffs.feel_tolerance)
    });
    let drop_miss = constraints
        .heel_drop
        .best_distance(shoe.specs.drop_bucket())
        .is_some_and(|d| d > cutoffs.drop_tolerance);
    if feel_miss || drop_miss {
        Err(Exclusion::Preference)
    } else {
        Ok(())
    }
}
