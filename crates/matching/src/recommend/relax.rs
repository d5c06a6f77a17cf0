//! Staged constraint relaxation for scarce candidate pools.

use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use stride_catalogue::{Catalogue, Category, ShoeRecord};

use super::filter::{passes_base_filters, passes_hard_filters, within_preference_tolerance};
use super::{rank_candidates, Constraints, ScoredCandidate, Scorer, ScoringInputs};
use crate::preference::{DropPreference, FeelPreferences};
use crate::table::Cutoffs;

/// How far the constraints had to be loosened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxationStage {
    Strict,
    WidenedCategories,
    DroppedPreferences,
    Fallback,
}

impl RelaxationStage {
    pub fn is_relaxed(&self) -> bool {
        *self != Self::Strict
    }
}

/// Ranked candidates plus the stage that produced them.
#[derive(Debug, Clone)]
pub struct Retrieval<'a> {
    pub candidates: Vec<ScoredCandidate<'a>>,
    pub stage: RelaxationStage,
}

/// Neighbouring categories tried when a category has too few candidates.
pub fn widen_category(category: Category) -> &'static [Category] {
    match category {
        Category::Daily => &[Category::Recovery, Category::Workout],
        Category::Recovery => &[Category::Daily],
        Category::Workout => &[Category::Daily, Category::Race],
        Category::Race => &[Category::Workout],
        Category::Trail => &[],
    }
}

fn widened(constraints: &Constraints) -> Constraints {
    let mut categories = constraints.categories.clone();
    for category in &constraints.categories {
        for extra in widen_category(*category) {
            if !categories.contains(extra) {
                categories.push(*extra);
            }
        }
    }
    Constraints {
        categories,
        ..constraints.clone()
    }
}

fn without_preferences(constraints: &Constraints) -> Constraints {
    Constraints {
        feel: FeelPreferences::ignore_all(),
        heel_drop: DropPreference::Ignore,
        ..constraints.clone()
    }
}

fn score_pass<'a, S: Scorer + ?Sized>(
    catalogue: &'a Catalogue,
    constraints: &Constraints,
    inputs: &ScoringInputs<'_>,
    scorer: &S,
    cutoffs: &Cutoffs,
) -> Vec<ScoredCandidate<'a>> {
    let mut candidates: Vec<ScoredCandidate<'a>> = catalogue
        .iter()
        .filter(|shoe| passes_hard_filters(shoe, constraints).is_ok())
        .filter(|shoe| within_preference_tolerance(shoe, constraints, cutoffs).is_ok())
        .map(|shoe| scorer.score(shoe, constraints, inputs))
        .collect();
    rank_candidates(&mut candidates);
    candidates
}

/// Last-resort pool: versatile shoes that still respect the base filters.
fn fallback_pool<'a>(catalogue: &'a Catalogue, constraints: &Constraints) -> Vec<&'a ShoeRecord> {
    let trail = constraints.wants_trail();
    let mut pool: Vec<&ShoeRecord> = catalogue
        .iter()
        .filter(|shoe| passes_base_filters(shoe, constraints).is_ok())
        .filter(|shoe| {
            if trail {
                shoe.categories.trail
            } else {
                shoe.categories.daily || shoe.categories.super_versatile
            }
        })
        .collect();
    pool.sort_by_key(|shoe| {
        (
            shoe.meta.release,
            shoe.specs.weight_g,
            Reverse(shoe.feel.stability),
            shoe.id.as_str(),
        )
    });
    pool
}

/// Retrieves and ranks candidates, relaxing constraints stage by stage
/// until at least `cutoffs.min_candidates` survive.
pub fn retrieve<'a, S: Scorer + ?Sized>(
    catalogue: &'a Catalogue,
    constraints: &Constraints,
    inputs: &ScoringInputs<'_>,
    scorer: &S,
    cutoffs: &Cutoffs,
) -> Retrieval<'a> {
    let finish = |mut candidates: Vec<ScoredCandidate<'a>>, stage| {
        candidates.truncate(cutoffs.top_n);
        tracing::debug!(
            target: "stride::retrieval",
            stage = ?stage,
            candidates = candidates.len(),
            "Retrieved candidates"
        );
        Retrieval { candidates, stage }
    };

    let strict = score_pass(catalogue, constraints, inputs, scorer, cutoffs);
    if strict.len() >= cutoffs.min_candidates {
        return finish(strict, RelaxationStage::Strict);
    }
    tracing::debug!(target: "stride::retrieval", survivors = strict.len(), "Strict pass too small, widening categories");

    let wide = widened(constraints);
    let widened_pass = score_pass(catalogue, &wide, inputs, scorer, cutoffs);
    if widened_pass.len() >= cutoffs.min_candidates {
        return finish(widened_pass, RelaxationStage::WidenedCategories);
    }
    tracing::debug!(target: "stride::retrieval", survivors = widened_pass.len(), "Widened pass too small, dropping preferences");

    let loose = without_preferences(&wide);
    let mut loose_pass = score_pass(catalogue, &loose, inputs, scorer, cutoffs);
    if loose_pass.len() >= cutoffs.min_candidates {
        return finish(loose_pass, RelaxationStage::DroppedPreferences);
    }
    tracing::debug!(target: "stride::retrieval", survivors = loose_pass.len(), "Falling back to versatile pool");

    let seen: BTreeSet<&str> = loose_pass.iter().map(|c| c.id()).collect();
    let extra: Vec<ScoredCandidate<'a>> = fallback_pool(catalogue, &loose)
        .into_iter()
        .filter(|shoe| !seen.contains(shoe.id.as_str()))
        .map(|shoe| scorer.score(shoe, &loose, inputs))
        .collect();
    loose_pass.extend(extra);
    finish(loose_pass, RelaxationStage::Fallback)
}
