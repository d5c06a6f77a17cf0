//! Diverse triple selection: a primary pick, a similar alternative and a
//! contrasting option.

use serde::Serialize;
use stride_catalogue::{FeelDimension, ShoeRecord};

use super::ScoredCandidate;
use crate::error::{MatchError, Result};

const SIMILAR_FEEL_TOLERANCE: u8 = 1;
const SIMILAR_WEIGHT_TOLERANCE_G: u32 = 30;
const CONTRAST_FEEL_GAP: u8 = 2;
const CONTRAST_WEIGHT_GAP_G: u32 = 40;
const CONTRAST_MIN_AXES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRole {
    Primary,
    Similar,
    Contrast,
}

impl SelectionRole {
    const ORDER: [SelectionRole; 3] = [Self::Primary, Self::Similar, Self::Contrast];
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    pub candidate: ScoredCandidate<'a>,
    pub role: SelectionRole,
}

fn is_similar(a: &ShoeRecord, b: &ShoeRecord) -> bool {
    let close = |d: FeelDimension| a.feel.get(d).abs_diff(b.feel.get(d)) <= SIMILAR_FEEL_TOLERANCE;
    close(FeelDimension::Cushion)
        && close(FeelDimension::Bounce)
        && close(FeelDimension::Stability)
        && a.specs.weight_g.abs_diff(b.specs.weight_g) <= SIMILAR_WEIGHT_TOLERANCE_G
        && a.specs.plate.is_present() == b.specs.plate.is_present()
}

/// Number of axes on which two shoes clearly differ (0-6).
fn contrast_axes(a: &ShoeRecord, b: &ShoeRecord) -> usize {
    let feel_axes = FeelDimension::CORE
        .into_iter()
        .filter(|d| a.feel.get(*d).abs_diff(b.feel.get(*d)) >= CONTRAST_FEEL_GAP)
        .count();
    let weight_axis = usize::from(a.specs.weight_g.abs_diff(b.specs.weight_g) >= CONTRAST_WEIGHT_GAP_G);
    let plate_axis = usize::from(a.specs.plate.is_present() != b.specs.plate.is_present());
    feel_axes + weight_axis + plate_axis
}

fn first_unused(used: &[bool], mut accept: impl FnMut(usize) -> bool) -> Option<usize> {
    (0..used.len()).find(|i| !used[*i] && accept(*i))
}

/// Picks up to `n` (at most three) diverse candidates from a ranked list.
///
/// Fewer are returned only when the list runs out of distinct shoes.
pub fn select_up_to<'a>(ranked: &[ScoredCandidate<'a>], n: usize) -> Vec<Selection<'a>> {
    let mut pool: Vec<&ScoredCandidate<'a>> = Vec::with_capacity(ranked.len());
    for candidate in ranked {
        if !pool.iter().any(|c| c.id() == candidate.id()) {
            pool.push(candidate);
        }
    }

    let mut picked: Vec<Selection<'a>> = Vec::new();
    let mut used = vec![false; pool.len()];

    for role in SelectionRole::ORDER.into_iter().take(n.min(3)) {
        let preferred = match role {
            SelectionRole::Primary => None,
            SelectionRole::Similar => {
                let primary = picked[0].candidate.shoe;
                first_unused(&used, |i| is_similar(primary, pool[i].shoe))
            }
            SelectionRole::Contrast => first_unused(&used, |i| {
                picked
                    .iter()
                    .all(|p| contrast_axes(p.candidate.shoe, pool[i].shoe) >= CONTRAST_MIN_AXES)
            }),
        };
        let Some(index) = preferred.or_else(|| first_unused(&used, |_| true)) else {
            break;
        };
        used[index] = true;
        picked.push(Selection {
            candidate: pool[index].clone(),
            role,
        });
    }

    tracing::debug!(
        target: "stride::select",
        requested = n,
        selected = picked.len(),
        "Selected diverse candidates"
    );
    picked
}

/// Picks exactly three diverse candidates or reports the shortfall.
pub fn select_diverse<'a>(ranked: &[ScoredCandidate<'a>]) -> Result<[Selection<'a>; 3]> {
    let picked = select_up_to(ranked, 3);
    let found = picked.len();
    picked
        .try_into()
        .map_err(|_| MatchError::InsufficientCandidates { found, required: 3 })
}
