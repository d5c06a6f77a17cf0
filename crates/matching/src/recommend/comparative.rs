//! Comparative claims across the shoes shown together.
//!
//! A claim is only made when one shoe is strictly the extreme on its axis,
//! so two shoes never carry the same claim.

use serde::Serialize;
use stride_catalogue::ShoeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Claim {
    Lightest,
    Heaviest,
    MostCushioned,
    Firmest,
    Bounciest,
    MostStable,
    LeastStable,
    LowestDrop,
    HighestDrop,
    OnlyPlated,
}

impl Claim {
    pub fn is_strength(&self) -> bool {
        matches!(
            self,
            Self::Lightest
                | Self::MostCushioned
                | Self::Bounciest
                | Self::MostStable
                | Self::LowestDrop
                | Self::OnlyPlated
        )
    }

    pub fn phrase(&self) -> &'static str {
        match self {
            Self::Lightest => "Lightest pick",
            Self::Heaviest => "Heaviest pick",
            Self::MostCushioned => "Most cushioned pick",
            Self::Firmest => "Firmest ride",
            Self::Bounciest => "Bounciest pick",
            Self::MostStable => "Most stable pick",
            Self::LeastStable => "Least stable pick",
            Self::LowestDrop => "Lowest heel drop",
            Self::HighestDrop => "Highest heel drop",
            Self::OnlyPlated => "Only plated pick",
        }
    }
}

/// Claims for one shoe, split into strengths and trade-offs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClaimSet {
    pub strengths: Vec<String>,
    pub trade_offs: Vec<String>,
}

impl ClaimSet {
    fn push(&mut self, claim: Claim) {
        let phrase = claim.phrase().to_string();
        if claim.is_strength() {
            self.strengths.push(phrase);
        } else {
            self.trade_offs.push(phrase);
        }
    }
}

/// Index of the strict maximum of `key`, if one shoe holds it alone.
fn strict_max<K: PartialOrd + Copy>(shoes: &[&ShoeRecord], key: impl Fn(&ShoeRecord) -> K) -> Option<usize> {
    let values: Vec<K> = shoes.iter().map(|s| key(*s)).collect();
    let (best, value) = values
        .iter()
        .copied()
        .enumerate()
        .fold(None, |acc: Option<(usize, K)>, (i, v)| match acc {
            Some((_, b)) if b >= v => acc,
            _ => Some((i, v)),
        })?;
    let ties = values.iter().filter(|v| **v == value).count();
    (ties == 1).then_some(best)
}

fn strict_min<K: PartialOrd + Copy + std::ops::Neg<Output = K>>(
    shoes: &[&ShoeRecord],
    key: impl Fn(&ShoeRecord) -> K,
) -> Option<usize> {
    strict_max(shoes, |s| -key(s))
}

/// Comparative claims for each shoe, in input order.
pub fn comparative_claims(shoes: &[&ShoeRecord]) -> Vec<ClaimSet> {
    let mut sets = vec![ClaimSet::default(); shoes.len()];
    if shoes.len() < 2 {
        return sets;
    }

    let weight = |s: &ShoeRecord| f64::from(s.specs.weight_g);
    let cushion = |s: &ShoeRecord| f64::from(s.feel.cushion);
    let stability = |s: &ShoeRecord| f64::from(s.feel.stability);
    let drop = |s: &ShoeRecord| f64::from(s.specs.heel_drop_mm);

    let axes: [(Option<usize>, Claim); 9] = [
        (strict_min(shoes, weight), Claim::Lightest),
        (strict_max(shoes, weight), Claim::Heaviest),
        (strict_max(shoes, cushion), Claim::MostCushioned),
        (strict_min(shoes, cushion), Claim::Firmest),
        (strict_max(shoes, |s| f64::from(s.feel.bounce)), Claim::Bounciest),
        (strict_max(shoes, stability), Claim::MostStable),
        (strict_min(shoes, stability), Claim::LeastStable),
        (strict_min(shoes, drop), Claim::LowestDrop),
        (strict_max(shoes, drop), Claim::HighestDrop),
    ];
    for (winner, claim) in axes {
        if let Some(i) = winner {
            sets[i].push(claim);
        }
    }

    let plated: Vec<usize> = shoes
        .iter()
        .enumerate()
        .filter(|(_, s)| s.specs.plate.is_present())
        .map(|(i, _)| i)
        .collect();
    if let [only] = plated.as_slice() {
        sets[*only].push(Claim::OnlyPlated);
    }

    sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_catalogue::PlateMaterial;
    use stride_test_utils::ShoeBuilder;

    #[test]
    fn test_claims_go_to_strict_extremes() {
        let a = ShoeBuilder::new("a").daily().weight(220).feel([3, 4, 3, 3, 3, 2]).drop(4.0).build();
        let b = ShoeBuilder::new("b").daily().weight(260).feel([5, 3, 3, 3, 3, 3]).drop(8.0).build();
        let c = ShoeBuilder::new("c")
            .daily()
            .weight(240)
            .feel([2, 3, 3, 3, 3, 3])
            .drop(10.0)
            .plate(PlateMaterial::Carbon)
            .build();
        let sets = comparative_claims(&[&a, &b, &c]);

        assert!(sets[0].strengths.contains(&Claim::Lightest.phrase().to_string()));
        assert!(sets[0].strengths.contains(&Claim::Bounciest.phrase().to_string()));
        assert!(sets[1].strengths.contains(&Claim::MostCushioned.phrase().to_string()));
        assert!(sets[1].trade_offs.contains(&Claim::Heaviest.phrase().to_string()));
        assert!(sets[2].trade_offs.contains(&Claim::Firmest.phrase().to_string()));
        assert!(sets[2].strengths.contains(&Claim::OnlyPlated.phrase().to_string()));
    }

    #[test]
    fn test_ties_produce_no_claim() {
        let a = ShoeBuilder::new("a").daily().build();
        let b = ShoeBuilder::new("b").daily().build();
        let sets = comparative_claims(&[&a, &b]);
        assert!(sets.iter().all(|s| s.strengths.is_empty() && s.trade_offs.is_empty()));
    }

    #[test]
    fn test_no_claim_is_shared() {
        let a = ShoeBuilder::new("a").daily().weight(200).feel([1, 5, 1, 5, 1, 1]).build();
        let b = ShoeBuilder::new("b").daily().weight(300).feel([5, 1, 5, 1, 5, 5]).build();
        let c = ShoeBuilder::new("c").daily().weight(250).feel([3, 3, 3, 3, 3, 3]).build();
        let sets = comparative_claims(&[&a, &b, &c]);
        let mut all: Vec<&String> = sets
            .iter()
            .flat_map(|s| s.strengths.iter().chain(s.trade_offs.iter()))
            .collect();
        let before = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), before);
    }

    #[test]
    fn test_single_shoe_gets_no_claims() {
        let a = ShoeBuilder::new("a").daily().plate(PlateMaterial::Carbon).build();
        assert_eq!(comparative_claims(&[&a]), vec![ClaimSet::default()]);
    }
}
