//! CLI handler for the `rank` command: scored breakdowns for diagnostics.

use anyhow::{bail, Result};
use std::path::PathBuf;
use stride_matching::{AnalysisQuery, ScoredCandidate};

use super::{build_engine, catalogue_provider, read_request};
use crate::request::{MatchRequest, RawRequest};

/// Handle the `rank` command.
pub(crate) fn handle_rank_command(
    request: PathBuf,
    catalogue: Option<PathBuf>,
    table: Option<PathBuf>,
    limit: usize,
) -> Result<()> {
    let raw = RawRequest::from_json(&read_request(&request)?)?;
    let query = match raw.into_request(Vec::new())? {
        MatchRequest::Analysis(query) => query,
        MatchRequest::GapDetection {
            profile,
            current_shoes,
        } => AnalysisQuery {
            profile,
            current_shoes,
            ..AnalysisQuery::default()
        },
        MatchRequest::Discovery(_) => bail!("rank takes analysis or gap_detection requests"),
    };

    let engine = build_engine(table.as_deref())?;
    let catalogue = catalogue_provider(catalogue)?.load()?;
    let ranking = engine.rank(&catalogue, &query)?;

    println!(
        "Gap: {} ({:?}, severity {:?}) -> {}",
        ranking.gap.kind.label(),
        ranking.gap.tier,
        ranking.gap.severity,
        ranking.gap.target_category
    );
    println!("  {}", ranking.gap.rationale);
    println!(
        "Retrieval stage: {:?}, {} candidates",
        ranking.retrieval.stage,
        ranking.retrieval.candidates.len()
    );
    println!();
    println!(
        "{:>3}  {:<28} {:>6}  {:>5} {:>5} {:>5} {:>5} {:>5} {:>5} {:>5} {:>5} {:>5} {:>5}",
        "#", "shoe", "score", "cat", "feel", "drop", "stab", "avail", "vers", "prof", "rot", "ctx", "contr"
    );
    for (i, candidate) in ranking.retrieval.candidates.iter().take(limit).enumerate() {
        println!("{}", format_row(i + 1, candidate));
    }
    Ok(())
}

fn format_row(rank: usize, candidate: &ScoredCandidate<'_>) -> String {
    let b = &candidate.breakdown;
    format!(
        "{:>3}  {:<28} {:>6.1}  {:>5.1} {:>5.1} {:>5.1} {:>5.1} {:>5.1} {:>5.1} {:>5.1} {:>5.1} {:>5.1} {:>5.1}",
        rank,
        truncate(candidate.id(), 28),
        candidate.score,
        b.category,
        b.feel,
        b.heel_drop,
        b.stability,
        b.availability,
        b.versatility,
        b.profile,
        b.rotation,
        b.context,
        b.contrast
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_matching::ScoreBreakdown;
    use stride_test_utils::ShoeBuilder;

    #[test]
    fn test_row_formatting() {
        let shoe = ShoeBuilder::new("cloud-daily").daily().build();
        let candidate = ScoredCandidate::new(
            &shoe,
            ScoreBreakdown {
                category: 40.0,
                feel: 12.5,
                ..ScoreBreakdown::default()
            },
        );
        let row = format_row(1, &candidate);
        assert!(row.contains("cloud-daily"));
        assert!(row.contains("52.5"));
    }

    #[test]
    fn test_truncate_long_ids() {
        assert_eq!(truncate("short", 10), "short");
        let long = truncate("a-very-long-shoe-identifier-v2", 10);
        assert_eq!(long.chars().count(), 10);
        assert!(long.ends_with('…'));
    }
}
