use crate::core::{AcceptanceThreshold, MatchOutcome, RankedProperty};
use crate::ranking::RankedCandidate;

/// Result set picked from a ranked candidate list
#[derive(Debug, Clone)]
pub struct Selection {
    pub outcome: MatchOutcome,
    pub results: Vec<RankedProperty>,
}

/// Pick the top `max_results` entries from candidates already sorted best first.
///
/// Entries at or above the threshold win; when there are none the best
/// available candidates are returned as a fallback.
pub fn select(
    ranked: &[RankedCandidate],
    threshold: AcceptanceThreshold,
    max_results: usize,
) -> Selection {
    if ranked.is_empty() {
        return Selection {
            outcome: MatchOutcome::Empty,
            results: Vec::new(),
        };
    }

    let accepted: Vec<&RankedCandidate> = ranked
        .iter()
        .filter(|c| threshold.accepts(c.score.total))
        .collect();

    let (outcome, picked): (MatchOutcome, Vec<&RankedCandidate>) = if accepted.is_empty() {
        (MatchOutcome::Fallback, ranked.iter().take(max_results).collect())
    } else {
        (MatchOutcome::Matched, accepted.into_iter().take(max_results).collect())
    };

    let results = picked
        .into_iter()
        .map(|c| RankedProperty::new(c.property.clone(), c.score, threshold))
        .collect();

    Selection { outcome, results }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PropertyCategory, PropertySummary, ScoreBreakdown, SimilarityScore};

    fn candidate(id: &str, total: u8) -> RankedCandidate {
        // Put the whole score on price so totals can be arbitrary
        let score = SimilarityScore::from_breakdown(ScoreBreakdown {
            price: total,
            ..Default::default()
        });
        RankedCandidate::new(
            PropertySummary::new(id, "Berlin", 1.0, 1.0, PropertyCategory::House, 1),
            score,
        )
    }

    fn ranked(totals: &[u8]) -> Vec<RankedCandidate> {
        let mut list: Vec<_> = totals
            .iter()
            .enumerate()
            .map(|(i, t)| candidate(&i.to_string(), *t))
            .collect();
        list.sort_by(|a, b| b.score.total.cmp(&a.score.total));
        list
    }

    #[test]
    fn test_result_size_is_bounded() {
        for count in [0usize, 1, 3, 10, 100] {
            let totals: Vec<u8> = (0..count).map(|i| (i % 101) as u8).collect();
            let selection = select(&ranked(&totals), AcceptanceThreshold::Balanced, 3);
            assert!(selection.results.len() <= 3, "count {}", count);
            assert_eq!(selection.results.len(), count.min(3));
        }
    }

    #[test]
    fn test_matched_entries_meet_threshold() {
        let selection = select(&ranked(&[100, 20, 65, 59]), AcceptanceThreshold::Exact, 3);

        assert_eq!(selection.outcome, MatchOutcome::Matched);
        assert_eq!(selection.results.len(), 2);
        assert!(selection.results.iter().all(|r| r.score.total >= 60));
        assert!(selection.results.iter().all(|r| !r.below_threshold));
    }

    #[test]
    fn test_fallback_returns_best_available() {
        let selection = select(&ranked(&[10, 55, 20, 35, 50]), AcceptanceThreshold::Exact, 3);

        assert_eq!(selection.outcome, MatchOutcome::Fallback);
        let totals: Vec<u8> = selection.results.iter().map(|r| r.score.total).collect();
        assert_eq!(totals, vec![55, 50, 35]);
        assert!(selection.results.iter().all(|r| r.below_threshold));
    }

    #[test]
    fn test_empty_candidates() {
        let selection = select(&[], AcceptanceThreshold::Broad, 3);
        assert_eq!(selection.outcome, MatchOutcome::Empty);
        assert!(selection.results.is_empty());
    }
}
