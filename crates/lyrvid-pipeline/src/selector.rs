//! Audio source candidate selection.

use lyrvid_models::Candidate;

/// Uploader suffix marking auto-generated official audio channels.
const TOPIC_CHANNEL_MARKER: &str = " - Topic";

/// Pick the best candidate by duration distance to the canonical target.
///
/// A candidate wins when it is strictly closer than the best so far, or
/// ties the best and comes from a topic channel — official audio uploads
/// get the tie-break without having to be strictly closer. For true ties
/// among non-topic candidates the earliest arrival wins; the result is
/// deterministic for a fixed input order but not invariant under
/// reordering.
pub fn select_candidate<'a>(
    candidates: &'a [Candidate],
    target_duration: f64,
) -> Option<&'a Candidate> {
    let mut best: Option<&Candidate> = None;
    let mut min_diff = f64::INFINITY;

    for candidate in candidates {
        let diff = (candidate.duration_or_zero() - target_duration).abs();
        let is_topic = candidate.uploader_name().contains(TOPIC_CHANNEL_MARKER);

        if diff < min_diff || (is_topic && diff <= min_diff) {
            best = Some(candidate);
            min_diff = diff;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(duration: f64, uploader: &str) -> Candidate {
        Candidate {
            duration: Some(duration),
            uploader: Some(uploader.to_string()),
            source_url: format!("https://example.com/{uploader}/{duration}"),
        }
    }

    #[test]
    fn strictly_closer_duration_wins() {
        let candidates = vec![candidate(200.0, "X"), candidate(205.0, "Y - Topic")];
        // diff 3 vs 2: 205 wins on distance, not on the channel marker.
        let best = select_candidate(&candidates, 203.0).unwrap();
        assert_eq!(best.duration_or_zero(), 205.0);
    }

    #[test]
    fn exact_topic_match_beats_closer_start() {
        let candidates = vec![candidate(198.0, "X"), candidate(200.0, "Y - Topic")];
        let best = select_candidate(&candidates, 200.0).unwrap();
        assert_eq!(best.uploader_name(), "Y - Topic");
    }

    #[test]
    fn equal_diff_tie_goes_to_topic_channel() {
        let candidates = vec![candidate(198.0, "X"), candidate(202.0, "Y - Topic")];
        let best = select_candidate(&candidates, 200.0).unwrap();
        assert_eq!(best.uploader_name(), "Y - Topic");
    }

    #[test]
    fn equal_diff_non_topic_keeps_first_arrival() {
        let candidates = vec![candidate(198.0, "A"), candidate(202.0, "B")];
        let best = select_candidate(&candidates, 200.0).unwrap();
        assert_eq!(best.uploader_name(), "A");
    }

    #[test]
    fn empty_input_selects_nothing() {
        assert!(select_candidate(&[], 200.0).is_none());
    }

    #[test]
    fn missing_duration_counts_as_zero() {
        let mut far = candidate(0.0, "No Duration");
        far.duration = None;
        let candidates = vec![far, candidate(199.0, "Close")];
        let best = select_candidate(&candidates, 200.0).unwrap();
        assert_eq!(best.uploader_name(), "Close");
    }
}
