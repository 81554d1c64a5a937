use super::baseline::CandidateBaseline;

/// Signed user orientation in [-1, 1] from a normalized answer.
pub fn user_stance(normalized_answer: f64) -> f64 {
    (normalized_answer - 0.5) * 2.0
}

/// Z-scored candidate orientation; a missing position contributes no signal.
pub fn candidate_stance(raw_similarity: Option<f64>, baseline: &CandidateBaseline) -> f64 {
    match raw_similarity {
        Some(raw) => baseline.z_score(raw),
        None => 0.0,
    }
}

/// Directional agreement: same-sign stances land above 0.5, opposite signs below.
pub fn stance_alignment(candidate_stance: f64, user_stance: f64) -> f64 {
    (candidate_stance * user_stance + 1.0) / 2.0
}
