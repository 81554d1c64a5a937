use std::collections::BTreeSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::common::*;
use crate::matching::config::ScoringConfig;
use crate::matching::domain::{QuestionId, RawAnswer, Topic, UserAnswer};
use crate::matching::engine::{MatchEngine, MatchError};
use crate::matching::similarity::SimilarityError;

#[test]
fn empty_answers_or_positions_yield_no_matches() {
    let questions = three_questions();
    let positions = specialist_positions();
    let answers = answers_for(&questions, &[5.0, 5.0, 5.0]);

    assert!(engine().rank(&questions, &positions, &[]).expect("ranks").is_empty());
    assert!(engine().rank(&questions, &[], &answers).expect("ranks").is_empty());
    assert!(engine().rank(&[], &positions, &answers).expect("ranks").is_empty());
}

#[test]
fn strongly_aligned_candidate_outranks_weakly_aligned_one() {
    let questions = vec![question("q1", Topic::Economy, 0)];
    let positions = vec![
        position("a", Topic::Economy, 0, 0.95),
        position("b", Topic::Economy, 0, 0.10),
    ];
    let answers = answers_for(&questions, &[5.0]);

    let matches = engine().rank(&questions, &positions, &answers).expect("ranks");

    assert_bounded(&matches);
    assert_eq!(matches[0].candidate_id.0, "a");
    assert!(find(&matches, "a").score > find(&matches, "b").score);
}

#[test]
fn order_of_position_rows_does_not_decide_the_winner() {
    let questions = vec![question("q1", Topic::Economy, 0)];
    let positions = vec![
        position("b", Topic::Economy, 0, 0.10),
        position("a", Topic::Economy, 0, 0.95),
    ];
    let answers = answers_for(&questions, &[5.0]);

    let matches = engine().rank(&questions, &positions, &answers).expect("ranks");

    assert_eq!(matches[0].candidate_id.0, "a");
}

#[test]
fn candidate_without_position_never_outranks_candidates_with_data() {
    let questions = vec![question("q1", Topic::Economy, 0)];
    let positions = vec![
        position("a", Topic::Economy, 0, 0.95),
        position("b", Topic::Economy, 0, 0.10),
        position("m", Topic::Healthcare, 1, 0.99),
    ];

    for value in 1..=5 {
        let answers = answers_for(&questions, &[f64::from(value)]);

        let matches = engine().rank(&questions, &positions, &answers).expect("ranks");

        assert_eq!(matches.len(), 3);
        assert_bounded(&matches);
        let missing = find(&matches, "m");
        assert_eq!(missing.matched_positions, 0, "answer {value}");
        assert_eq!(matches[2].candidate_id.0, "m", "answer {value}: {matches:?}");
        assert!(missing.score <= find(&matches, "a").score, "answer {value}");
        assert!(missing.score <= find(&matches, "b").score, "answer {value}");
    }
}

#[test]
fn uniform_maximum_answers_do_not_collapse_scores() {
    let questions = three_questions();
    let positions = graded_positions();
    let answers = answers_for(&questions, &[5.0, 5.0, 5.0]);

    let matches = engine().rank(&questions, &positions, &answers).expect("ranks");

    assert_bounded(&matches);
    let distinct: BTreeSet<u64> = matches.iter().map(|entry| entry.score.to_bits()).collect();
    assert!(distinct.len() > 1, "scores collapsed: {matches:?}");
}

#[test]
fn every_candidate_can_rank_first_for_some_profile() {
    let questions = three_questions();
    let positions = specialist_positions();
    let mut profiles: Vec<Vec<f64>> = vec![vec![1.0; 3], vec![3.0; 3], vec![5.0; 3]];
    for favored in 0..questions.len() {
        let mut profile = vec![1.0; questions.len()];
        profile[favored] = 5.0;
        profiles.push(profile);
    }

    let leaders: BTreeSet<String> = profiles
        .iter()
        .map(|profile| {
            let answers = answers_for(&questions, profile);
            let matches = engine().rank(&questions, &positions, &answers).expect("ranks");
            assert_bounded(&matches);
            matches[0].candidate_id.0.clone()
        })
        .collect();

    let expected: BTreeSet<String> = ["x", "y", "z"].iter().map(|id| id.to_string()).collect();
    assert_eq!(leaders, expected);
}

#[test]
fn specialist_leads_when_user_favors_their_question() {
    let questions = three_questions();
    let positions = specialist_positions();
    let answers = answers_for(&questions, &[5.0, 1.0, 1.0]);

    let matches = engine().rank(&questions, &positions, &answers).expect("ranks");

    assert_eq!(matches[0].candidate_id.0, "x");
    assert_eq!(matches[0].matched_positions, 3);
    assert_eq!(
        matches[0].alignment_by_area.keys().copied().collect::<Vec<_>>(),
        vec![Topic::Economy, Topic::Healthcare, Topic::Environment]
    );
}

#[test]
fn jitter_free_runs_are_bit_identical() {
    let questions = three_questions();
    let positions = graded_positions();
    let answers = answers_for(&questions, &[4.0, 2.0, 5.0]);

    let first = engine().rank(&questions, &positions, &answers).expect("ranks");
    let second = engine().rank(&questions, &positions, &answers).expect("ranks");

    assert_eq!(first, second);
}

#[test]
fn seeded_jitter_is_reproducible_and_bounded() {
    let questions = three_questions();
    let positions = specialist_positions();
    let answers = answers_for(&questions, &[4.0, 2.0, 5.0]);
    let engine = MatchEngine::new(ScoringConfig::with_jitter(Some(99)));

    let first = engine.rank(&questions, &positions, &answers).expect("ranks");
    let second = engine.rank(&questions, &positions, &answers).expect("ranks");

    assert_eq!(first, second);
    assert_bounded(&first);
}

#[test]
fn injected_rng_drives_the_perturbation() {
    let questions = three_questions();
    let positions = specialist_positions();
    // Neutral answers leave every alignment at exactly 0.5, so only jitter reorders.
    let answers = answers_for(&questions, &[3.0, 3.0, 3.0]);
    let engine = engine();
    let baseline = engine.rank(&questions, &positions, &answers).expect("ranks");

    let mut first_rng = ChaCha8Rng::seed_from_u64(5);
    let mut second_rng = ChaCha8Rng::seed_from_u64(5);
    let first = engine
        .rank_with_rng(&questions, &positions, &answers, &mut first_rng)
        .expect("ranks");
    let second = engine
        .rank_with_rng(&questions, &positions, &answers, &mut second_rng)
        .expect("ranks");
    assert_eq!(first, second);
    assert_bounded(&first);

    let perturbed = (0..16u64).any(|seed| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        engine
            .rank_with_rng(&questions, &positions, &answers, &mut rng)
            .expect("ranks")
            != baseline
    });
    assert!(perturbed, "jittered rankings never differed from the unjittered one");
}

#[test]
fn zero_amplitude_jitter_matches_the_deterministic_ranking() {
    let questions = three_questions();
    let positions = specialist_positions();
    let answers = answers_for(&questions, &[3.0, 3.0, 3.0]);
    let still = MatchEngine::new(ScoringConfig {
        jitter_amplitude: 0.0,
        ..ScoringConfig::with_jitter(Some(5))
    });

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let jittered = still
        .rank_with_rng(&questions, &positions, &answers, &mut rng)
        .expect("ranks");

    assert_eq!(
        jittered,
        engine().rank(&questions, &positions, &answers).expect("ranks")
    );
}

#[test]
fn adversarial_inputs_stay_within_bounds() {
    let questions = three_questions();
    let mut positions = specialist_positions();
    positions[0].embedding = vec![0.0; DIM];
    positions[4].embedding = vec![f32::NAN, 1.0, 0.0];
    positions[8].embedding = vec![f32::INFINITY, f32::NEG_INFINITY, 0.0];

    let mut answers = answers_for(&questions, &[f64::NAN, 99.0, -4.0]);
    answers.push(UserAnswer {
        answer: RawAnswer::Text("definitely".to_string()),
        ..answer(&questions[0], 0.0)
    });
    answers[1].embedding = vec![f32::NAN; DIM];

    let matches = engine().rank(&questions, &positions, &answers).expect("ranks");

    assert_eq!(matches.len(), 3);
    assert_bounded(&matches);
}

#[test]
fn unknown_question_references_are_skipped() {
    let questions = three_questions();
    let positions = specialist_positions();
    let answers = answers_for(&questions, &[5.0, 1.0, 3.0]);
    let mut noisy = answers.clone();
    noisy.push(UserAnswer {
        question_id: QuestionId("retired-question".to_string()),
        ..answer(&questions[0], 5.0)
    });
    noisy.push(UserAnswer {
        topic: Topic::Security,
        ..answer(&questions[1], 5.0)
    });

    let clean = engine().rank(&questions, &positions, &answers).expect("ranks");
    let skipped = engine().rank(&questions, &positions, &noisy).expect("ranks");

    assert_eq!(clean, skipped);
}

#[test]
fn answers_that_reference_nothing_known_yield_no_matches() {
    let questions = three_questions();
    let positions = specialist_positions();
    let answers = vec![UserAnswer {
        question_id: QuestionId("ghost".to_string()),
        ..answer(&questions[0], 5.0)
    }];

    assert!(engine().rank(&questions, &positions, &answers).expect("ranks").is_empty());
}

#[test]
fn empty_answer_embedding_falls_back_to_question_embedding() {
    let questions = three_questions();
    let positions = specialist_positions();
    let answers = answers_for(&questions, &[5.0, 1.0, 1.0]);
    let mut uncached = answers.clone();
    for answer in &mut uncached {
        answer.embedding.clear();
    }

    let cached = engine().rank(&questions, &positions, &answers).expect("ranks");
    let resolved = engine().rank(&questions, &positions, &uncached).expect("ranks");

    assert_eq!(cached, resolved);
}

#[test]
fn mismatched_embedding_lengths_fail_fast() {
    let questions = three_questions();
    let mut positions = specialist_positions();
    positions[1].embedding = vec![1.0, 0.0];
    let answers = answers_for(&questions, &[5.0, 1.0, 1.0]);

    let err = engine().rank(&questions, &positions, &answers).unwrap_err();

    assert_eq!(
        err,
        MatchError::ShapeMismatch {
            question: "q2".to_string(),
            candidate: "x".to_string(),
            source: SimilarityError::ShapeMismatch { left: 3, right: 2 },
        }
    );
}
