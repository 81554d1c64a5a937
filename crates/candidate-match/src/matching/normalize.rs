use tracing::warn;

use super::domain::{QuestionId, RawAnswer, ResponseType};

/// Value substituted for any answer the normalizer cannot interpret.
pub const NEUTRAL_ANSWER: f64 = 0.5;

const SCALE_MIN: f64 = 1.0;
const SCALE_MAX: f64 = 5.0;

/// Map a raw answer onto [0, 1] according to the question's response type.
///
/// Total over all inputs: malformed answers fall back to [`NEUTRAL_ANSWER`] and are
/// reported through `tracing` instead of failing the session.
pub fn normalize_answer(
    question_id: &QuestionId,
    answer: &RawAnswer,
    response_type: &ResponseType,
) -> f64 {
    match response_type {
        ResponseType::AgreementScale => normalize_agreement(question_id, answer),
        ResponseType::SpecificChoice { options } => normalize_choice(question_id, answer, options),
        ResponseType::Unrecognized { label } => {
            warn!(question = %question_id, response_type = %label, "unknown response type; using neutral answer");
            NEUTRAL_ANSWER
        }
    }
}

fn normalize_agreement(question_id: &QuestionId, answer: &RawAnswer) -> f64 {
    let value = match answer {
        RawAnswer::Number(value) => Some(*value),
        RawAnswer::Text(raw) => raw.trim().parse::<f64>().ok(),
    };

    match value {
        Some(value)
            if value.is_finite()
                && value.fract() == 0.0
                && (SCALE_MIN..=SCALE_MAX).contains(&value) =>
        {
            (value - SCALE_MIN) / (SCALE_MAX - SCALE_MIN)
        }
        _ => {
            warn!(question = %question_id, %answer, "agreement answer outside 1..=5; using neutral answer");
            NEUTRAL_ANSWER
        }
    }
}

fn normalize_choice(question_id: &QuestionId, answer: &RawAnswer, options: &[String]) -> f64 {
    if options.is_empty() {
        warn!(question = %question_id, "choice question has no options; using neutral answer");
        return NEUTRAL_ANSWER;
    }

    let selected = answer.to_string();
    match options.iter().position(|option| option == &selected) {
        Some(_) if options.len() == 1 => 1.0,
        Some(index) => index as f64 / (options.len() - 1) as f64,
        None => {
            warn!(question = %question_id, %answer, "answer not among question options; using neutral answer");
            NEUTRAL_ANSWER
        }
    }
}
