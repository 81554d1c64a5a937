use crate::cli::OutputFormat;
use crate::infra::{load_answers, scoring_config};
use candidate_match::error::AppError;
use candidate_match::matching::{
    write_csv, CandidateId, CandidatePosition, MatchReport, MatchService, Question, QuestionId,
    RawAnswer, ResponseType, ScoringConfig, StaticCatalog, Topic, UserAnswerRecord,
};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Catalog JSON file with `questions` and `positions` rows
    #[arg(long)]
    pub(crate) catalog: PathBuf,
    /// Answers JSON file (array of answers or `{"answers": [...]}`)
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
    /// Only print the leading N candidates
    #[arg(long)]
    pub(crate) top: Option<usize>,
    /// Seed for the jitter source; only used with --jitter
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Enable bounded random jitter on per-question alignments
    #[arg(long)]
    pub(crate) jitter: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
    /// Only print the leading N candidates
    #[arg(long)]
    pub(crate) top: Option<usize>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        catalog,
        answers,
        format,
        top,
        seed,
        jitter,
    } = args;

    let catalog = StaticCatalog::from_path(&catalog)?;
    let answers = load_answers(&answers)?;
    let service = MatchService::new(Arc::new(catalog), scoring_config(jitter, seed));
    let report = service.match_answers(answers)?;

    let stdout = std::io::stdout();
    render_report(&report, format, top, &mut stdout.lock())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = MatchService::new(Arc::new(demo_catalog()), ScoringConfig::deterministic());
    let report = service.match_answers(demo_answers())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.format == OutputFormat::Table {
        writeln!(out, "Candidate match demo")?;
        writeln!(
            out,
            "Synthetic quiz: {} answers across {} policy areas",
            report.answer_count,
            Topic::ALL.len()
        )?;
    }
    render_report(&report, args.format, args.top, &mut out)
}

pub(crate) fn render_report<W: Write>(
    report: &MatchReport,
    format: OutputFormat,
    top: Option<usize>,
    out: &mut W,
) -> Result<(), AppError> {
    let limit = top.unwrap_or(report.matches.len());
    let matches = report.top(limit);

    match format {
        OutputFormat::Json => {
            let mut trimmed = report.clone();
            trimmed.matches = matches.to_vec();
            serde_json::to_writer_pretty(&mut *out, &trimmed).map_err(std::io::Error::from)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            write_csv(&mut *out, matches).map_err(std::io::Error::from)?;
        }
        OutputFormat::Table => {
            if matches.is_empty() {
                writeln!(out, "No candidates could be ranked for these answers.")?;
                return Ok(());
            }
            writeln!(
                out,
                "Ranked {} candidates from {} answers at {}",
                report.matches.len(),
                report.answer_count,
                report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            )?;
            for (index, entry) in matches.iter().enumerate() {
                writeln!(
                    out,
                    "{:>2}. {:<20} {:<18} {:>5.1}  ({} positions, {})",
                    index + 1,
                    entry.name,
                    entry.party,
                    entry.score,
                    entry.matched_positions,
                    entry.winning_pathway.label()
                )?;
                let areas: Vec<String> = entry
                    .alignment_by_area
                    .iter()
                    .map(|(topic, points)| format!("{} {:.0}", topic.label(), points))
                    .collect();
                if !areas.is_empty() {
                    writeln!(out, "    {}", areas.join(" | "))?;
                }
            }
        }
    }

    Ok(())
}

const DEMO_DIMENSION: usize = Topic::ALL.len() + 1;

const HEALTHCARE_OPTIONS: [&str; 3] = ["Private insurance", "Mixed system", "Single payer"];

fn topic_axis(topic: Topic) -> usize {
    Topic::ALL
        .iter()
        .position(|candidate| *candidate == topic)
        .unwrap_or(0)
}

/// Question embeddings are unit axes, one per topic.
fn question_embedding(topic: Topic) -> Vec<f32> {
    let mut embedding = vec![0.0; DEMO_DIMENSION];
    embedding[topic_axis(topic)] = 1.0;
    embedding
}

/// Unit vector whose cosine with the topic axis equals `agreement`; the remainder
/// lives on a shared off-topic axis.
fn position_embedding(topic: Topic, agreement: f32) -> Vec<f32> {
    let agreement = agreement.clamp(0.0, 1.0);
    let mut embedding = vec![0.0; DEMO_DIMENSION];
    embedding[topic_axis(topic)] = agreement;
    embedding[DEMO_DIMENSION - 1] = (1.0 - agreement * agreement).sqrt();
    embedding
}

struct DemoCandidate {
    id: &'static str,
    name: &'static str,
    party: &'static str,
    stances: &'static [(Topic, f32, &'static str)],
}

const DEMO_CANDIDATES: [DemoCandidate; 4] = [
    DemoCandidate {
        id: "alvarez",
        name: "Rosa Alvarez",
        party: "Green Alliance",
        stances: &[
            (Topic::Environment, 0.93, "Phase out coal by 2030"),
            (Topic::Healthcare, 0.74, "Expand public coverage"),
            (Topic::Economy, 0.31, "Green infrastructure bonds"),
            (Topic::Education, 0.66, "Free community college"),
            (Topic::SocialPolicy, 0.71, "Protect reproductive rights"),
        ],
    },
    DemoCandidate {
        id: "brennan",
        name: "Tom Brennan",
        party: "Liberty Party",
        stances: &[
            (Topic::Economy, 0.91, "Flat income tax"),
            (Topic::Security, 0.78, "Increase defense budget"),
            (Topic::Immigration, 0.64, "Points-based visas"),
            (Topic::Healthcare, 0.22, "Market-based insurance"),
            (Topic::Environment, 0.18, "Repeal emissions caps"),
            (Topic::Education, 0.45, "School choice vouchers"),
        ],
    },
    DemoCandidate {
        id: "osei",
        name: "Kwame Osei",
        party: "Labour Union",
        stances: &[
            (Topic::Economy, 0.58, "Raise the minimum wage"),
            (Topic::Healthcare, 0.88, "Single payer healthcare"),
            (Topic::Education, 0.81, "Double teacher pay"),
            (Topic::Immigration, 0.52, "Path to citizenship"),
            (Topic::SocialPolicy, 0.63, "Paid family leave"),
            (Topic::Security, 0.35, "Community policing"),
            (Topic::Environment, 0.57, "Just transition fund"),
        ],
    },
    DemoCandidate {
        id: "lindqvist",
        name: "Eva Lindqvist",
        party: "Independent",
        stances: &[
            (Topic::Security, 0.69, "Cyber defense agency"),
            (Topic::Immigration, 0.83, "Skilled worker fast track"),
        ],
    },
];

/// Deterministic synthetic catalog: one question per topic and four candidates with
/// uneven coverage.
pub(crate) fn demo_catalog() -> StaticCatalog {
    let questions = Topic::ALL
        .iter()
        .map(|topic| Question {
            id: QuestionId(format!("demo-{}", topic_axis(*topic) + 1)),
            topic: *topic,
            response_type: if *topic == Topic::Healthcare {
                ResponseType::SpecificChoice {
                    options: HEALTHCARE_OPTIONS.iter().map(|o| o.to_string()).collect(),
                }
            } else {
                ResponseType::AgreementScale
            },
            embedding: question_embedding(*topic),
            weight: if *topic == Topic::Economy { 1.5 } else { 1.0 },
        })
        .collect();

    let positions = DEMO_CANDIDATES
        .iter()
        .flat_map(|candidate| {
            candidate
                .stances
                .iter()
                .map(move |(topic, agreement, position)| CandidatePosition {
                    candidate_id: CandidateId(candidate.id.to_string()),
                    topic: *topic,
                    name: candidate.name.to_string(),
                    party: candidate.party.to_string(),
                    position: position.to_string(),
                    embedding: position_embedding(*topic, *agreement),
                })
        })
        .collect();

    StaticCatalog::new(questions, positions)
}

/// A respondent who cares about healthcare and the climate and is lukewarm on tax cuts.
pub(crate) fn demo_answers() -> Vec<UserAnswerRecord> {
    let ordinal = |topic: Topic, value: f64| UserAnswerRecord {
        question_id: Some(format!("demo-{}", topic_axis(topic) + 1)),
        answer: Some(RawAnswer::Number(value)),
        ..UserAnswerRecord::default()
    };

    vec![
        ordinal(Topic::Economy, 2.0),
        UserAnswerRecord {
            question_id: Some(format!("demo-{}", topic_axis(Topic::Healthcare) + 1)),
            answer: Some(RawAnswer::Text("Single payer".to_string())),
            ..UserAnswerRecord::default()
        },
        ordinal(Topic::Immigration, 3.0),
        ordinal(Topic::Environment, 5.0),
        ordinal(Topic::Education, 4.0),
        ordinal(Topic::Security, 2.0),
        ordinal(Topic::SocialPolicy, 4.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_report() -> MatchReport {
        MatchService::new(Arc::new(demo_catalog()), ScoringConfig::deterministic())
            .match_answers(demo_answers())
            .expect("demo ranks")
    }

    #[test]
    fn demo_catalog_covers_every_topic() {
        let summary = demo_catalog().summary();

        assert_eq!(summary.question_count, Topic::ALL.len());
        assert_eq!(summary.candidate_count, DEMO_CANDIDATES.len());
        assert_eq!(summary.topics.len(), Topic::ALL.len());
    }

    #[test]
    fn demo_ranks_every_candidate_within_bounds() {
        let report = demo_report();

        assert_eq!(report.answer_count, 7);
        assert_eq!(report.matches.len(), DEMO_CANDIDATES.len());
        for entry in &report.matches {
            assert!((0.0..=100.0).contains(&entry.score));
        }
    }

    #[test]
    fn table_output_respects_top_limit() {
        let report = demo_report();
        let mut out = Vec::new();

        render_report(&report, OutputFormat::Table, Some(2), &mut out).expect("renders");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains(&report.matches[0].name));
        assert!(text.contains(" 2. "));
        assert!(!text.contains(" 3. "));
    }

    #[test]
    fn table_lists_area_points_on_the_rank_scale() {
        let report = demo_report();
        let mut out = Vec::new();

        render_report(&report, OutputFormat::Table, Some(1), &mut out).expect("renders");

        let text = String::from_utf8(out).expect("utf8");
        let areas = text
            .lines()
            .find(|line| line.starts_with("    "))
            .expect("per-area line");
        assert!(!areas.contains('%'));
        for (topic, points) in &report.matches[0].alignment_by_area {
            assert!((0.0..=100.0).contains(points));
            assert!(areas.contains(&format!("{} {:.0}", topic.label(), points)));
        }
    }

    #[test]
    fn csv_output_has_header_and_rows() {
        let report = demo_report();
        let mut out = Vec::new();

        render_report(&report, OutputFormat::Csv, None, &mut out).expect("renders");

        let text = String::from_utf8(out).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("rank,candidate_id,name,party,score,matched_positions,pathway")
        );
        assert_eq!(lines.count(), DEMO_CANDIDATES.len());
    }

    #[test]
    fn json_output_is_a_trimmed_report() {
        let report = demo_report();
        let mut out = Vec::new();

        render_report(&report, OutputFormat::Json, Some(1), &mut out).expect("renders");

        let parsed: MatchReport = serde_json::from_slice(&out).expect("json report");
        assert_eq!(parsed.matches.len(), 1);
        assert_eq!(parsed.matches[0].candidate_id, report.matches[0].candidate_id);
    }

    #[test]
    fn empty_report_prints_notice() {
        let report = MatchReport::new(0, Vec::new());
        let mut out = Vec::new();

        render_report(&report, OutputFormat::Table, None, &mut out).expect("renders");

        assert!(String::from_utf8(out)
            .expect("utf8")
            .contains("No candidates could be ranked"));
    }
}
