use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::CandidateMatch;

/// Outcome of one completed quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub generated_at: DateTime<Utc>,
    pub answer_count: usize,
    pub matches: Vec<CandidateMatch>,
}

/// Slice handed to the narration step: the leading matches and how many answers
/// produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationBrief {
    pub answer_count: usize,
    pub top: Vec<CandidateMatch>,
}

impl MatchReport {
    pub fn new(answer_count: usize, matches: Vec<CandidateMatch>) -> Self {
        Self {
            generated_at: Utc::now(),
            answer_count,
            matches,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn top(&self, limit: usize) -> &[CandidateMatch] {
        &self.matches[..limit.min(self.matches.len())]
    }

    pub fn brief(&self, limit: usize) -> NarrationBrief {
        NarrationBrief {
            answer_count: self.answer_count,
            top: self.top(limit).to_vec(),
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    rank: usize,
    candidate_id: &'a str,
    name: &'a str,
    party: &'a str,
    score: String,
    matched_positions: usize,
    pathway: &'static str,
}

/// Export the ranking as CSV with a header row.
pub fn write_csv<W: Write>(writer: W, matches: &[CandidateMatch]) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    for (index, entry) in matches.iter().enumerate() {
        csv.serialize(CsvRow {
            rank: index + 1,
            candidate_id: &entry.candidate_id.0,
            name: &entry.name,
            party: &entry.party,
            score: format!("{:.1}", entry.score),
            matched_positions: entry.matched_positions,
            pathway: entry.winning_pathway.label(),
        })?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::domain::CandidateId;
    use crate::matching::pathways::Pathway;
    use std::collections::BTreeMap;

    fn entry(id: &str, score: f64) -> CandidateMatch {
        CandidateMatch {
            candidate_id: CandidateId(id.to_string()),
            name: format!("Candidate {id}"),
            party: "Civic, Reform".to_string(),
            score,
            matched_positions: 3,
            alignment_by_area: BTreeMap::new(),
            winning_pathway: Pathway::Consistency,
        }
    }

    #[test]
    fn brief_truncates_to_available_matches() {
        let report = MatchReport::new(12, vec![entry("a", 80.0), entry("b", 60.0)]);

        assert_eq!(report.brief(1).top.len(), 1);
        assert_eq!(report.brief(5).top.len(), 2);
        assert_eq!(report.brief(5).answer_count, 12);
    }

    #[test]
    fn csv_export_quotes_fields_and_ranks_rows() {
        let mut buffer = Vec::new();

        write_csv(&mut buffer, &[entry("a", 81.34), entry("b", 60.0)]).expect("csv writes");

        let text = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "rank,candidate_id,name,party,score,matched_positions,pathway"
        );
        assert_eq!(lines[1], "1,a,Candidate a,\"Civic, Reform\",81.3,3,consistency");
        assert_eq!(lines.len(), 3);
    }
}
