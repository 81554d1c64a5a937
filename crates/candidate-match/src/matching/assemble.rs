use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use super::domain::{CandidateId, CandidateMatch, CandidatePosition, Topic};

/// One candidate and the positions it has on file, keyed by topic.
#[derive(Debug, Clone)]
pub(crate) struct CandidateEntry<'a> {
    pub id: &'a CandidateId,
    pub name: &'a str,
    pub party: &'a str,
    pub positions: HashMap<Topic, &'a CandidatePosition>,
}

impl<'a> CandidateEntry<'a> {
    pub fn position(&self, topic: Topic) -> Option<&'a CandidatePosition> {
        self.positions.get(&topic).copied()
    }

    pub fn topics_covered(&self) -> usize {
        self.positions.len()
    }
}

/// Distinct candidates in order of first appearance in the position rows.
pub(crate) fn candidate_roster(positions: &[CandidatePosition]) -> Vec<CandidateEntry<'_>> {
    let mut roster: Vec<CandidateEntry<'_>> = Vec::new();
    let mut index: HashMap<&CandidateId, usize> = HashMap::new();

    for position in positions {
        let slot = *index.entry(&position.candidate_id).or_insert_with(|| {
            roster.push(CandidateEntry {
                id: &position.candidate_id,
                name: &position.name,
                party: &position.party,
                positions: HashMap::new(),
            });
            roster.len() - 1
        });

        let entry = &mut roster[slot];
        if entry.positions.contains_key(&position.topic) {
            warn!(
                candidate = %position.candidate_id,
                topic = position.topic.label(),
                "duplicate position row ignored"
            );
            continue;
        }
        entry.positions.insert(position.topic, position);
    }

    roster
}

/// Build the public match record for a scored candidate.
pub(crate) fn candidate_match(
    entry: &CandidateEntry<'_>,
    score: f64,
    matched_positions: usize,
    alignment_by_area: BTreeMap<Topic, f64>,
    winning_pathway: super::pathways::Pathway,
) -> CandidateMatch {
    CandidateMatch {
        candidate_id: entry.id.clone(),
        name: entry.name.to_string(),
        party: entry.party.to_string(),
        score,
        matched_positions,
        alignment_by_area,
        winning_pathway,
    }
}

/// A finished match with the unclamped strength of its winning pathway.
#[derive(Debug, Clone)]
pub(crate) struct RankedMatch {
    pub entry: CandidateMatch,
    pub strength: f64,
}

/// Sort descending by score, then by unclamped strength; full ties keep roster order.
pub(crate) fn sort_matches(mut ranked: Vec<RankedMatch>) -> Vec<CandidateMatch> {
    ranked.sort_by(|a, b| {
        b.entry
            .score
            .partial_cmp(&a.entry.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.strength.partial_cmp(&a.strength).unwrap_or(Ordering::Equal))
    });
    ranked.into_iter().map(|ranked| ranked.entry).collect()
}
