use std::collections::BTreeMap;

use super::domain::Topic;

/// Linear points for a rank: first place 100, last place 0.
pub fn rank_points(rank_index: usize, candidate_count: usize) -> f64 {
    if candidate_count <= 1 {
        return 100.0;
    }
    let last = (candidate_count - 1) as f64;
    100.0 * (last - rank_index.min(candidate_count - 1) as f64) / last
}

/// Candidate indices ordered by descending alignment; ties keep input order.
pub fn rank_order(alignments: &[f64]) -> Vec<usize> {
    let present: Vec<Option<f64>> = alignments.iter().copied().map(Some).collect();
    rank_order_with_gaps(&present)
}

/// Like [`rank_order`], but `None` entries (no position on the topic) rank after
/// every candidate that has one.
pub fn rank_order_with_gaps(alignments: &[Option<f64>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..alignments.len()).collect();
    order.sort_by(|&a, &b| {
        let (left, right) = (alignments[a], alignments[b]);
        let key = |value: Option<f64>| sanitize(value.unwrap_or(f64::MIN));
        right
            .is_some()
            .cmp(&left.is_some())
            .then_with(|| key(right).total_cmp(&key(left)))
    });
    order
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        f64::MIN
    }
}

/// Running totals for one candidate across every ranked question.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateTally {
    pub weighted_total: f64,
    pub weight_sum: f64,
    /// Unweighted points, one entry per question in processing order.
    pub points: Vec<f64>,
    topics: BTreeMap<Topic, AreaTotals>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct AreaTotals {
    weighted: f64,
    weight: f64,
    points: f64,
    questions: usize,
}

impl AreaTotals {
    fn mean(&self) -> f64 {
        if self.weight > 0.0 {
            self.weighted / self.weight
        } else {
            self.points / self.questions.max(1) as f64
        }
    }
}

impl CandidateTally {
    /// Weighted mean of points, 0 when no question carried weight.
    pub fn average_points(&self) -> f64 {
        if self.weight_sum > 0.0 {
            self.weighted_total / self.weight_sum
        } else {
            0.0
        }
    }

    pub fn min_points(&self) -> f64 {
        self.points.iter().copied().reduce(f64::min).unwrap_or(0.0)
    }

    /// Weight-normalized mean points per topic, on the 0-100 rank scale.
    pub fn alignment_by_area(&self) -> BTreeMap<Topic, f64> {
        self.topics
            .iter()
            .map(|(topic, totals)| (*topic, totals.mean()))
            .collect()
    }
}

/// Ranks all candidates question by question and accumulates their points.
#[derive(Debug, Clone)]
pub struct QuestionRanker {
    tallies: Vec<CandidateTally>,
}

impl QuestionRanker {
    pub fn new(candidate_count: usize) -> Self {
        Self {
            tallies: vec![CandidateTally::default(); candidate_count],
        }
    }

    /// Rank one question. `alignments[i]` belongs to candidate `i`.
    pub fn record(&mut self, topic: Topic, weight: f64, alignments: &[f64]) {
        self.record_order(topic, weight, rank_order(alignments));
    }

    /// Rank one question where some candidates have no position on its topic.
    pub fn record_with_gaps(&mut self, topic: Topic, weight: f64, alignments: &[Option<f64>]) {
        self.record_order(topic, weight, rank_order_with_gaps(alignments));
    }

    fn record_order(&mut self, topic: Topic, weight: f64, order: Vec<usize>) {
        debug_assert_eq!(order.len(), self.tallies.len());
        let count = self.tallies.len();
        let weight = if weight.is_finite() && weight > 0.0 { weight } else { 0.0 };

        for (rank, candidate) in order.into_iter().enumerate() {
            let points = rank_points(rank, count);
            let weighted = points * weight;
            let tally = &mut self.tallies[candidate];
            tally.weighted_total += weighted;
            tally.weight_sum += weight;
            tally.points.push(points);
            let area = tally.topics.entry(topic).or_default();
            area.weighted += weighted;
            area.weight += weight;
            area.points += points;
            area.questions += 1;
        }
    }

    pub fn into_tallies(self) -> Vec<CandidateTally> {
        self.tallies
    }
}
