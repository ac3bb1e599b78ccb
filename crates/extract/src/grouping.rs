use std::collections::HashMap;

use crate::schema::{RelationCandidate, Triple};

/// All candidates that share one triple. Only built by [`group_relations`],
/// so a group is never empty.
#[derive(Debug, Clone)]
pub struct RelationGroup {
    triple: Triple,
    representative: RelationCandidate,
    rest: Vec<RelationCandidate>,
}

impl RelationGroup {
    fn new(triple: Triple, first: RelationCandidate) -> Self {
        Self {
            triple,
            representative: first,
            rest: Vec::new(),
        }
    }

    pub fn triple(&self) -> &Triple {
        &self.triple
    }

    /// First candidate seen for this triple.
    pub fn representative(&self) -> &RelationCandidate {
        &self.representative
    }

    /// Candidates in arrival order, representative first.
    pub fn candidates(&self) -> impl Iterator<Item = &RelationCandidate> {
        std::iter::once(&self.representative).chain(self.rest.iter())
    }

    pub fn candidate_count(&self) -> usize {
        1 + self.rest.len()
    }

    /// Evidence sentences in arrival order.
    pub fn sentences(&self) -> Vec<String> {
        self.candidates().map(|c| c.sentence.clone()).collect()
    }

    pub fn max_probability(&self) -> f64 {
        self.candidates()
            .map(|c| c.probability)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Partition candidates by exact triple equality.
///
/// Groups come out in first-seen order; candidates keep arrival order inside
/// each group. Every group holds at least one candidate.
pub fn group_relations(candidates: Vec<RelationCandidate>) -> Vec<RelationGroup> {
    let mut positions: HashMap<Triple, usize> = HashMap::new();
    let mut groups: Vec<RelationGroup> = Vec::new();

    for candidate in candidates {
        let triple = candidate.triple();
        match positions.get(&triple) {
            Some(&idx) => groups[idx].rest.push(candidate),
            None => {
                positions.insert(triple.clone(), groups.len());
                groups.push(RelationGroup::new(triple, candidate));
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(s: &str, p: &str, o: &str, sentence: &str) -> RelationCandidate {
        RelationCandidate {
            subject: s.to_string(),
            predicate: p.to_string(),
            object: o.to_string(),
            sentence: sentence.to_string(),
            source: String::new(),
            probability: 0.5,
        }
    }

    #[test]
    fn test_groups_by_triple() {
        let input = vec![
            candidate("Q76", "P26", "Q13133", "first"),
            candidate("Q76", "P26", "Q1", "other object"),
            candidate("Q76", "P26", "Q13133", "second"),
            candidate("Q76", "P27", "Q13133", "other predicate"),
            candidate("Q76", "P26", "Q13133", "third"),
        ];

        let groups = group_relations(input);
        assert_eq!(groups.len(), 3);

        let married = groups
            .iter()
            .find(|g| *g.triple() == Triple::new("Q76", "P26", "Q13133"))
            .unwrap();
        assert_eq!(married.sentences(), vec!["first", "second", "third"]);
        assert_eq!(married.representative().sentence, "first");
        assert_eq!(married.candidate_count(), 3);
    }

    #[test]
    fn test_grouping_is_a_partition() {
        let subjects = ["Q1", "Q2", "q1"];
        let objects = ["Q3", "Q4"];
        let mut input = Vec::new();
        for i in 0..30 {
            input.push(candidate(
                subjects[i % 3],
                "P1",
                objects[i % 2],
                &format!("s{i}"),
            ));
        }

        let groups = group_relations(input.clone());

        // Same multiset of candidates
        let total: usize = groups.iter().map(|g| g.candidate_count()).sum();
        assert_eq!(total, input.len());
        let mut flattened: Vec<String> = groups
            .iter()
            .flat_map(|g| g.candidates().map(|c| c.sentence.clone()))
            .collect();
        let mut expected: Vec<String> = input.iter().map(|c| c.sentence.clone()).collect();
        flattened.sort();
        expected.sort();
        assert_eq!(flattened, expected);

        // Same group iff equal triple; matching is case-sensitive
        assert_eq!(groups.len(), 6);
        for group in &groups {
            assert!(group.candidates().all(|c| c.triple() == *group.triple()));
        }
        for (i, a) in groups.iter().enumerate() {
            for b in &groups[i + 1..] {
                assert_ne!(a.triple(), b.triple());
            }
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(group_relations(Vec::new()).is_empty());
    }

    #[test]
    fn test_single_candidate_group() {
        let groups = group_relations(vec![candidate("Q1", "P1", "Q2", "only")]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].candidate_count(), 1);
        assert_eq!(groups[0].representative().sentence, "only");
        assert_eq!(groups[0].sentences(), vec!["only"]);
        assert_eq!(groups[0].max_probability(), 0.5);
    }

    #[test]
    fn test_max_probability() {
        let mut a = candidate("Q1", "P1", "Q2", "a");
        let mut b = candidate("Q1", "P1", "Q2", "b");
        a.probability = 0.3;
        b.probability = 0.8;
        let groups = group_relations(vec![a, b]);
        assert_eq!(groups[0].max_probability(), 0.8);
    }
}
