use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

/// A set of unique members, each carrying a score.
///
/// Two structures are kept in lockstep:
/// - `members`: member -> score, ordered by member name. It owns the scores and defines the
///   order used by index ranges.
/// - `scores`: `(score, member)` entries ordered by score, ties by member name. The member name
///   is the join key back into `members`.
///
/// Every mutation updates both before returning, so `scores` holds exactly one entry per member,
/// with the same score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedSet {
    members: BTreeMap<String, f64>,
    scores: BTreeSet<ScoreKey>,
}

/// Scores are never NaN, see `utils::score::parse_score`.
#[derive(Debug, Clone, Copy)]
struct OrderedScore(f64);

impl PartialEq for OrderedScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderedScore {}

impl PartialOrd for OrderedScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ScoreKey {
    score: OrderedScore,
    member: String,
}

impl ScoreKey {
    fn new(score: f64, member: &str) -> Self {
        Self {
            score: OrderedScore(score),
            member: member.to_string(),
        }
    }
}

impl SortedSet {
    pub fn new() -> SortedSet {
        SortedSet::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Inserts `member` or moves it to `score`. Returns `true` when the member is new.
    pub fn insert(&mut self, member: &str, score: f64) -> bool {
        match self.members.get_mut(member) {
            Some(current) => {
                let stale = ScoreKey::new(*current, member);
                assert!(
                    self.scores.remove(&stale),
                    "score index has no entry for member {member}"
                );
                *current = score;
                self.scores.insert(ScoreKey::new(score, member));
                false
            }
            None => {
                self.members.insert(member.to_string(), score);
                self.scores.insert(ScoreKey::new(score, member));
                true
            }
        }
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        self.members.get(member).copied()
    }

    /// Removes `member` from both indexes. Returns `true` if it was present.
    pub fn remove(&mut self, member: &str) -> bool {
        let Some(score) = self.members.remove(member) else {
            return false;
        };

        assert!(
            self.scores.remove(&ScoreKey::new(score, member)),
            "score index has no entry for member {member}"
        );
        true
    }

    /// Members at positions `start..=stop` in member-name order. `stop` is clamped to the last
    /// member.
    pub fn range_by_index(
        &self,
        start: usize,
        stop: usize,
    ) -> impl Iterator<Item = (&str, f64)> + '_ {
        let count = stop.saturating_sub(start).saturating_add(1);
        self.members
            .iter()
            .skip(start)
            .take(if stop < start { 0 } else { count })
            .map(|(member, score)| (member.as_str(), *score))
    }

    /// Members whose score lies in `min..=max`, ordered by score, then member name.
    pub fn range_by_score(&self, min: f64, max: f64) -> impl Iterator<Item = (&str, f64)> + '_ {
        // The empty name sorts before every other member with the same score.
        let lower = ScoreKey::new(min, "");
        let max = OrderedScore(max);

        self.scores
            .range((Bound::Included(lower), Bound::Unbounded))
            .take_while(move |key| key.score <= max)
            .map(|key| (key.member.as_str(), key.score.0))
    }

    /// Removes every member whose score lies in `min..=max`. Returns how many were removed.
    pub fn remove_range_by_score(&mut self, min: f64, max: f64) -> usize {
        let doomed: Vec<ScoreKey> = self
            .range_by_score(min, max)
            .map(|(member, score)| ScoreKey::new(score, member))
            .collect();

        for key in &doomed {
            self.members.remove(&key.member);
            self.scores.remove(key);
        }

        doomed.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.members
            .iter()
            .map(|(member, score)| (member.as_str(), *score))
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        self.members.len() == self.scores.len()
            && self
                .scores
                .iter()
                .all(|key| self.members.get(&key.member) == Some(&key.score.0))
    }
}
