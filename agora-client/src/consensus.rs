//! Node-local consensus over live votes.
//!
//! A node reaches consensus when at least two live votes agree and no live
//! vote disagrees. A single vote, or any mix of up and down votes, never
//! does. This has nothing to do with how the ledger itself agrees on state.

use crate::api::Vote;

/// Minimum number of concordant votes for consensus
pub const QUORUM: usize = 2;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Tally {
    pub up: usize,
    pub down: usize,
}

impl Tally {
    /// Counts live votes only
    ///
    /// Lists from `resolve_votes` are already live. Raw lists are accepted
    /// too, and their superseded votes are skipped here.
    pub fn of(votes: &[Vote]) -> Tally {
        votes
            .iter()
            .filter(|v| v.is_live())
            .fold(Tally::default(), |t, v| match v.up {
                true => Tally { up: t.up + 1, ..t },
                false => Tally {
                    down: t.down + 1,
                    ..t
                },
            })
    }

    pub fn is_consensus(&self) -> bool {
        (self.up >= QUORUM && self.down == 0) || (self.down >= QUORUM && self.up == 0)
    }
}

/// Whether `votes` reach consensus, resolved or not
pub fn evaluate(votes: &[Vote]) -> bool {
    let tally = Tally::of(votes);
    let consensus = tally.is_consensus();
    tracing::trace!(up = tally.up, down = tally.down, consensus, "evaluated consensus");
    consensus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::vote;

    fn votes(ups: &[bool]) -> Vec<Vote> {
        ups.iter()
            .enumerate()
            .map(|(i, up)| vote(i as u64, *up))
            .collect()
    }

    #[test]
    fn no_votes_is_no_consensus() {
        assert!(!evaluate(&[]));
    }

    #[test]
    fn single_vote_is_no_consensus() {
        assert!(!evaluate(&votes(&[true])));
        assert!(!evaluate(&votes(&[false])));
    }

    #[test]
    fn two_concordant_votes_reach_consensus() {
        assert!(evaluate(&votes(&[true, true])));
        assert!(evaluate(&votes(&[false, false])));
        assert!(evaluate(&votes(&[true, true, true])));
    }

    #[test]
    fn any_dissent_blocks_consensus() {
        assert!(!evaluate(&votes(&[true, false])));
        assert!(!evaluate(&votes(&[true, true, false])));
        assert!(!evaluate(&votes(&[false, false, false, true])));
    }

    #[test]
    fn superseded_votes_are_ignored() {
        let mut v = votes(&[true, true, false]);
        v[2].changed = true;
        assert!(evaluate(&v));
        v[1].changed = true;
        assert!(!evaluate(&v));
    }

    #[test]
    fn matches_quorum_rule() {
        bolero::check!()
            .with_type::<Vec<(bool, bool)>>()
            .for_each(|v| {
                let votes = v
                    .iter()
                    .enumerate()
                    .map(|(i, (up, changed))| {
                        let mut vote = vote(i as u64, *up);
                        vote.changed = *changed;
                        vote
                    })
                    .collect::<Vec<_>>();
                let up = v.iter().filter(|(up, changed)| *up && !*changed).count();
                let down = v.iter().filter(|(up, changed)| !*up && !*changed).count();
                assert_eq!(
                    evaluate(&votes),
                    (up > 1 && down == 0) || (down > 1 && up == 0),
                    "up={up} down={down}"
                );
            })
    }
}
