//! Vote tallying: turn the raw nomination rows into per-category rankings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::common::{CategoryId, CollaboratorId};
use crate::model::db::Nomination;

/// One collaborator's vote count within a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyEntry {
    pub collaborator_id: CollaboratorId,
    pub votes: usize,
}

/// A ranking entry with its 1-based podium position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodiumEntry {
    pub collaborator_id: CollaboratorId,
    pub votes: usize,
    pub position: usize,
}

/// Group the given nominations by category and rank each category's
/// collaborators by vote count, descending.
///
/// Equal counts are ordered by ascending collaborator id, so the ranking is
/// deterministic for any input order. Every category id present in the input
/// appears as a key; collaborators without votes in a category are absent
/// rather than zero-padded.
pub fn tally(nominations: &[Nomination]) -> HashMap<CategoryId, Vec<TallyEntry>> {
    let mut counts: HashMap<CategoryId, HashMap<CollaboratorId, usize>> = HashMap::new();
    for nomination in nominations {
        *counts
            .entry(nomination.category_id)
            .or_default()
            .entry(nomination.collaborator_id)
            .or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(category_id, votes_by_collaborator)| {
            let mut ranking = votes_by_collaborator
                .into_iter()
                .map(|(collaborator_id, votes)| TallyEntry {
                    collaborator_id,
                    votes,
                })
                .collect::<Vec<_>>();
            ranking.sort_unstable_by(|a, b| {
                b.votes
                    .cmp(&a.votes)
                    .then(a.collaborator_id.cmp(&b.collaborator_id))
            });
            (category_id, ranking)
        })
        .collect()
}

/// Take the first `n` entries of a ranking, numbering them from position 1.
/// A ranking shorter than `n` yields a shorter podium, never a padded one.
pub fn top_n(ranking: &[TallyEntry], n: usize) -> Vec<PodiumEntry> {
    ranking
        .iter()
        .take(n)
        .enumerate()
        .map(|(index, entry)| PodiumEntry {
            collaborator_id: entry.collaborator_id,
            votes: entry.votes,
            position: index + 1,
        })
        .collect()
}
