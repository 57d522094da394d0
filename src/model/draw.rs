//! The lottery's random draw-without-replacement.

use std::collections::HashSet;

use rand::{seq::SliceRandom, Rng};

use crate::error::{Error, Result};
use crate::model::common::CollaboratorId;

/// Reveals collaborators from a roster in random order, each exactly once
/// per lap; once the whole roster has been revealed the lap restarts with a
/// fresh permutation.
///
/// Drawn entries are tracked by collaborator id rather than roster index, so
/// an admin adding or removing collaborators mid-lap cannot wedge the cycle.
#[derive(Debug, Default)]
pub struct DrawEngine {
    drawn: HashSet<CollaboratorId>,
}

impl DrawEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the next collaborator id, uniformly at random among the roster
    /// entries not yet drawn this lap.
    pub fn draw<R: Rng>(&mut self, roster: &[CollaboratorId], rng: &mut R) -> Result<CollaboratorId> {
        if roster.is_empty() {
            return Err(Error::EmptyRoster);
        }

        // Start a new lap once every roster entry has been revealed.
        if roster.iter().all(|id| self.drawn.contains(id)) {
            self.drawn.clear();
        }

        let remaining = roster
            .iter()
            .copied()
            .filter(|id| !self.drawn.contains(id))
            .collect::<Vec<_>>();

        let choice = match remaining.choose(rng) {
            Some(&id) => id,
            None => {
                // Cannot happen with a stable roster; restart the lap from a
                // uniform pick over the whole roster.
                self.drawn.clear();
                // Valid because the roster is non-empty.
                *roster.choose(rng).unwrap()
            }
        };

        self.drawn.insert(choice);
        Ok(choice)
    }

    /// Forget the current lap.
    pub fn reset(&mut self) {
        self.drawn.clear();
    }
}
