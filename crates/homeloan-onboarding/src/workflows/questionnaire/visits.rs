use super::domain::QuestionId;
use std::collections::BTreeSet;

/// Question ids the user has reached during the current session.
#[derive(Debug, Default, Clone)]
pub struct VisitTracker {
    visited: BTreeSet<QuestionId>,
}

impl VisitTracker {
    pub fn mark_visited(&mut self, id: QuestionId) {
        self.visited.insert(id);
    }

    /// Drops every visited id positioned after `id` in `order`, along with any id the
    /// order does not contain at all. Returns the removed ids.
    pub fn rewind_to(&mut self, id: QuestionId, order: &[QuestionId]) -> Vec<QuestionId> {
        let keep_through = order.iter().position(|candidate| *candidate == id);

        let removed: Vec<QuestionId> = self
            .visited
            .iter()
            .copied()
            .filter(|visited| {
                match (keep_through, order.iter().position(|candidate| candidate == visited)) {
                    (Some(limit), Some(position)) => position > limit,
                    (None, Some(_)) => false,
                    (_, None) => true,
                }
            })
            .collect();

        for id in &removed {
            self.visited.remove(id);
        }

        removed
    }

    pub fn size(&self) -> usize {
        self.visited.len()
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.visited.contains(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.visited.iter().copied()
    }

    pub fn clear(&mut self) {
        self.visited.clear();
    }
}
