// File:    drag.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Drag sessions that move matches by relative offsets, one per pointer or touch point.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Drag sessions: moving matches around by relative offsets, one session per pointer.

use crate::error::CribError;
use crate::matching::{MatchId, MatchStatus};
use crate::workspace::Workspace;
use std::collections::HashMap;

/// Identifies the pointer driving a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interaction {
    /// The mouse; there is only ever one.
    Mouse,
    /// A touch point, by its platform identifier.
    Touch(u64),
}

#[derive(Debug, Clone, Copy)]
struct DragAnchor {
    id: MatchId,
    start: usize,
    ciphertext_index: usize,
}

/// The drags currently in progress.
#[derive(Debug, Default)]
pub struct DragSessions {
    active: HashMap<Interaction, DragAnchor>,
}

impl DragSessions {
    /// Starts dragging a match. A match that is not yet confirmed is confirmed
    /// first; its position at this moment is the anchor for later moves.
    ///
    /// # Errors
    ///
    /// Returns [`CribError::UnknownMatch`] if the match does not exist, or any
    /// error from confirming it.
    pub fn begin(
        &mut self,
        workspace: &mut Workspace,
        interaction: Interaction,
        id: MatchId,
    ) -> Result<(), CribError> {
        let status = workspace.get(id).ok_or(CribError::UnknownMatch(id))?.status;
        if status != MatchStatus::Confirmed {
            workspace.confirm(id)?;
        }
        let m = workspace.get(id).ok_or(CribError::UnknownMatch(id))?;
        self.active.insert(
            interaction,
            DragAnchor {
                id,
                start: m.start,
                ciphertext_index: m.ciphertext_index,
            },
        );
        Ok(())
    }

    /// Moves the dragged match to its anchor shifted by `offsets` cells and
    /// `rows` ciphertexts. Out-of-range targets are clamped.
    ///
    /// Returns whether the match moved.
    ///
    /// # Errors
    ///
    /// Returns [`CribError::UnknownInteraction`] if no drag is in progress for
    /// `interaction`, or any error from [`Workspace::reposition`].
    pub fn drag_to(
        &self,
        workspace: &mut Workspace,
        interaction: Interaction,
        offsets: i64,
        rows: i64,
    ) -> Result<bool, CribError> {
        let anchor = self
            .active
            .get(&interaction)
            .ok_or(CribError::UnknownInteraction)?;
        workspace.reposition(
            anchor.id,
            shift(anchor.start, offsets),
            shift(anchor.ciphertext_index, rows),
        )
    }

    /// Ends a drag. Returns `false` if none was in progress.
    pub fn end(&mut self, interaction: Interaction) -> bool {
        self.active.remove(&interaction).is_some()
    }

    /// Abandons every drag, e.g. after the working set was replaced.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Whether any drag is in progress.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

fn shift(base: usize, delta: i64) -> i64 {
    i64::try_from(base).unwrap_or(i64::MAX).saturating_add(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ciphertext::CiphertextSet;
    use crate::classifier::ByteClassifier;

    fn workspace() -> Workspace {
        let set = CiphertextSet::new(vec![
            vec![1, 6, 7, 4],
            vec![5, 10, 11, 3],
            vec![6, 1, 0, 3],
        ]);
        Workspace::new(set, ByteClassifier::from_bytes(1..=9, []))
    }

    #[test]
    fn begin_confirms_and_moves_relative_to_anchor() {
        let mut ws = workspace();
        ws.set_crib(vec![3, 4]);
        ws.refresh().unwrap();
        let id = ws.pending()[0].id;

        let mut drags = DragSessions::default();
        drags.begin(&mut ws, Interaction::Mouse, id).unwrap();
        assert_eq!(ws.get(id).unwrap().status, MatchStatus::Confirmed);

        assert!(drags.drag_to(&mut ws, Interaction::Mouse, 1, 1).unwrap());
        let m = ws.get(id).unwrap();
        assert_eq!((m.start, m.ciphertext_index), (1, 1));
        assert_eq!(m.key, vec![10 ^ 3, 11 ^ 4]);

        // Offsets are relative to where the drag began, not to the last move.
        assert!(!drags.drag_to(&mut ws, Interaction::Mouse, 1, 1).unwrap());
        assert!(drags.drag_to(&mut ws, Interaction::Mouse, -9, 9).unwrap());
        let m = ws.get(id).unwrap();
        assert_eq!((m.start, m.ciphertext_index), (0, 2));

        assert!(drags.end(Interaction::Mouse));
        assert!(!drags.end(Interaction::Mouse));
        assert!(drags.is_empty());
    }

    #[test]
    fn touches_drag_independently() {
        let mut ws = workspace();
        let a = ws.restore_confirmed(vec![3, 4], 0, 0).unwrap();
        let b = ws.restore_confirmed(vec![1], 1, 3).unwrap();

        let mut drags = DragSessions::default();
        drags.begin(&mut ws, Interaction::Touch(1), a).unwrap();
        drags.begin(&mut ws, Interaction::Touch(2), b).unwrap();

        drags.drag_to(&mut ws, Interaction::Touch(2), -1, 0).unwrap();
        assert_eq!(ws.get(a).unwrap().start, 0);
        assert_eq!(ws.get(b).unwrap().start, 2);

        let err = drags
            .drag_to(&mut ws, Interaction::Mouse, 1, 0)
            .unwrap_err();
        assert!(matches!(err, CribError::UnknownInteraction));

        drags.clear();
        assert!(drags.is_empty());
    }
}
