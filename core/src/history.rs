use crate::terrain::Terrain;

pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Retained terrain revisions. `revisions[..=cursor]` are the undoable past and
/// the current terrain, anything after the cursor can be redone. Committing a
/// new revision after an undo drops the redo tail.
#[derive(Debug, Clone)]
pub struct TerrainHistory {
    revisions: Vec<Terrain>,
    cursor: usize,
    max_depth: usize,
}

impl TerrainHistory {
    pub fn new(initial: Terrain) -> Self {
        Self::with_depth(initial, DEFAULT_HISTORY_DEPTH)
    }

    pub fn with_depth(initial: Terrain, max_depth: usize) -> Self {
        Self {
            revisions: vec![initial],
            cursor: 0,
            max_depth: max_depth.max(1),
        }
    }

    pub fn current(&self) -> &Terrain {
        &self.revisions[self.cursor]
    }

    pub fn commit(&mut self, terrain: Terrain) -> &Terrain {
        self.revisions.truncate(self.cursor + 1);
        self.revisions.push(terrain);

        if self.revisions.len() > self.max_depth {
            let excess = self.revisions.len() - self.max_depth;
            self.revisions.drain(0..excess);
        }
        self.cursor = self.revisions.len() - 1;
        self.current()
    }

    pub fn undo(&mut self) -> Option<&Terrain> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn redo(&mut self) -> Option<&Terrain> {
        if self.cursor + 1 >= self.revisions.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.revisions.len()
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }
}
