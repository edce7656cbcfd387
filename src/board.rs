//! The board: categories, links and the edit-mode flag, owned in one place
//! and handed to the engine's pure functions by reference.

use crate::config::LayoutConfig;
use crate::geometry::{Rect, colliding_pairs, is_clear};
use crate::measure::BlockMetrics;
use crate::placement::find_free_position;
use crate::session::{Block, Commit, SessionEnv};
use crate::state::{Link, LinkId, StateError, StoredCategory, StoredState};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("Category name must not be empty")]
    EmptyName,
    #[error("Category already exists: {0}")]
    DuplicateName(String),
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("Category still has links: {0}")]
    NotEmpty(String),
    #[error("Unknown link: {0}")]
    UnknownLink(LinkId),
    #[error("Board is locked while a drag or resize is in progress")]
    GestureActive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    /// `h` is derived from content and refreshed on every content change.
    pub rect: Rect,
}

pub struct Board {
    categories: Vec<Category>,
    links: Vec<Link>,
    edit_mode: bool,
    config: LayoutConfig,
    metrics: BlockMetrics,
}

impl Board {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            categories: Vec::new(),
            links: Vec::new(),
            edit_mode: false,
            metrics: BlockMetrics::from_config(&config),
            config,
        }
    }

    pub fn from_state(state: StoredState, config: LayoutConfig) -> Self {
        let mut board = Self::new(config);
        for stored in state.categories {
            let name = stored.name.trim().to_string();
            if name.is_empty() {
                tracing::warn!("dropping stored category with empty name");
                continue;
            }
            if board.category_index(&name).is_some() {
                tracing::warn!(%name, "dropping duplicate stored category");
                continue;
            }
            let w = if stored.w > 0 {
                stored.w
            } else {
                board.config.default_width
            };
            board.categories.push(Category {
                name,
                rect: Rect::new(stored.x, stored.y, w, 1),
            });
        }
        board.links = state.links;
        board.relayout();
        board
    }

    pub fn from_json(json: &str, config: LayoutConfig) -> Result<Self, StateError> {
        Ok(Self::from_state(StoredState::from_json(json)?, config))
    }

    pub fn to_state(&self) -> StoredState {
        StoredState {
            links: self.links.clone(),
            categories: self
                .categories
                .iter()
                .map(|c| StoredCategory {
                    name: c.name.clone(),
                    x: c.rect.x,
                    y: c.rect.y,
                    w: c.rect.w,
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, StateError> {
        self.to_state().to_json()
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    fn category_index(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name == name)
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn set_edit_mode(&mut self, on: bool) {
        self.edit_mode = on;
    }

    pub fn toggle_edit_mode(&mut self) -> bool {
        self.edit_mode = !self.edit_mode;
        self.edit_mode
    }

    /// Blocks in board order, which is also snapping tie-break order.
    pub fn blocks(&self) -> Vec<Block> {
        self.categories
            .iter()
            .map(|c| Block {
                id: c.name.clone(),
                rect: c.rect,
            })
            .collect()
    }

    /// Session environment over a fresh block list.
    pub fn session_env<'a>(&'a self, blocks: &'a [Block]) -> SessionEnv<'a> {
        SessionEnv {
            edit_mode: self.edit_mode,
            blocks,
            config: &self.config,
        }
    }

    fn link_count(&self, category: &str) -> usize {
        self.links.iter().filter(|l| l.category == category).count()
    }

    /// Recompute every block height from its content.
    fn relayout(&mut self) {
        for i in 0..self.categories.len() {
            let tiles = self.link_count(&self.categories[i].name);
            let cat = &mut self.categories[i];
            cat.rect.h = self.metrics.block_height(&cat.name, cat.rect.w, tiles);
        }
    }

    fn validate_new_name(&self, name: &str) -> Result<String, BoardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BoardError::EmptyName);
        }
        if self.category_index(name).is_some() {
            return Err(BoardError::DuplicateName(name.to_string()));
        }
        Ok(name.to_string())
    }

    /// Create a category and put it in the first free slot within `max_w`.
    pub fn add_category(&mut self, name: &str, max_w: i64) -> Result<Rect, BoardError> {
        let name = self.validate_new_name(name)?;
        let w = self.config.default_width;
        let h = self.metrics.block_height(&name, w, self.link_count(&name));

        let others: Vec<Rect> = self.categories.iter().map(|c| c.rect).collect();
        let pos = find_free_position(w, h, &others, max_w, self.config.min_gap);
        let rect = Rect::new(pos.x, pos.y, w, h);

        tracing::debug!(%name, x = rect.x, y = rect.y, "category added");
        self.categories.push(Category { name, rect });
        Ok(rect)
    }

    pub fn rename_category(&mut self, old: &str, new: &str) -> Result<(), BoardError> {
        let idx = self
            .category_index(old)
            .ok_or_else(|| BoardError::UnknownCategory(old.to_string()))?;
        if new.trim() == old {
            return Ok(());
        }
        let new = self.validate_new_name(new)?;

        for link in self.links.iter_mut().filter(|l| l.category == old) {
            link.category = new.clone();
        }
        self.categories[idx].name = new;
        self.relayout();
        Ok(())
    }

    /// Only categories without links may be removed.
    pub fn remove_category(&mut self, name: &str) -> Result<(), BoardError> {
        let idx = self
            .category_index(name)
            .ok_or_else(|| BoardError::UnknownCategory(name.to_string()))?;
        if self.link_count(name) > 0 {
            return Err(BoardError::NotEmpty(name.to_string()));
        }
        self.categories.remove(idx);
        Ok(())
    }

    /// Insert or replace a link by id.
    pub fn upsert_link(&mut self, link: Link) {
        match self.links.iter_mut().find(|l| l.id == link.id) {
            Some(existing) => *existing = link,
            None => self.links.push(link),
        }
        self.relayout();
    }

    pub fn remove_link(&mut self, id: LinkId) -> Result<Link, BoardError> {
        let idx = self
            .links
            .iter()
            .position(|l| l.id == id)
            .ok_or(BoardError::UnknownLink(id))?;
        let link = self.links.remove(idx);
        self.relayout();
        Ok(link)
    }

    /// Drop a tile onto another category. Returns whether anything changed;
    /// outside edit mode tiles do not move.
    pub fn move_link(&mut self, id: LinkId, category: &str) -> Result<bool, BoardError> {
        if !self.edit_mode {
            return Ok(false);
        }
        if self.category_index(category).is_none() {
            return Err(BoardError::UnknownCategory(category.to_string()));
        }
        let link = self
            .links
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(BoardError::UnknownLink(id))?;
        if link.category == category {
            return Ok(false);
        }
        link.category = category.to_string();
        self.relayout();
        Ok(true)
    }

    /// Write a finished gesture back into its category.
    pub fn apply_commit(&mut self, commit: &Commit) -> Result<(), BoardError> {
        let idx = self
            .category_index(&commit.id)
            .ok_or_else(|| BoardError::UnknownCategory(commit.id.clone()))?;
        let rect = self.categories[idx].rect;
        let w = commit.w.map_or(rect.w, |w| w.max(self.config.min_width));
        self.categories[idx].rect = Rect::new(commit.x, commit.y, w, rect.h);
        self.relayout();
        Ok(())
    }

    /// Name pairs of categories that are closer than the minimum gap.
    pub fn overlaps(&self) -> Vec<(String, String)> {
        let rects: Vec<Rect> = self.categories.iter().map(|c| c.rect).collect();
        colliding_pairs(&rects, self.config.min_gap)
            .into_iter()
            .map(|(i, j)| {
                (
                    self.categories[i].name.clone(),
                    self.categories[j].name.clone(),
                )
            })
            .collect()
    }

    /// Re-place, in board order, every category that collides with one
    /// placed before it. Returns how many moved.
    pub fn repair(&mut self, max_w: i64) -> usize {
        let mut placed: Vec<Rect> = Vec::with_capacity(self.categories.len());
        let mut moved = 0;
        for cat in &mut self.categories {
            if is_clear(&cat.rect, &placed, self.config.min_gap) {
                placed.push(cat.rect);
                continue;
            }
            let pos =
                find_free_position(cat.rect.w, cat.rect.h, &placed, max_w, self.config.min_gap);
            tracing::debug!(name = %cat.name, x = pos.x, y = pos.y, "re-placed overlapping category");
            cat.rect = cat.rect.at(pos);
            placed.push(cat.rect);
            moved += 1;
        }
        moved
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::geometry::Point;
    use crate::session::{Effect, LayoutSession, SessionEvent};
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Add,
        Drag { target: usize, dx: i64, dy: i64 },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Add),
            (0usize..8, -400i64..400, -400i64..400)
                .prop_map(|(target, dx, dy)| Op::Drag { target, dx, dy }),
        ]
    }

    proptest! {
        #[test]
        fn commits_never_overlap(ops in proptest::collection::vec(op_strategy(), 1..25)) {
            let mut board = Board::new(LayoutConfig::default());
            board.set_edit_mode(true);
            let mut session = LayoutSession::new();
            let mut counter = 0;

            for op in ops {
                match op {
                    Op::Add => {
                        board.add_category(&format!("cat{counter}"), 900).unwrap();
                        counter += 1;
                    }
                    Op::Drag { target, dx, dy } => {
                        if board.categories().is_empty() {
                            continue;
                        }
                        let id = board.categories()[target % board.categories().len()].name.clone();
                        let blocks = board.blocks();
                        let env = board.session_env(&blocks);
                        session.handle(SessionEvent::DragStart { id, pointer: Point::new(500, 500) }, &env);
                        for step in 1..=4 {
                            let p = Point::new(500 + dx * step / 4, 500 + dy * step / 4);
                            session.handle(SessionEvent::PointerMove(p), &env);
                        }
                        let effects = session.handle(SessionEvent::PointerUp, &env);
                        let commit = effects.into_iter().find_map(|e| match e {
                            Effect::Commit(c) => Some(c),
                            _ => None,
                        });
                        if let Some(commit) = commit {
                            board.apply_commit(&commit).unwrap();
                        }
                    }
                }
                prop_assert!(board.overlaps().is_empty());
                prop_assert!(board.categories().iter().all(|c| c.rect.x >= 0 && c.rect.y >= 0));
            }
        }
    }
}
