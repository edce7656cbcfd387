//! Drag and resize gestures as an explicit state machine.
//!
//! A gesture freezes the other blocks at its start, feeds every pointer
//! move through snapping and the collision clamp, and only touches
//! category data through the [`Commit`] it emits on release.

use crate::config::LayoutConfig;
use crate::geometry::{Point, Rect, colliding_pairs};
use crate::mover::constrain_move;
use crate::snap::{Guide, snap};

/// One block as seen by the session: the category name and its footprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: String,
    pub rect: Rect,
}

/// Position (and for resizes, width) to write back into one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: String,
    pub x: i64,
    pub y: i64,
    pub w: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Pointer down on a block's title handle.
    DragStart { id: String, pointer: Point },
    /// Pointer down on a block's resize handle.
    ResizeStart { id: String, pointer: Point },
    PointerMove(Point),
    PointerUp,
    /// Abort the gesture without committing (Escape).
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ClearGuides,
    DrawGuides(Vec<Guide>),
    /// Draw or move the dashed outline of the dragged block.
    ShowPhantom(Rect),
    HidePhantom,
    PreviewWidth { id: String, w: i64 },
    Commit(Commit),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub moving_id: String,
    pub origin: Rect,
    pub pointer_origin: Point,
    pub last_valid: Point,
    others: Vec<Rect>,
    pinned: bool,
}

impl DragState {
    /// The frozen snapshot the gesture validates against.
    pub fn others(&self) -> &[Rect] {
        &self.others
    }

    pub fn phantom(&self) -> Rect {
        self.origin.at(self.last_valid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeState {
    pub moving_id: String,
    pub origin: Rect,
    pub pointer_origin: Point,
    pub width: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Dragging(DragState),
    Resizing(ResizeState),
}

/// What a transition may read from outside the session.
pub struct SessionEnv<'a> {
    pub edit_mode: bool,
    /// Every block on the board, in board order.
    pub blocks: &'a [Block],
    pub config: &'a LayoutConfig,
}

/// Pure transition function: `(state, event) -> (state, effects)`.
pub fn transition(
    state: SessionState,
    event: SessionEvent,
    env: &SessionEnv<'_>,
) -> (SessionState, Vec<Effect>) {
    match (state, event) {
        (SessionState::Idle, SessionEvent::DragStart { id, pointer }) => {
            start_drag(id, pointer, env)
        }
        (SessionState::Idle, SessionEvent::ResizeStart { id, pointer }) => {
            start_resize(id, pointer, env)
        }
        (SessionState::Dragging(drag), SessionEvent::PointerMove(pointer)) => {
            drag_move(drag, pointer, env.config)
        }
        (SessionState::Dragging(drag), SessionEvent::PointerUp) => {
            tracing::debug!(
                id = %drag.moving_id,
                x = drag.last_valid.x,
                y = drag.last_valid.y,
                "drag committed"
            );
            let commit = Commit {
                id: drag.moving_id,
                x: drag.last_valid.x,
                y: drag.last_valid.y,
                w: None,
            };
            (
                SessionState::Idle,
                vec![Effect::HidePhantom, Effect::ClearGuides, Effect::Commit(commit)],
            )
        }
        (SessionState::Dragging(drag), SessionEvent::Cancel) => {
            tracing::debug!(id = %drag.moving_id, "drag cancelled");
            (SessionState::Idle, vec![Effect::HidePhantom, Effect::ClearGuides])
        }
        (SessionState::Resizing(mut resize), SessionEvent::PointerMove(pointer)) => {
            let dx = pointer.x - resize.pointer_origin.x;
            resize.width = (resize.origin.w + dx).max(env.config.min_width);
            let effect = Effect::PreviewWidth {
                id: resize.moving_id.clone(),
                w: resize.width,
            };
            (SessionState::Resizing(resize), vec![effect])
        }
        (SessionState::Resizing(resize), SessionEvent::PointerUp) => {
            tracing::debug!(id = %resize.moving_id, w = resize.width, "resize committed");
            let commit = Commit {
                id: resize.moving_id,
                x: resize.origin.x,
                y: resize.origin.y,
                w: Some(resize.width),
            };
            (SessionState::Idle, vec![Effect::Commit(commit)])
        }
        (SessionState::Resizing(resize), SessionEvent::Cancel) => {
            tracing::debug!(id = %resize.moving_id, "resize cancelled");
            let effect = Effect::PreviewWidth {
                id: resize.moving_id,
                w: resize.origin.w,
            };
            (SessionState::Idle, vec![effect])
        }
        (
            state @ (SessionState::Dragging(_) | SessionState::Resizing(_)),
            event @ (SessionEvent::DragStart { .. } | SessionEvent::ResizeStart { .. }),
        ) => {
            tracing::debug!(?event, "gesture already active, ignoring pointer down");
            (state, Vec::new())
        }
        (state, _) => (state, Vec::new()),
    }
}

fn find_block<'a>(id: &str, env: &'a SessionEnv<'_>) -> Option<&'a Block> {
    let block = env.blocks.iter().find(|b| b.id == id);
    if block.is_none() {
        tracing::warn!(id, "gesture on unknown block");
    }
    block
}

fn start_drag(id: String, pointer: Point, env: &SessionEnv<'_>) -> (SessionState, Vec<Effect>) {
    if !env.edit_mode {
        return (SessionState::Idle, Vec::new());
    }
    let Some(block) = find_block(&id, env) else {
        return (SessionState::Idle, Vec::new());
    };

    let others: Vec<Rect> = env
        .blocks
        .iter()
        .filter(|b| b.id != id)
        .map(|b| b.rect)
        .collect();

    let pinned = !colliding_pairs(&others, env.config.min_gap).is_empty();
    if pinned {
        tracing::warn!(%id, "other blocks already overlap, drag will not move");
    }

    tracing::debug!(%id, x = block.rect.x, y = block.rect.y, others = others.len(), "drag started");
    let drag = DragState {
        moving_id: id,
        origin: block.rect,
        pointer_origin: pointer,
        last_valid: block.rect.origin(),
        others,
        pinned,
    };
    let phantom = drag.phantom();
    (SessionState::Dragging(drag), vec![Effect::ShowPhantom(phantom)])
}

fn start_resize(id: String, pointer: Point, env: &SessionEnv<'_>) -> (SessionState, Vec<Effect>) {
    if !env.edit_mode {
        return (SessionState::Idle, Vec::new());
    }
    let Some(block) = find_block(&id, env) else {
        return (SessionState::Idle, Vec::new());
    };

    tracing::debug!(%id, w = block.rect.w, "resize started");
    let resize = ResizeState {
        moving_id: id,
        origin: block.rect,
        pointer_origin: pointer,
        width: block.rect.w.max(env.config.min_width),
    };
    (SessionState::Resizing(resize), Vec::new())
}

fn drag_move(
    mut drag: DragState,
    pointer: Point,
    config: &LayoutConfig,
) -> (SessionState, Vec<Effect>) {
    let mut effects = vec![Effect::ClearGuides];

    if !drag.pinned {
        let cand = Point::new(
            (drag.origin.x + pointer.x - drag.pointer_origin.x).max(0),
            (drag.origin.y + pointer.y - drag.pointer_origin.y).max(0),
        );
        let snapped = snap(drag.origin.at(cand), &drag.others, config);
        let moving = drag.origin.at(drag.last_valid);
        drag.last_valid = constrain_move(
            moving,
            Point::new(snapped.x, snapped.y),
            &drag.others,
            config.min_gap,
        );
        tracing::trace!(
            ?cand,
            snapped_x = snapped.x,
            snapped_y = snapped.y,
            accepted = ?drag.last_valid,
            "drag move"
        );

        if !snapped.guides.is_empty() {
            effects.push(Effect::DrawGuides(snapped.guides));
        }
    }

    effects.push(Effect::ShowPhantom(drag.phantom()));
    (SessionState::Dragging(drag), effects)
}

/// Owns the current [`SessionState`] between events.
#[derive(Debug, Default)]
pub struct LayoutSession {
    state: SessionState,
}

impl LayoutSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, SessionState::Idle)
    }

    pub fn handle(&mut self, event: SessionEvent, env: &SessionEnv<'_>) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = transition(state, event, env);
        self.state = next;
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: &str, x: i64, y: i64, w: i64, h: i64) -> Block {
        Block {
            id: id.to_string(),
            rect: Rect::new(x, y, w, h),
        }
    }

    fn env<'a>(blocks: &'a [Block], config: &'a LayoutConfig) -> SessionEnv<'a> {
        SessionEnv {
            edit_mode: true,
            blocks,
            config,
        }
    }

    fn drag_start(id: &str, x: i64, y: i64) -> SessionEvent {
        SessionEvent::DragStart {
            id: id.to_string(),
            pointer: Point::new(x, y),
        }
    }

    fn commit_of(effects: &[Effect]) -> Option<&Commit> {
        effects.iter().find_map(|e| match e {
            Effect::Commit(c) => Some(c),
            _ => None,
        })
    }

    #[test]
    fn test_drag_requires_edit_mode() {
        let config = LayoutConfig::default();
        let blocks = [block("A", 0, 0, 260, 100)];
        let env = SessionEnv {
            edit_mode: false,
            blocks: &blocks,
            config: &config,
        };
        let mut session = LayoutSession::new();
        let effects = session.handle(drag_start("A", 10, 10), &env);
        assert!(effects.is_empty());
        assert!(!session.is_active());
    }

    #[test]
    fn test_drag_snapshot_excludes_moving_block() {
        let config = LayoutConfig::default();
        let blocks = [block("A", 0, 0, 260, 100), block("B", 300, 0, 260, 100)];
        let mut session = LayoutSession::new();
        session.handle(drag_start("A", 10, 10), &env(&blocks, &config));
        match session.state() {
            SessionState::Dragging(drag) => {
                assert_eq!(drag.others(), &[Rect::new(300, 0, 260, 100)]);
                assert_eq!(drag.last_valid, Point::new(0, 0));
            }
            other => panic!("expected dragging, got {other:?}"),
        }
    }

    #[test]
    fn test_drag_toward_neighbour_is_clamped() {
        let config = LayoutConfig::default();
        let blocks = [block("A", 0, 0, 260, 100), block("B", 300, 0, 260, 100)];
        let env = env(&blocks, &config);
        let mut session = LayoutSession::new();

        session.handle(drag_start("A", 0, 0), &env);
        session.handle(SessionEvent::PointerMove(Point::new(285, 0)), &env);
        let effects = session.handle(SessionEvent::PointerUp, &env);

        let commit = commit_of(&effects).unwrap();
        assert!(commit.x <= 20);
        assert_eq!(commit.y, 0);
        assert!(!session.is_active());
    }

    #[test]
    fn test_gradual_drag_stops_at_gap() {
        let config = LayoutConfig::default();
        let blocks = [block("A", 0, 0, 260, 100), block("B", 300, 0, 260, 100)];
        let env = env(&blocks, &config);
        let mut session = LayoutSession::new();

        session.handle(drag_start("A", 0, 0), &env);
        for x in (0..=60).step_by(5) {
            session.handle(SessionEvent::PointerMove(Point::new(x, 0)), &env);
        }
        let effects = session.handle(SessionEvent::PointerUp, &env);
        assert_eq!(
            commit_of(&effects),
            Some(&Commit { id: "A".into(), x: 20, y: 0, w: None })
        );
    }

    #[test]
    fn test_pointer_clamped_to_canvas() {
        let config = LayoutConfig::default();
        let blocks = [block("A", 50, 50, 100, 100)];
        let env = env(&blocks, &config);
        let mut session = LayoutSession::new();

        session.handle(drag_start("A", 100, 100), &env);
        let effects = session.handle(SessionEvent::PointerMove(Point::new(0, 0)), &env);
        assert_eq!(
            effects.last(),
            Some(&Effect::ShowPhantom(Rect::new(0, 0, 100, 100)))
        );
    }

    #[test]
    fn test_move_emits_guides_between_clears() {
        let config = LayoutConfig::default();
        let blocks = [block("A", 0, 300, 100, 100), block("B", 400, 100, 100, 100)];
        let env = env(&blocks, &config);
        let mut session = LayoutSession::new();

        session.handle(drag_start("A", 0, 0), &env);
        let effects = session.handle(SessionEvent::PointerMove(Point::new(0, -195)), &env);
        assert_eq!(effects[0], Effect::ClearGuides);
        assert!(matches!(&effects[1], Effect::DrawGuides(g) if g.len() == 1 && g[0].offset == 100));
        assert_eq!(effects[2], Effect::ShowPhantom(Rect::new(0, 100, 100, 100)));
    }

    #[test]
    fn test_second_pointer_down_ignored() {
        let config = LayoutConfig::default();
        let blocks = [block("A", 0, 0, 100, 100), block("B", 300, 0, 100, 100)];
        let env = env(&blocks, &config);
        let mut session = LayoutSession::new();

        session.handle(drag_start("A", 0, 0), &env);
        let before = session.state().clone();
        let effects = session.handle(drag_start("B", 0, 0), &env);
        assert!(effects.is_empty());
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn test_cancel_discards_drag() {
        let config = LayoutConfig::default();
        let blocks = [block("A", 0, 0, 100, 100)];
        let env = env(&blocks, &config);
        let mut session = LayoutSession::new();

        session.handle(drag_start("A", 0, 0), &env);
        session.handle(SessionEvent::PointerMove(Point::new(200, 200)), &env);
        let effects = session.handle(SessionEvent::Cancel, &env);
        assert!(commit_of(&effects).is_none());
        assert_eq!(effects, vec![Effect::HidePhantom, Effect::ClearGuides]);
        assert!(!session.is_active());
    }

    #[test]
    fn test_overlapping_snapshot_pins_drag() {
        let config = LayoutConfig::default();
        let blocks = [
            block("A", 0, 0, 100, 100),
            block("B", 400, 0, 100, 100),
            block("C", 410, 10, 100, 100),
        ];
        let env = env(&blocks, &config);
        let mut session = LayoutSession::new();

        session.handle(drag_start("A", 0, 0), &env);
        session.handle(SessionEvent::PointerMove(Point::new(0, 200)), &env);
        let effects = session.handle(SessionEvent::PointerUp, &env);
        assert_eq!(
            commit_of(&effects),
            Some(&Commit { id: "A".into(), x: 0, y: 0, w: None })
        );
    }

    #[test]
    fn test_unknown_block_stays_idle() {
        let config = LayoutConfig::default();
        let blocks = [block("A", 0, 0, 100, 100)];
        let mut session = LayoutSession::new();
        session.handle(drag_start("Z", 0, 0), &env(&blocks, &config));
        assert!(!session.is_active());
    }

    #[test]
    fn test_events_while_idle_are_ignored() {
        let config = LayoutConfig::default();
        let blocks = [block("A", 0, 0, 100, 100)];
        let env = env(&blocks, &config);
        let mut session = LayoutSession::new();
        assert!(session.handle(SessionEvent::PointerMove(Point::new(5, 5)), &env).is_empty());
        assert!(session.handle(SessionEvent::PointerUp, &env).is_empty());
        assert!(session.handle(SessionEvent::Cancel, &env).is_empty());
    }

    #[test]
    fn test_resize_floors_width_and_ignores_neighbours() {
        let config = LayoutConfig::default();
        let blocks = [block("A", 0, 0, 260, 100), block("B", 300, 0, 260, 100)];
        let env = env(&blocks, &config);
        let mut session = LayoutSession::new();

        session.handle(
            SessionEvent::ResizeStart { id: "A".into(), pointer: Point::new(260, 50) },
            &env,
        );
        let effects = session.handle(SessionEvent::PointerMove(Point::new(0, 50)), &env);
        assert_eq!(effects, vec![Effect::PreviewWidth { id: "A".into(), w: 80 }]);

        session.handle(SessionEvent::PointerMove(Point::new(400, 50)), &env);
        let effects = session.handle(SessionEvent::PointerUp, &env);
        assert_eq!(
            commit_of(&effects),
            Some(&Commit { id: "A".into(), x: 0, y: 0, w: Some(400) })
        );
    }

    #[test]
    fn test_resize_cancel_restores_width() {
        let config = LayoutConfig::default();
        let blocks = [block("A", 0, 0, 260, 100)];
        let env = env(&blocks, &config);
        let mut session = LayoutSession::new();

        session.handle(
            SessionEvent::ResizeStart { id: "A".into(), pointer: Point::new(260, 50) },
            &env,
        );
        session.handle(SessionEvent::PointerMove(Point::new(500, 50)), &env);
        let effects = session.handle(SessionEvent::Cancel, &env);
        assert_eq!(effects, vec![Effect::PreviewWidth { id: "A".into(), w: 260 }]);
    }
}
