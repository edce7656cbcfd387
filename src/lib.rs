pub mod board;
pub mod config;
pub mod geometry;
pub mod measure;
pub mod mover;
pub mod placement;
pub mod session;
pub mod snap;
pub mod state;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use board::{Board, BoardError};
use config::{LayoutConfig, STORAGE_KEY};
use geometry::{Point, Rect};
use session::{Effect, LayoutSession, SessionEvent};
use snap::Guide;
use state::LinkId;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// localStorage key the host should persist `Dashboard::toJson` under.
#[wasm_bindgen(js_name = "storageKey")]
pub fn storage_key() -> String {
    STORAGE_KEY.to_string()
}

/// Browser-facing handle: one board plus the gesture in progress.
#[wasm_bindgen]
pub struct Dashboard {
    board: Board,
    session: LayoutSession,
    preview: Option<Rect>,
}

#[derive(Serialize)]
struct BlockView<'a> {
    name: &'a str,
    #[serde(flatten)]
    rect: Rect,
}

impl Dashboard {
    fn build(json: &str, config: LayoutConfig) -> Self {
        let board = Board::from_json(json, config.clone()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored board unreadable, starting empty");
            Board::new(config)
        });
        Self {
            board,
            session: LayoutSession::new(),
            preview: None,
        }
    }

    fn dispatch(&mut self, event: SessionEvent) -> Result<(Vec<Guide>, bool), String> {
        let blocks = self.board.blocks();
        let effects = self.session.handle(event, &self.board.session_env(&blocks));

        let mut guides = Vec::new();
        let mut committed = false;
        for effect in effects {
            match effect {
                Effect::ClearGuides => guides.clear(),
                Effect::DrawGuides(g) => guides.extend(g),
                Effect::ShowPhantom(rect) => self.preview = Some(rect),
                Effect::HidePhantom => self.preview = None,
                Effect::PreviewWidth { id, w } => {
                    self.preview = self.board.category(&id).map(|c| c.rect.with_width(w));
                }
                Effect::Commit(commit) => {
                    self.board.apply_commit(&commit).map_err(|e| e.to_string())?;
                    self.preview = None;
                    committed = true;
                }
            }
        }
        Ok((guides, committed))
    }

    /// The session froze its view of the other blocks; edits must wait.
    fn ensure_idle(&self) -> Result<(), BoardError> {
        if self.session.is_active() {
            return Err(BoardError::GestureActive);
        }
        Ok(())
    }

    fn state_json(&self) -> Result<String, String> {
        self.board.to_json().map_err(|e| e.to_string())
    }
}

fn guides_to_js(guides: &[Guide]) -> Result<js_sys::Array, JsValue> {
    let out = js_sys::Array::new();
    for guide in guides {
        let obj = js_sys::Object::new();
        js_sys::Reflect::set(&obj, &"orientation".into(), &guide.orientation.as_str().into())?;
        js_sys::Reflect::set(&obj, &"offset".into(), &JsValue::from_f64(guide.offset as f64))?;
        js_sys::Reflect::set(&obj, &"kind".into(), &guide.kind.as_str().into())?;
        out.push(&obj);
    }
    Ok(out)
}

fn pointer(px: f64, py: f64) -> Point {
    Point::new(px.round() as i64, py.round() as i64)
}

#[wasm_bindgen]
impl Dashboard {
    /// Load from the stored JSON blob; unreadable input yields an empty board.
    #[wasm_bindgen(constructor)]
    pub fn new(json: &str) -> Dashboard {
        Self::build(json, LayoutConfig::default())
    }

    #[wasm_bindgen(js_name = "withConfig")]
    pub fn with_config(json: &str, config_json: &str) -> Result<Dashboard, String> {
        let config = LayoutConfig::from_json(config_json).map_err(|e| e.to_string())?;
        Ok(Self::build(json, config))
    }

    #[wasm_bindgen(js_name = "toJson")]
    pub fn to_json(&self) -> Result<String, String> {
        self.state_json()
    }

    /// `[{name, x, y, w, h}]` for every category, as JSON.
    #[wasm_bindgen(js_name = "blocks")]
    pub fn blocks_json(&self) -> Result<String, String> {
        let views: Vec<BlockView<'_>> = self
            .board
            .categories()
            .iter()
            .map(|c| BlockView {
                name: &c.name,
                rect: c.rect,
            })
            .collect();
        serde_json::to_string(&views).map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "editMode")]
    pub fn edit_mode(&self) -> bool {
        self.board.edit_mode()
    }

    #[wasm_bindgen(js_name = "setEditMode")]
    pub fn set_edit_mode(&mut self, on: bool) {
        self.board.set_edit_mode(on);
    }

    /// Pointer down on a title handle. Returns whether a drag started.
    #[wasm_bindgen(js_name = "beginDrag")]
    pub fn begin_drag(&mut self, name: &str, px: f64, py: f64) -> Result<bool, String> {
        self.dispatch(SessionEvent::DragStart {
            id: name.to_string(),
            pointer: pointer(px, py),
        })?;
        Ok(self.session.is_active())
    }

    /// Pointer down on a resize handle. Returns whether a resize started.
    #[wasm_bindgen(js_name = "beginResize")]
    pub fn begin_resize(&mut self, name: &str, px: f64, py: f64) -> Result<bool, String> {
        self.dispatch(SessionEvent::ResizeStart {
            id: name.to_string(),
            pointer: pointer(px, py),
        })?;
        Ok(self.session.is_active())
    }

    /// Feed a pointer move; returns the guides to draw for this frame.
    #[wasm_bindgen(js_name = "pointerMove")]
    pub fn pointer_move(&mut self, px: f64, py: f64) -> Result<js_sys::Array, JsValue> {
        let (guides, _) = self
            .dispatch(SessionEvent::PointerMove(pointer(px, py)))
            .map_err(|e| JsValue::from_str(&e))?;
        guides_to_js(&guides)
    }

    /// Outline of the gesture in progress as `[x, y, w, h]`.
    pub fn phantom(&self) -> Option<Vec<f64>> {
        self.preview
            .map(|r| vec![r.x as f64, r.y as f64, r.w as f64, r.h as f64])
    }

    /// Finish the gesture. Returns the state JSON to persist if it committed.
    #[wasm_bindgen(js_name = "pointerUp")]
    pub fn pointer_up(&mut self) -> Result<Option<String>, String> {
        let (_, committed) = self.dispatch(SessionEvent::PointerUp)?;
        if committed {
            self.state_json().map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn cancel(&mut self) -> Result<(), String> {
        self.dispatch(SessionEvent::Cancel)?;
        self.preview = None;
        Ok(())
    }

    /// Create and auto-place a category; returns the state JSON to persist.
    #[wasm_bindgen(js_name = "addCategory")]
    pub fn add_category(&mut self, name: &str, max_w: f64) -> Result<String, String> {
        self.ensure_idle().map_err(|e| e.to_string())?;
        self.board
            .add_category(name, max_w.floor() as i64)
            .map_err(|e| e.to_string())?;
        self.state_json()
    }

    #[wasm_bindgen(js_name = "renameCategory")]
    pub fn rename_category(&mut self, old: &str, new: &str) -> Result<String, String> {
        self.ensure_idle().map_err(|e| e.to_string())?;
        self.board
            .rename_category(old, new)
            .map_err(|e| e.to_string())?;
        self.state_json()
    }

    #[wasm_bindgen(js_name = "removeCategory")]
    pub fn remove_category(&mut self, name: &str) -> Result<String, String> {
        self.ensure_idle().map_err(|e| e.to_string())?;
        self.board.remove_category(name).map_err(|e| e.to_string())?;
        self.state_json()
    }

    /// Tile dropped on a category. Returns whether the link moved.
    #[wasm_bindgen(js_name = "moveLink")]
    pub fn move_link(&mut self, id: f64, category: &str) -> Result<bool, String> {
        self.ensure_idle().map_err(|e| e.to_string())?;
        self.board
            .move_link(LinkId(id as u64), category)
            .map_err(|e| e.to_string())
    }
}
