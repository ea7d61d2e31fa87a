//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event
//! handling).  The store is owned here — no globals.

use std::collections::HashSet;
use std::time::Instant;

use ratatui::layout::Rect;

use crate::config::AppConfig;
use crate::core::store::TreeStore;
use crate::core::tree::{NodeId, NodeKind};
use crate::ui::sidebar::SidebarState;

// ───────────────────────────────────────── inline edit ───────

/// Where a committed inline input lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// New node appended to a folder's children.
    NewChild { parent: NodeId, kind: NodeKind },
    /// New node appended at the root level.
    NewRoot { kind: NodeKind },
    /// Select the first pre-order folder matching the typed name.
    FolderLookup,
}

/// A live inline input.  Its presence *is* the Editing state of the
/// Idle → Editing → Committed/Cancelled machine; commit and cancel both
/// drop it back to `None`.
#[derive(Debug)]
pub struct EditState {
    pub target: EditTarget,
    pub buffer: String,
    /// Set when focus leaves the input.  The edit survives until the grace
    /// interval passes so a click on the confirm glyph can still land.
    pub pending_blur: Option<Instant>,
}

impl EditState {
    pub fn new(target: EditTarget) -> Self {
        Self {
            target,
            buffer: String::new(),
            pending_blur: None,
        }
    }
}

// ───────────────────────────────────────── app state ─────────

/// Top-level application state.
pub struct AppState {
    /// The forest and its persistence.
    pub store: TreeStore,
    /// Widget-level state (row selection, scroll).
    pub tree_state: SidebarState,
    /// View-side fold state.  Seeded from the model's `open` flags at load;
    /// toggling and collapse-all touch only this set, never the model.
    pub open_folders: HashSet<NodeId>,
    /// The folder adds are targeted at.  Set as a side effect of toggling.
    pub selected_folder: Option<NodeId>,
    /// Live inline input, if any.
    pub editing: Option<EditState>,
    /// Blocking alert text; any key or click dismisses it.
    pub alert: Option<String>,
    /// When set, the whole tree region is hidden ("collapse everything").
    pub content_hidden: bool,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Keybindings and timing knobs.
    pub config: AppConfig,
    /// Full terminal area from the last draw, for mouse hit-testing.
    pub terminal_area: Rect,
}

impl AppState {
    pub fn new(store: TreeStore, config: AppConfig) -> Self {
        // Folders persisted as open start unfolded.
        let open_folders = store
            .forest
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_folder() && node.open)
            .map(|(id, _)| id)
            .collect();

        Self {
            store,
            tree_state: SidebarState::default(),
            open_folders,
            selected_folder: None,
            editing: None,
            alert: None,
            content_hidden: false,
            should_quit: false,
            status_message: None,
            config,
            terminal_area: Rect::default(),
        }
    }

    /// Whether a folder is currently unfolded in the view.
    pub fn is_open(&self, id: NodeId) -> bool {
        self.open_folders.contains(&id)
    }
}
