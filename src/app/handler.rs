//! Input handling — maps key/mouse events to state mutations.
//!
//! Every gesture runs to completion inside one handler call: mutate the
//! forest through the store, persist, and let the next frame's row rebuild
//! pick up the change.  The only deferred work is the inline input's
//! blur-grace expiry, which rides on Tick.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders};

use crate::config::Action;
use crate::core::tree::{NodeId, NodeKind};
use crate::ui::layout::AppLayout;
use crate::ui::sidebar::{self, SidebarRow, SidebarWidget};
use crate::ui::toolbar::{self, ToolbarButton};

use super::state::{AppState, EditState, EditTarget};

// ── keys ────────────────────────────────────────────────────────

/// Process a key event.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // A blocking alert swallows the next key press.
    if state.alert.is_some() {
        state.alert = None;
        return;
    }

    // Ctrl+c always quits, even mid-edit.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    // An active inline input captures the keyboard entirely.
    if state.editing.is_some() {
        handle_edit_key(state, key);
        return;
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };

    match action {
        Action::Quit => state.should_quit = true,
        Action::MoveUp => state.tree_state.select_prev(),
        Action::MoveDown => {
            let visible_count = build_rows(state).len();
            state.tree_state.select_next(visible_count);
        }
        Action::ToggleFolder => {
            if let Some(node_id) = selected_folder_row(state) {
                toggle_folder(state, node_id);
            }
        }
        Action::AddFile => request_add(state, NodeKind::File),
        Action::AddFolder => request_add(state, NodeKind::Folder),
        Action::AddRootFile => begin_edit(
            state,
            EditTarget::NewRoot {
                kind: NodeKind::File,
            },
        ),
        Action::AddRootFolder => begin_edit(
            state,
            EditTarget::NewRoot {
                kind: NodeKind::Folder,
            },
        ),
        Action::FindFolder => begin_edit(state, EditTarget::FolderLookup),
        Action::CollapseAll => collapse_all(state),
        Action::ToggleContent => toggle_content(state),
    }
}

/// Keystrokes while the inline input is live.
fn handle_edit_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => cancel_edit(state),
        KeyCode::Enter => commit_edit(state),
        KeyCode::Backspace => {
            if let Some(edit) = &mut state.editing {
                edit.buffer.pop();
                edit.pending_blur = None;
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(edit) = &mut state.editing {
                edit.buffer.push(c);
                edit.pending_blur = None;
            }
        }
        _ => {}
    }
}

// ── ticks & focus ───────────────────────────────────────────────

/// Expire a blurred inline input once the grace interval has passed.
pub fn handle_tick(state: &mut AppState) {
    let grace = Duration::from_millis(state.config.blur_grace_ms);
    let expired = state
        .editing
        .as_ref()
        .and_then(|edit| edit.pending_blur)
        .is_some_and(|at| at.elapsed() >= grace);
    if expired {
        cancel_edit(state);
    }
}

/// The terminal lost focus: arm the grace timer instead of cancelling
/// outright, so a confirming click can still land.
pub fn handle_focus_lost(state: &mut AppState) {
    arm_blur(state);
}

fn arm_blur(state: &mut AppState) {
    if let Some(edit) = &mut state.editing {
        if edit.pending_blur.is_none() {
            edit.pending_blur = Some(Instant::now());
        }
    }
}

// ── mouse ───────────────────────────────────────────────────────

/// Process a mouse event.
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            handle_left_click(state, mouse.column, mouse.row);
        }
        MouseEventKind::ScrollUp => state.tree_state.select_prev(),
        MouseEventKind::ScrollDown => {
            let visible_count = build_rows(state).len();
            state.tree_state.select_next(visible_count);
        }
        _ => {}
    }
}

fn handle_left_click(state: &mut AppState, col: u16, row: u16) {
    if state.alert.is_some() {
        state.alert = None;
        return;
    }

    let layout = AppLayout::from_area(state.terminal_area);

    if let Some(button) = toolbar::button_hit(layout.toolbar_area, col, row) {
        arm_blur(state);
        match button {
            ToolbarButton::AddFile => request_add(state, NodeKind::File),
            ToolbarButton::AddFolder => request_add(state, NodeKind::Folder),
            ToolbarButton::CollapseAll => collapse_all(state),
            ToolbarButton::ToggleContent => toggle_content(state),
        }
        return;
    }

    if state.content_hidden {
        arm_blur(state);
        return;
    }

    let inner = tree_inner(layout.tree_area);
    if !point_in_rect(inner, col, row) {
        arm_blur(state);
        return;
    }

    let clicked_row = (row - inner.y) as usize + state.tree_state.offset;
    let rows = build_rows(state);
    let Some(clicked) = rows.get(clicked_row) else {
        arm_blur(state);
        return;
    };
    state.tree_state.selected = clicked_row;

    match clicked {
        SidebarRow::Input { .. } => {
            if sidebar::confirm_hit(inner, col) {
                commit_edit(state);
            } else if let Some(edit) = &mut state.editing {
                // Clicked back into the input — it keeps focus.
                edit.pending_blur = None;
            }
        }
        SidebarRow::Node { node_id, kind, .. } => {
            arm_blur(state);
            if *kind == NodeKind::Folder {
                // The inline triggers are nested controls: a click there
                // starts an add instead of toggling the fold.
                if let Some(new_kind) = sidebar::trigger_hit(inner, col) {
                    begin_edit(
                        state,
                        EditTarget::NewChild {
                            parent: *node_id,
                            kind: new_kind,
                        },
                    );
                } else {
                    toggle_folder(state, *node_id);
                }
            }
        }
    }
}

// ── gestures ────────────────────────────────────────────────────

/// Toggle a folder's fold state.  Selection follows the toggle: the folder
/// becomes the target for subsequent adds, open or closed.
fn toggle_folder(state: &mut AppState, node_id: NodeId) {
    if !state.store.forest.get(node_id).is_folder() {
        return;
    }
    if !state.open_folders.remove(&node_id) {
        state.open_folders.insert(node_id);
    }
    state.selected_folder = Some(node_id);
}

/// Start an add into the selected folder, or alert when there is none.
fn request_add(state: &mut AppState, kind: NodeKind) {
    match state.selected_folder {
        Some(parent) => begin_edit(state, EditTarget::NewChild { parent, kind }),
        None => {
            state.alert = Some("No folder selected — toggle a folder first.".to_string());
        }
    }
}

/// Enter the Editing state, replacing any previous input.
fn begin_edit(state: &mut AppState, target: EditTarget) {
    if let EditTarget::NewChild { parent, .. } = target {
        // Reveal the container so the input row is visible.
        state.open_folders.insert(parent);
    }
    state.editing = Some(EditState::new(target));
    state.status_message = None;
}

/// Commit the inline input: mutate the store, persist, reveal the result.
fn commit_edit(state: &mut AppState) {
    let Some(edit) = state.editing.as_ref() else {
        return;
    };
    let name = edit.buffer.trim().to_string();
    if name.is_empty() {
        state.alert = Some("Name must not be empty.".to_string());
        return;
    }

    let target = edit.target;
    state.editing = None;

    match target {
        EditTarget::NewChild { parent, kind } => {
            let id = state.store.append_child(parent, name, kind);
            state.open_folders.insert(parent);
            persist(state);
            select_node_row(state, id);
        }
        EditTarget::NewRoot { kind } => {
            let id = state.store.append_root(name, kind);
            persist(state);
            select_node_row(state, id);
        }
        EditTarget::FolderLookup => lookup_folder(state, &name),
    }
}

/// Drop the inline input without committing.
fn cancel_edit(state: &mut AppState) {
    state.editing = None;
}

/// Resolve a typed name to the first pre-order folder and select it.
fn lookup_folder(state: &mut AppState, name: &str) {
    match state.store.forest.find_folder(name) {
        Some(id) => {
            state.selected_folder = Some(id);
            reveal_node(state, id);
            state.status_message = Some(format!("Selected folder \"{name}\""));
        }
        None => {
            state.status_message = Some(format!("No folder named \"{name}\""));
        }
    }
}

/// Force-close every folder in the view.  The forest's `open` flags are
/// untouched — this is a view reset, not a mutation.
fn collapse_all(state: &mut AppState) {
    state.open_folders.clear();
    state.tree_state.selected = 0;
    state.tree_state.offset = 0;
}

/// Toggle visibility of the whole tree region; hiding also collapses.
fn toggle_content(state: &mut AppState) {
    state.content_hidden = !state.content_hidden;
    if state.content_hidden {
        collapse_all(state);
    }
}

// ── helpers ─────────────────────────────────────────────────────

/// Persist the forest and surface the outcome in the status bar.
fn persist(state: &mut AppState) {
    match state.store.persist() {
        Ok(()) => {
            let at = chrono::Local::now().format("%H:%M:%S");
            state.status_message = Some(format!("saved {at}"));
        }
        Err(err) => {
            tracing::warn!("persist failed: {err}");
            state.status_message = Some("save failed (see log)".to_string());
        }
    }
}

pub fn build_rows(state: &AppState) -> Vec<SidebarRow> {
    SidebarWidget::new(&state.store.forest, &state.open_folders)
        .editing(state.editing.as_ref())
        .build_rows()
}

/// The highlighted row's node id, when it is a folder.
fn selected_folder_row(state: &AppState) -> Option<NodeId> {
    let rows = build_rows(state);
    rows.get(state.tree_state.selected)
        .and_then(|row| match row {
            SidebarRow::Node {
                node_id,
                kind: NodeKind::Folder,
                ..
            } => Some(*node_id),
            _ => None,
        })
}

/// Open every ancestor of `id` so its row is visible, then select it.
fn reveal_node(state: &mut AppState, id: NodeId) {
    let chain = state.store.forest.ancestry(id);
    for &ancestor in &chain[..chain.len().saturating_sub(1)] {
        state.open_folders.insert(ancestor);
    }
    select_node_row(state, id);
}

/// Move the highlight to the row showing `id`, if visible.
fn select_node_row(state: &mut AppState, id: NodeId) {
    let rows = build_rows(state);
    for (i, row) in rows.iter().enumerate() {
        if let SidebarRow::Node { node_id, .. } = row {
            if *node_id == id {
                state.tree_state.selected = i;
                return;
            }
        }
    }
}

fn tree_inner(tree_area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(tree_area)
}

fn point_in_rect(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x
        && col < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::core::store::TreeStore;
    use crate::core::tree::{Forest, WireNode};
    use tempfile::TempDir;

    fn state_from(doc: &str, dir: &TempDir) -> AppState {
        let wire: Vec<WireNode> = serde_json::from_str(doc).unwrap();
        let store = TreeStore::with_forest(
            Forest::from_wire(&wire),
            dir.path().join("snap.json"),
        );
        AppState::new(store, AppConfig::default())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_name(state: &mut AppState, name: &str) {
        for c in name.chars() {
            handle_key(state, key(KeyCode::Char(c)));
        }
    }

    const SRC_ONLY: &str = r#"[{"type": "folder", "name": "src", "children": [], "open": false}]"#;

    #[test]
    fn add_without_selection_alerts_and_never_mutates() {
        let dir = TempDir::new().unwrap();
        let mut state = state_from(SRC_ONLY, &dir);
        let before = state.store.forest.to_wire();

        handle_key(&mut state, key(KeyCode::Char('f')));
        assert!(state.alert.is_some());
        assert!(state.editing.is_none());
        assert_eq!(state.store.forest.to_wire(), before);

        // The next key only dismisses the alert; a fresh attempt alerts again.
        handle_key(&mut state, key(KeyCode::Char('f')));
        assert!(state.alert.is_none());
        handle_key(&mut state, key(KeyCode::Char('f')));
        assert!(state.alert.is_some());
        assert_eq!(state.store.forest.to_wire(), before);
    }

    #[test]
    fn open_src_then_inline_add_file() {
        let dir = TempDir::new().unwrap();
        let mut state = state_from(SRC_ONLY, &dir);

        // Toggle "src" open — selection follows the toggle.
        handle_key(&mut state, key(KeyCode::Enter));
        let src = state.store.forest.find_folder("src").unwrap();
        assert!(state.is_open(src));
        assert_eq!(state.selected_folder, Some(src));

        // Inline-add "a.js".
        handle_key(&mut state, key(KeyCode::Char('f')));
        assert!(state.editing.is_some());
        type_name(&mut state, "a.js");
        handle_key(&mut state, key(KeyCode::Enter));

        assert!(state.editing.is_none());
        assert_eq!(state.store.forest.get(src).children.len(), 1);
        let child = state.store.forest.get(state.store.forest.get(src).children[0]);
        assert_eq!(child.name, "a.js");
        assert_eq!(child.kind, NodeKind::File);
        // Toggling and adding never write the model's open flag.
        assert!(!state.store.forest.get(src).open);
        // The mutation was persisted.
        assert!(dir.path().join("snap.json").exists());
        // The new leaf is on a visible row inside the open folder.
        let rows = build_rows(&state);
        assert!(matches!(
            &rows[1],
            SidebarRow::Node { name, .. } if name == "a.js"
        ));
    }

    #[test]
    fn empty_name_commit_alerts_and_keeps_the_input() {
        let dir = TempDir::new().unwrap();
        let mut state = state_from(SRC_ONLY, &dir);
        handle_key(&mut state, key(KeyCode::Enter)); // select src
        handle_key(&mut state, key(KeyCode::Char('d')));
        type_name(&mut state, "   ");
        handle_key(&mut state, key(KeyCode::Enter));

        assert!(state.alert.is_some());
        assert!(state.editing.is_some());
        let src = state.store.forest.find_folder("src").unwrap();
        assert!(state.store.forest.get(src).children.is_empty());
    }

    #[test]
    fn esc_cancels_without_mutating() {
        let dir = TempDir::new().unwrap();
        let mut state = state_from(SRC_ONLY, &dir);
        handle_key(&mut state, key(KeyCode::Enter));
        handle_key(&mut state, key(KeyCode::Char('f')));
        type_name(&mut state, "dropped");
        handle_key(&mut state, key(KeyCode::Esc));

        assert!(state.editing.is_none());
        let src = state.store.forest.find_folder("src").unwrap();
        assert!(state.store.forest.get(src).children.is_empty());
    }

    #[test]
    fn blur_grace_expires_on_tick() {
        let dir = TempDir::new().unwrap();
        let mut state = state_from(SRC_ONLY, &dir);
        state.config.blur_grace_ms = 0;
        handle_key(&mut state, key(KeyCode::Enter));
        handle_key(&mut state, key(KeyCode::Char('f')));
        type_name(&mut state, "half-typed");

        handle_focus_lost(&mut state);
        handle_tick(&mut state);

        assert!(state.editing.is_none());
        let src = state.store.forest.find_folder("src").unwrap();
        assert!(state.store.forest.get(src).children.is_empty());
    }

    #[test]
    fn typing_disarms_a_pending_blur() {
        let dir = TempDir::new().unwrap();
        let mut state = state_from(SRC_ONLY, &dir);
        state.config.blur_grace_ms = 0;
        handle_key(&mut state, key(KeyCode::Enter));
        handle_key(&mut state, key(KeyCode::Char('f')));

        handle_focus_lost(&mut state);
        type_name(&mut state, "x");
        handle_tick(&mut state);

        assert!(state.editing.is_some());
    }

    #[test]
    fn toggle_twice_restores_the_original_state() {
        let dir = TempDir::new().unwrap();
        let mut state = state_from(SRC_ONLY, &dir);
        let src = state.store.forest.find_folder("src").unwrap();

        assert!(!state.is_open(src));
        handle_key(&mut state, key(KeyCode::Enter));
        assert!(state.is_open(src));
        handle_key(&mut state, key(KeyCode::Enter));
        assert!(!state.is_open(src));
    }

    #[test]
    fn collapse_all_resets_the_view_but_not_the_model() {
        let dir = TempDir::new().unwrap();
        let doc = r#"[
            {"type": "folder", "name": "a", "open": true, "children": [
                {"type": "folder", "name": "b", "open": true, "children": []}
            ]}
        ]"#;
        let mut state = state_from(doc, &dir);
        assert_eq!(state.open_folders.len(), 2);

        handle_key(&mut state, key(KeyCode::Char('c')));
        assert!(state.open_folders.is_empty());
        // Model flags survive untouched.
        let a = state.store.forest.find_folder("a").unwrap();
        let b = state.store.forest.find_folder("b").unwrap();
        assert!(state.store.forest.get(a).open);
        assert!(state.store.forest.get(b).open);
    }

    #[test]
    fn toggle_content_hides_and_collapses() {
        let dir = TempDir::new().unwrap();
        let mut state = state_from(SRC_ONLY, &dir);
        handle_key(&mut state, key(KeyCode::Enter)); // open src

        handle_key(&mut state, key(KeyCode::Char('z')));
        assert!(state.content_hidden);
        assert!(state.open_folders.is_empty());

        handle_key(&mut state, key(KeyCode::Char('z')));
        assert!(!state.content_hidden);
        // Showing again does not resurrect old folds.
        assert!(state.open_folders.is_empty());
    }

    #[test]
    fn root_add_needs_no_selection() {
        let dir = TempDir::new().unwrap();
        let mut state = state_from(SRC_ONLY, &dir);

        handle_key(&mut state, KeyEvent::new(KeyCode::Char('D'), KeyModifiers::SHIFT));
        assert!(state.editing.is_some());
        type_name(&mut state, "assets");
        handle_key(&mut state, key(KeyCode::Enter));

        assert_eq!(state.store.forest.roots.len(), 2);
        let last = *state.store.forest.roots.last().unwrap();
        assert_eq!(state.store.forest.get(last).name, "assets");
        assert!(state.store.forest.get(last).is_folder());
    }

    #[test]
    fn folder_lookup_selects_the_first_preorder_match() {
        let dir = TempDir::new().unwrap();
        let doc = r#"[
            {"type": "folder", "name": "a", "children": [
                {"type": "folder", "name": "dup", "children": []}
            ]},
            {"type": "folder", "name": "dup", "children": []}
        ]"#;
        let mut state = state_from(doc, &dir);
        let expected = {
            let a = state.store.forest.find_folder("a").unwrap();
            state.store.forest.get(a).children[0]
        };

        handle_key(&mut state, key(KeyCode::Char('/')));
        type_name(&mut state, "dup");
        handle_key(&mut state, key(KeyCode::Enter));

        assert_eq!(state.selected_folder, Some(expected));
        // The ancestor chain was opened so the match is visible.
        let a = state.store.forest.find_folder("a").unwrap();
        assert!(state.is_open(a));
    }
}
