//! The sidebar widget — renders the [`Forest`] as an indented, collapsible
//! tree with inline creation support.
//!
//! Rows are rebuilt from the arena on every frame by a pre-order walk that
//! skips folded subtrees.  Fold, selection, and scroll state live outside the
//! widget, so rebuilding the row list never loses view state — the
//! "incremental render" contract is that a mutation only ever adds rows,
//! never resets what is already on screen.

use std::collections::HashSet;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, StatefulWidget, Widget},
};

use crate::app::state::{EditState, EditTarget};
use crate::core::{
    icons,
    tree::{Forest, NodeId, NodeKind},
};

use super::theme::Theme;

// ───────────────────────────────────────── state ─────────────

/// Persistent state for the sidebar widget (selected row, scroll offset).
#[derive(Debug, Default)]
pub struct SidebarState {
    /// Index into the flat row list that is currently highlighted.
    pub selected: usize,
    /// Vertical scroll offset (first visible row).
    pub offset: usize,
}

impl SidebarState {
    pub fn select_next(&mut self, max: usize) {
        if max > 0 && self.selected < max - 1 {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Ensure the selected row is visible within the viewport of `height` rows.
    pub fn clamp_scroll(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            self.offset = self.selected - height + 1;
        }
    }
}

// ───────────────────────────────────────── row model ─────────

/// One rendered row in the sidebar.
#[derive(Debug)]
pub enum SidebarRow {
    Node {
        node_id: NodeId,
        depth: usize,
        kind: NodeKind,
        /// View-side fold state (folders only).
        open: bool,
        name: String,
    },
    /// The live inline input, placed where its committed node would appear.
    Input { depth: usize },
}

// ── hit zones ───────────────────────────────────────────────────

/// Right-aligned add-file / add-folder triggers on folder rows.
const TRIGGER_FILE: &str = "+f";
const TRIGGER_FOLDER: &str = "+d";
/// Confirm glyph on the inline input row.
const CONFIRM_LABEL: &str = "[ok]";

/// Which trigger (if any) a click at `col` lands on.  Zones sit in the last
/// five columns of the tree pane: `+f` then a gap then `+d`.
pub fn trigger_hit(inner: Rect, col: u16) -> Option<NodeKind> {
    if inner.width < 10 {
        return None;
    }
    let right = inner.x + inner.width;
    if col >= right - 5 && col < right - 3 {
        Some(NodeKind::File)
    } else if col >= right - 2 && col < right {
        Some(NodeKind::Folder)
    } else {
        None
    }
}

/// Whether a click at `col` lands on the input row's confirm glyph.
pub fn confirm_hit(inner: Rect, col: u16) -> bool {
    if inner.width < 10 {
        return false;
    }
    let right = inner.x + inner.width;
    col >= right - CONFIRM_LABEL.len() as u16 && col < right
}

// ───────────────────────────────────────── widget ────────────

/// The sidebar widget itself — created fresh each frame.
pub struct SidebarWidget<'a> {
    forest: &'a Forest,
    open_folders: &'a HashSet<NodeId>,
    editing: Option<&'a EditState>,
    target_folder: Option<NodeId>,
    block: Option<Block<'a>>,
}

impl<'a> SidebarWidget<'a> {
    pub fn new(forest: &'a Forest, open_folders: &'a HashSet<NodeId>) -> Self {
        Self {
            forest,
            open_folders,
            editing: None,
            target_folder: None,
            block: None,
        }
    }

    /// Show the live inline input, if any.
    pub fn editing(mut self, editing: Option<&'a EditState>) -> Self {
        self.editing = editing;
        self
    }

    /// Highlight the folder adds are targeted at.
    pub fn target_folder(mut self, folder: Option<NodeId>) -> Self {
        self.target_folder = folder;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Build the flat list of rows for the current fold state.
    pub fn build_rows(&self) -> Vec<SidebarRow> {
        let mut rows = Vec::new();

        if let Some(EditState {
            target: EditTarget::FolderLookup,
            ..
        }) = self.editing
        {
            rows.push(SidebarRow::Input { depth: 0 });
        }

        for &root in &self.forest.roots {
            self.collect_rows(root, &mut rows);
        }

        if let Some(EditState {
            target: EditTarget::NewRoot { .. },
            ..
        }) = self.editing
        {
            rows.push(SidebarRow::Input { depth: 0 });
        }

        rows
    }

    fn collect_rows(&self, node_id: NodeId, rows: &mut Vec<SidebarRow>) {
        let node = self.forest.get(node_id);
        let open = node.is_folder() && self.open_folders.contains(&node_id);

        rows.push(SidebarRow::Node {
            node_id,
            depth: node.depth,
            kind: node.kind,
            open,
            name: node.name.clone(),
        });

        if !open {
            return;
        }

        // A child edit renders directly under its parent's header, before
        // the existing children.
        if let Some(EditState {
            target: EditTarget::NewChild { parent, .. },
            ..
        }) = self.editing
        {
            if *parent == node_id {
                rows.push(SidebarRow::Input {
                    depth: node.depth + 1,
                });
            }
        }

        for &child in &node.children {
            self.collect_rows(child, rows);
        }
    }

    fn input_line(&self, depth: usize) -> Line<'static> {
        let buffer = self
            .editing
            .map(|e| e.buffer.as_str())
            .unwrap_or_default()
            .to_string();
        let prefix = match self.editing.map(|e| e.target) {
            Some(EditTarget::FolderLookup) => "/ ",
            _ => "› ",
        };
        Line::from(vec![
            Span::raw("  ".repeat(depth)),
            Span::styled(format!("{prefix}{buffer}▏"), Theme::input_style()),
        ])
    }
}

impl<'a> StatefulWidget for SidebarWidget<'a> {
    type State = SidebarState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        // Resolve the inner area (inside the optional block border).
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let rows = self.build_rows();
        state.clamp_scroll(inner.height as usize);

        let visible_rows = rows
            .iter()
            .enumerate()
            .skip(state.offset)
            .take(inner.height as usize);

        let right = inner.x + inner.width;

        for (i, (row_idx, row)) in visible_rows.enumerate() {
            let y = inner.y + i as u16;
            let is_selected = row_idx == state.selected;

            match row {
                SidebarRow::Node {
                    node_id,
                    depth,
                    kind,
                    open,
                    name,
                } => {
                    let indent = "  ".repeat(*depth);
                    let (icon, style) = match kind {
                        NodeKind::Folder => {
                            let style = if is_selected {
                                Theme::selected_style()
                            } else if self.target_folder == Some(*node_id) {
                                Theme::target_folder_style()
                            } else {
                                Theme::folder_style()
                            };
                            (icons::folder_marker(*open), style)
                        }
                        NodeKind::File => {
                            let style = if is_selected {
                                Theme::selected_style()
                            } else {
                                Theme::file_style()
                            };
                            (icons::file_icon(name), style)
                        }
                    };

                    let icon_style = if is_selected {
                        Theme::selected_style()
                    } else {
                        Theme::icon_style()
                    };
                    let line = Line::from(vec![
                        Span::raw(indent),
                        Span::styled(format!("{icon} "), icon_style),
                        Span::styled(name.clone(), style),
                    ]);
                    buf.set_line(inner.x, y, &line, inner.width);

                    // Inline add triggers, right-aligned on folder rows.
                    if *kind == NodeKind::Folder && inner.width >= 10 {
                        let style = if is_selected {
                            Theme::selected_style()
                        } else {
                            Theme::trigger_style()
                        };
                        buf.set_string(right - 5, y, TRIGGER_FILE, style);
                        buf.set_string(right - 2, y, TRIGGER_FOLDER, style);
                    }
                }
                SidebarRow::Input { depth } => {
                    let line = self.input_line(*depth);
                    buf.set_line(inner.x, y, &line, inner.width);
                    if inner.width >= 10 {
                        buf.set_string(
                            right - CONFIRM_LABEL.len() as u16,
                            y,
                            CONFIRM_LABEL,
                            Theme::confirm_style(),
                        );
                    }
                }
            }
        }
    }
}

// ───────────────────────────────────────── tests ─────────────
