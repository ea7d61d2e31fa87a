//! Toolbar — the button row above the tree pane.
//!
//! Button geometry is computed by the same function the click handler uses,
//! so render and hit-test can never drift apart.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use super::theme::Theme;

/// Toolbar buttons, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarButton {
    AddFile,
    AddFolder,
    CollapseAll,
    ToggleContent,
}

impl ToolbarButton {
    const ALL: &[ToolbarButton] = &[
        ToolbarButton::AddFile,
        ToolbarButton::AddFolder,
        ToolbarButton::CollapseAll,
        ToolbarButton::ToggleContent,
    ];

    /// Button label.  The hide/show pair is width-matched so hit zones stay
    /// stable across the toggle.
    fn label(self, content_hidden: bool) -> &'static str {
        match self {
            ToolbarButton::AddFile => "[+file]",
            ToolbarButton::AddFolder => "[+folder]",
            ToolbarButton::CollapseAll => "[collapse]",
            ToolbarButton::ToggleContent => {
                if content_hidden {
                    "[show]"
                } else {
                    "[hide]"
                }
            }
        }
    }
}

/// Compute the screen rect of every button within the toolbar area.
pub fn button_zones(area: Rect) -> Vec<(ToolbarButton, Rect)> {
    let mut zones = Vec::new();
    let mut x = area.x.saturating_add(1);
    for &button in ToolbarButton::ALL {
        let width = button.label(false).len() as u16;
        if x + width > area.x + area.width {
            break;
        }
        zones.push((button, Rect::new(x, area.y, width, 1)));
        x += width + 1;
    }
    zones
}

/// Which button (if any) a click lands on.
pub fn button_hit(area: Rect, col: u16, row: u16) -> Option<ToolbarButton> {
    if row != area.y {
        return None;
    }
    button_zones(area)
        .into_iter()
        .find(|(_, rect)| col >= rect.x && col < rect.x + rect.width)
        .map(|(button, _)| button)
}

/// The toolbar widget.
pub struct Toolbar<'a> {
    /// Name of the folder adds are targeted at, if one is selected.
    pub target: Option<&'a str>,
    pub content_hidden: bool,
}

impl<'a> Widget for Toolbar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::raw(" ")];
        for &button in ToolbarButton::ALL {
            spans.push(Span::styled(
                button.label(self.content_hidden),
                Theme::toolbar_button_style(),
            ));
            spans.push(Span::raw(" "));
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);

        // Current add target, right-aligned.
        if let Some(name) = self.target {
            let label = format!("target: {name} ");
            let width = label.chars().count() as u16;
            if width < area.width {
                buf.set_string(
                    area.x + area.width - width,
                    area.y,
                    label,
                    Theme::toolbar_target_style(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_resolve_to_the_rendered_buttons() {
        let area = Rect::new(0, 0, 60, 1);
        // "[+file]" starts at column 1.
        assert_eq!(button_hit(area, 1, 0), Some(ToolbarButton::AddFile));
        assert_eq!(button_hit(area, 7, 0), Some(ToolbarButton::AddFile));
        assert_eq!(button_hit(area, 8, 0), None); // gap
        assert_eq!(button_hit(area, 9, 0), Some(ToolbarButton::AddFolder));
        assert_eq!(button_hit(area, 1, 1), None); // wrong row
    }

    #[test]
    fn buttons_that_do_not_fit_are_dropped() {
        let area = Rect::new(0, 0, 12, 1);
        let zones = button_zones(area);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].0, ToolbarButton::AddFile);
    }
}
