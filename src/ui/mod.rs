//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! This layer takes the *core* data structures and turns them into pixels on
//! the terminal.  No store I/O happens here.

pub mod layout;
pub mod popup;
pub mod sidebar;
pub mod theme;
pub mod toolbar;
