pub mod a11y;
pub mod box_layout;
pub mod buffer;
pub mod components;
pub mod error;
pub mod event;
pub mod geometry;
pub mod palette;
pub mod program;
pub mod render;
pub mod scroll;
pub mod style;
pub mod test_utils;
pub mod text_layout;
pub mod timer;

pub use crate::a11y::{Accessibility, Hint};
pub use crate::error::ProgramError;
pub use crate::event::{
    Cancelable, Event, FocusEvent, Key, KeyCode, MouseButtons, MouseEvent, ScrollEvent, Size,
};
pub use crate::geometry::{Point, Rect};
pub use crate::palette::{Palette, Rgba};
pub use crate::program::{
    DeadlineFn, EventFn, Program, TickFn, Transition, UpdateFn, ViewFn,
};
pub use crate::render::RenderContext;
pub use crate::scroll::{ScrollDelta, ScrollOffset};
pub use crate::style::classes::{DEFAULT_COMPLETION_COLOR, Stylesheet};
pub use crate::style::theme::Theme;
pub use crate::style::{Appearance, BorderKind, Edges, Style, Typography, WrapMode};
pub use components::accept::{ACCEPT_DELAY, AcceptPhase, AcceptState};
pub use components::overlay::OverlayState;
pub use components::smart_complete::{
    DEFAULT_ACCEPT_KEY, DEFAULT_ROWS, FormEntry, Outcome, Props, SmartCompleteState, Validity,
};
pub use components::textarea::{
    EditPolicy, Motion, TextAreaMsg, TextAreaState,
    default_keybindings as default_textarea_keybindings,
};
