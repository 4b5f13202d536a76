use crate::scroll::{ScrollDelta, ScrollOffset};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Key(Key),
    /// Key release. Only reported by hosts whose terminal protocol supports it.
    KeyUp(Key),
    Paste(String),
    Mouse(MouseEvent),
    FocusGained,
    FocusLost,
    Resize(Size),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Key {
    pub code: KeyCode,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MouseButtons {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
    pub vert_wheel: bool,
    pub horz_wheel: bool,
    /// Direction of the wheel: `true` scrolls up (or left).
    pub wheel_positive: bool,
}

impl MouseButtons {
    pub fn new(left: bool, right: bool, middle: bool) -> Self {
        Self {
            left,
            right,
            middle,
            ..Self::default()
        }
    }

    pub fn wheel(vertical: bool, positive: bool) -> Self {
        Self {
            vert_wheel: vertical,
            horz_wheel: !vertical,
            wheel_positive: positive,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseEvent {
    pub x: u16,
    pub y: u16,
    pub buttons: MouseButtons,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl MouseEvent {
    pub fn new(x: u16, y: u16, buttons: MouseButtons) -> Self {
        Self::with_modifiers(x, y, buttons, false, false, false)
    }

    pub fn with_modifiers(
        x: u16,
        y: u16,
        buttons: MouseButtons,
        ctrl: bool,
        alt: bool,
        shift: bool,
    ) -> Self {
        Self {
            x,
            y,
            buttons,
            ctrl,
            alt,
            shift,
        }
    }

    /// Scroll delta in rows/columns for wheel events. Shift turns a vertical
    /// wheel into horizontal scrolling.
    pub fn wheel_delta(&self, step: i32) -> Option<ScrollDelta> {
        let amount = if self.buttons.wheel_positive { -step } else { step };
        if self.buttons.vert_wheel {
            if self.shift {
                Some(ScrollDelta::new(0, amount))
            } else {
                Some(ScrollDelta::new(amount, 0))
            }
        } else if self.buttons.horz_wheel {
            Some(ScrollDelta::new(0, amount))
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Event {
    pub fn key(code: KeyCode) -> Self {
        Self::Key(Key::new(code))
    }

    pub fn resize(width: u16, height: u16) -> Self {
        Self::Resize(Size::new(width, height))
    }

    pub fn mouse(x: u16, y: u16, buttons: MouseButtons) -> Self {
        Self::Mouse(MouseEvent::new(x, y, buttons))
    }
}

impl Key {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            ctrl: false,
            alt: false,
            shift: false,
        }
    }

    pub fn with_modifiers(code: KeyCode, ctrl: bool, alt: bool, shift: bool) -> Self {
        Self {
            code,
            ctrl,
            alt,
            shift,
        }
    }

    pub fn shifted(code: KeyCode) -> Self {
        Self::with_modifiers(code, false, false, true)
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self::with_modifiers(code, true, false, false)
    }
}

impl Size {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// An event handed to a pass-through handler before the widget reacts to it.
///
/// Calling [`Cancelable::prevent_default`] suppresses the widget's own
/// handling of the event.
#[derive(Clone, Debug, PartialEq)]
pub struct Cancelable<E> {
    event: E,
    default_prevented: bool,
}

impl<E> Cancelable<E> {
    pub fn new(event: E) -> Self {
        Self {
            event,
            default_prevented: false,
        }
    }

    pub fn event(&self) -> &E {
        &self.event
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusEvent {
    pub focused: bool,
}

/// A scroll of the input: where it would end up, and the request that led there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollEvent {
    pub offset: ScrollOffset,
    pub delta: ScrollDelta,
}
