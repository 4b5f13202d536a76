use crate::event::KeyCode;

pub const DEFAULT_LABEL: &str = "Smart autocomplete input";
pub const DEFAULT_HINT_ID: &str = "autocomplete-hint";
/// Value of the input's autocomplete property: suggestions appear inline.
pub const AUTOCOMPLETE_INLINE: &str = "inline";

/// Offscreen text announcing an available suggestion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hint {
    pub id: String,
    pub text: String,
}

/// What the widget exposes to assistive technology.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Accessibility {
    pub label: String,
    pub autocomplete: &'static str,
    /// Id of the element describing the input, present while a hint is.
    pub described_by: Option<String>,
    pub hint: Option<Hint>,
    /// The overlay duplicates visible text and is never announced.
    pub overlay_hidden: bool,
    pub required: bool,
    pub disabled: bool,
    pub read_only: bool,
}

impl Accessibility {
    pub fn describe(
        placeholder: &str,
        id: Option<&str>,
        completion: &str,
        accept_key: KeyCode,
    ) -> Self {
        let label = if placeholder.is_empty() {
            DEFAULT_LABEL.to_owned()
        } else {
            placeholder.to_owned()
        };
        let hint = (!completion.is_empty()).then(|| Hint {
            id: hint_id(id),
            text: hint_text(completion, accept_key),
        });

        Self {
            label,
            autocomplete: AUTOCOMPLETE_INLINE,
            described_by: hint.as_ref().map(|hint| hint.id.clone()),
            hint,
            overlay_hidden: true,
            required: false,
            disabled: false,
            read_only: false,
        }
    }
}

fn hint_id(input_id: Option<&str>) -> String {
    match input_id {
        Some(id) if !id.is_empty() => format!("{id}-hint"),
        _ => DEFAULT_HINT_ID.to_owned(),
    }
}

pub fn hint_text(completion: &str, accept_key: KeyCode) -> String {
    format!(
        "Suggestion available: {completion}. Press {} to accept.",
        key_label(accept_key)
    )
}

pub fn key_label(code: KeyCode) -> String {
    let label = match code {
        KeyCode::Char(' ') => "Space",
        KeyCode::Char(ch) => return ch.to_string(),
        KeyCode::Enter => "Enter",
        KeyCode::Esc => "Escape",
        KeyCode::Tab => "Tab",
        KeyCode::Backspace => "Backspace",
        KeyCode::Delete => "Delete",
        KeyCode::Left => "Left",
        KeyCode::Right => "Right",
        KeyCode::Up => "Up",
        KeyCode::Down => "Down",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "Page Up",
        KeyCode::PageDown => "Page Down",
    };
    label.to_owned()
}
