use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProgramError;
use crate::palette::Rgba;
use crate::style::{BorderKind, Edges, Style};

pub const CONTAINER_CLASS: &str = "smart-complete";
pub const INPUT_CLASS: &str = "smart-complete__input";
pub const OVERLAY_CLASS: &str = "smart-complete__overlay";
pub const TYPED_CLASS: &str = "smart-complete__typed";
pub const COMPLETION_CLASS: &str = "smart-complete__completion";

/// Ghost text color applied by the base completion rule.
pub const DEFAULT_COMPLETION_COLOR: Rgba = Rgba::opaque(0x99, 0x99, 0x99);

/// Class lists attached to each part of the widget.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassNames {
    pub container: String,
    pub input: String,
    pub overlay: String,
    pub typed: String,
    pub completion: String,
}

/// Caller supplied class names, one per styleable part.
#[derive(Clone, Copy, Debug, Default)]
pub struct CallerClasses<'a> {
    pub container: Option<&'a str>,
    pub input: Option<&'a str>,
    pub overlay: Option<&'a str>,
    pub completion: Option<&'a str>,
}

impl ClassNames {
    /// `base + caller`, or just the caller's classes when `unstyled`.
    pub fn compose(caller: CallerClasses<'_>, unstyled: bool) -> Self {
        Self {
            container: compose(CONTAINER_CLASS, caller.container, unstyled),
            input: compose(INPUT_CLASS, caller.input, unstyled),
            overlay: compose(OVERLAY_CLASS, caller.overlay, unstyled),
            typed: if unstyled {
                String::new()
            } else {
                TYPED_CLASS.to_owned()
            },
            completion: compose(COMPLETION_CLASS, caller.completion, unstyled),
        }
    }
}

fn compose(base: &str, caller: Option<&str>, unstyled: bool) -> String {
    let caller = caller.unwrap_or_default();
    if unstyled {
        caller.trim().to_owned()
    } else {
        format!("{base} {caller}").trim().to_owned()
    }
}

/// Class name to style rule table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stylesheet {
    rules: BTreeMap<String, Style>,
}

impl Stylesheet {
    /// An empty sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The rules behind the widget's base classes.
    pub fn base() -> Self {
        Self::new()
            .rule(CONTAINER_CLASS, Style::new().with_border(BorderKind::Plain))
            .rule(INPUT_CLASS, Style::new().with_padding(Edges::symmetric(0, 1)))
            .rule(COMPLETION_CLASS, Style::fg(DEFAULT_COMPLETION_COLOR))
    }

    pub fn from_json(source: &str) -> Result<Self, ProgramError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads caller rules and layers them over the base rules.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProgramError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let caller = Self::from_json(&source)?;
        Ok(Self::base().extend(caller))
    }

    /// Adds a rule, merging into an existing rule for the same class.
    pub fn rule(mut self, class: impl Into<String>, style: Style) -> Self {
        self.rules
            .entry(class.into())
            .and_modify(|existing| existing.merge(&style))
            .or_insert(style);
        self
    }

    pub fn extend(mut self, other: Stylesheet) -> Self {
        for (class, style) in other.rules {
            self = self.rule(class, style);
        }
        self
    }

    pub fn get(&self, class: &str) -> Option<&Style> {
        self.rules.get(class)
    }

    /// Merges the rules of a space separated class list. Later classes win.
    pub fn resolve(&self, class_list: &str) -> Style {
        Style::layered(
            class_list
                .split_whitespace()
                .filter_map(|class| self.rules.get(class)),
        )
    }
}
