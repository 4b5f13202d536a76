use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProgramError;
use crate::palette::Rgba;
use crate::style::{Edges, Style};

/// Structured theme object. Each field feeds one target of the widget and sits
/// above class rules and below inline styles.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub completion_color: Option<Rgba>,
    pub completion_opacity: Option<f32>,
    pub text_color: Option<Rgba>,
    pub background_color: Option<Rgba>,
    pub border_color: Option<Rgba>,
    /// Any positive radius selects rounded corners.
    pub border_radius: Option<u16>,
    pub padding: Option<Edges>,
    pub line_height: Option<u16>,
}

impl Theme {
    pub fn from_json(source: &str) -> Result<Self, ProgramError> {
        let theme: Theme = serde_json::from_str(source)?;
        theme.validate()?;
        Ok(theme)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProgramError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&source)
    }

    fn validate(&self) -> Result<(), ProgramError> {
        if let Some(opacity) = self.completion_opacity
            && !(0.0..=1.0).contains(&opacity)
        {
            return Err(ProgramError::config(format!(
                "completionOpacity must be between 0 and 1, got {opacity}"
            )));
        }
        Ok(())
    }

    pub fn container_style(&self) -> Style {
        Style {
            bg: self.background_color,
            border_color: self.border_color,
            rounded: self.border_radius.map(|radius| radius > 0),
            ..Style::default()
        }
    }

    pub fn input_style(&self) -> Style {
        Style {
            fg: self.text_color,
            padding: self.padding,
            line_height: self.line_height,
            ..Style::default()
        }
    }

    /// The theme's completion color layer.
    pub fn completion_color_style(&self) -> Style {
        Style {
            fg: self.completion_color,
            ..Style::default()
        }
    }

    /// The theme's completion opacity layer, one step above its color.
    pub fn completion_opacity_style(&self) -> Style {
        Style {
            opacity: self.completion_opacity,
            ..Style::default()
        }
    }
}
