//! Turns the four presentation channels into final attributes.
//!
//! Layers per target, lowest precedence first:
//!
//! | target     | layers                                                              |
//! |------------|---------------------------------------------------------------------|
//! | container  | class rules, theme (background, border color, radius), `style`      |
//! | input      | class rules, theme (text color, padding, line height), `input_style` |
//! | overlay    | class rules; typography copied from the input                       |
//! | typed      | class rules                                                         |
//! | completion | class rules, `completion_color`, theme color, theme opacity, `completion_style` |

use tracing::trace;

use crate::palette::Rgba;
use crate::style::classes::{CallerClasses, ClassNames, Stylesheet};
use crate::style::{Appearance, Style, Theme, Typography};

/// Borrowed view of every presentation input of one widget instance.
#[derive(Clone, Copy, Debug)]
pub struct StyleInputs<'a> {
    pub stylesheet: &'a Stylesheet,
    pub classes: CallerClasses<'a>,
    pub unstyled: bool,
    pub style: Option<&'a Style>,
    pub input_style: Option<&'a Style>,
    pub completion_style: Option<&'a Style>,
    pub completion_color: Option<Rgba>,
    pub theme: Option<&'a Theme>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StyleResolution {
    pub classes: ClassNames,
    pub container: Appearance,
    pub input: Appearance,
    pub typography: Typography,
    pub overlay: Appearance,
    pub overlay_typography: Typography,
    pub typed: Appearance,
    pub completion: Appearance,
}

pub fn resolve(inputs: &StyleInputs<'_>) -> StyleResolution {
    let classes = ClassNames::compose(inputs.classes, inputs.unstyled);
    let sheet = inputs.stylesheet;
    let theme = inputs.theme.cloned().unwrap_or_default();
    let none = Style::default();

    let container = Style::layered([
        &sheet.resolve(&classes.container),
        &theme.container_style(),
        inputs.style.unwrap_or(&none),
    ]);

    let input = Style::layered([
        &sheet.resolve(&classes.input),
        &theme.input_style(),
        inputs.input_style.unwrap_or(&none),
    ]);
    let typography = input.typography();

    let completion_shortcut = Style {
        fg: inputs.completion_color,
        ..Style::default()
    };
    let completion = Style::layered([
        &sheet.resolve(&classes.completion),
        &completion_shortcut,
        &theme.completion_color_style(),
        &theme.completion_opacity_style(),
        inputs.completion_style.unwrap_or(&none),
    ]);

    let resolution = StyleResolution {
        container: container.appearance(),
        input: input.appearance(),
        typography,
        overlay: sheet.resolve(&classes.overlay).appearance(),
        overlay_typography: typography,
        typed: sheet.resolve(&classes.typed).appearance(),
        completion: completion.appearance(),
        classes,
    };
    trace!(
        completion_fg = ?resolution.completion.fg,
        completion_opacity = resolution.completion.opacity,
        "resolved widget styles"
    );
    resolution
}
