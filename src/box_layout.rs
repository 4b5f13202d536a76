//! Box geometry of the widget, computed with taffy.
//!
//! The container holds the input box in normal flow and the overlay box
//! absolutely positioned with zero insets, so both boxes are identical.

use taffy::prelude::{
    AvailableSpace, Display, FlexDirection, Layout, LengthPercentage, LengthPercentageAuto,
    Position, Rect as TaffyRect, Size as TaffySize, Style as TaffyStyle, TaffyTree, auto, length,
    percent, zero,
};
use tracing::trace;

use crate::error::ProgramError;
use crate::geometry::Rect;
use crate::style::Typography;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxLayout {
    pub container: Rect,
    pub input: Rect,
    pub overlay: Rect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxSpec {
    pub border: bool,
    /// Visible text lines.
    pub rows: u16,
    pub typography: Typography,
}

impl BoxSpec {
    /// Height of the input box: the text lines plus vertical padding.
    pub fn input_height(&self) -> usize {
        usize::from(self.rows.max(1)) * usize::from(self.typography.line_height)
            + self.typography.padding.vertical()
    }
}

pub fn compute(area: Rect, spec: &BoxSpec) -> Result<BoxLayout, ProgramError> {
    let mut tree: TaffyTree<()> = TaffyTree::new();

    let input = tree.new_leaf(TaffyStyle {
        size: TaffySize {
            width: percent(1.0),
            height: length(spec.input_height() as f32),
        },
        min_size: TaffySize {
            width: auto(),
            height: zero(),
        },
        flex_shrink: 1.0,
        ..TaffyStyle::default()
    })?;

    let overlay = tree.new_leaf(TaffyStyle {
        position: Position::Absolute,
        inset: TaffyRect::<LengthPercentageAuto> {
            left: length(0.0),
            right: length(0.0),
            top: length(0.0),
            bottom: length(0.0),
        },
        ..TaffyStyle::default()
    })?;

    let border_width = usize::from(spec.border);
    let border: LengthPercentage = length(border_width as f32);
    let height = (spec.input_height() + 2 * border_width).min(area.height);
    let container = tree.new_with_children(
        TaffyStyle {
            display: Display::Flex,
            flex_direction: FlexDirection::Column,
            border: TaffyRect {
                left: border,
                right: border,
                top: border,
                bottom: border,
            },
            size: TaffySize {
                width: length(area.width as f32),
                height: length(height as f32),
            },
            ..TaffyStyle::default()
        },
        &[input, overlay],
    )?;

    tree.compute_layout(
        container,
        TaffySize {
            width: AvailableSpace::Definite(area.width as f32),
            height: AvailableSpace::Definite(area.height as f32),
        },
    )?;

    let container_layout = tree.layout(container)?;
    let container_rect = to_rect(area.x, area.y, container_layout).intersection(area);
    let input_rect = to_rect(container_rect.x, container_rect.y, tree.layout(input)?);
    let overlay_rect = to_rect(container_rect.x, container_rect.y, tree.layout(overlay)?);

    trace!(?container_rect, ?input_rect, ?overlay_rect, "computed widget boxes");

    Ok(BoxLayout {
        container: container_rect,
        input: input_rect.intersection(container_rect),
        overlay: overlay_rect.intersection(container_rect),
    })
}

fn to_rect(origin_x: usize, origin_y: usize, layout: &Layout) -> Rect {
    Rect::new(
        origin_x + layout.location.x.max(0.0).round() as usize,
        origin_y + layout.location.y.max(0.0).round() as usize,
        layout.size.width.max(0.0).round() as usize,
        layout.size.height.max(0.0).round() as usize,
    )
}
