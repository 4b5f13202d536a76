use std::time::Instant;

use crate::ProgramError;
use crate::buffer::DoubleBuffer;
use crate::palette::Palette;
use crate::render::RenderContext;

/// Paint into a fresh buffer and return its rows for assertions in tests.
pub fn render_to_lines(
    width: usize,
    height: usize,
    now: Instant,
    paint: impl FnOnce(&mut RenderContext<'_>) -> Result<(), ProgramError>,
) -> Result<Vec<String>, ProgramError> {
    let mut buffer = DoubleBuffer::new(width, height);
    let palette = Palette::default();
    {
        let mut ctx = RenderContext::new(&mut buffer, &palette, now);
        paint(&mut ctx)?;
    }
    Ok(buffer.lines())
}

/// Paint into a fresh buffer and return it as newline-separated rows.
pub fn render_to_string(
    width: usize,
    height: usize,
    now: Instant,
    paint: impl FnOnce(&mut RenderContext<'_>) -> Result<(), ProgramError>,
) -> Result<String, ProgramError> {
    Ok(render_to_lines(width, height, now, paint)?.join("\n"))
}
