use crate::error::ChartResult;
use crate::render::{LinePrimitive, RectPrimitive, TextPrimitive};

/// Backend-agnostic scene for one chart draw pass.
///
/// A frame is rebuilt from scratch on every render; nothing is retained
/// between passes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderFrame {
    pub lines: Vec<LinePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl RenderFrame {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: LinePrimitive) {
        self.lines.push(line);
    }

    pub fn push_rect(&mut self, rect: RectPrimitive) {
        self.rects.push(rect);
    }

    pub fn push_text(&mut self, text: TextPrimitive) {
        self.texts.push(text);
    }

    /// Shifts every primitive by `(dx, dy)`, moving a pane-local frame into
    /// chart coordinates.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for line in &mut self.lines {
            line.x1 += dx;
            line.y1 += dy;
            line.x2 += dx;
            line.y2 += dy;
        }
        for rect in &mut self.rects {
            rect.x += dx;
            rect.y += dy;
        }
        for text in &mut self.texts {
            text.x += dx;
            text.y += dy;
        }
    }

    /// Appends all primitives of `other`, preserving draw order.
    pub fn merge(&mut self, other: Self) {
        self.lines.extend(other.lines);
        self.rects.extend(other.rects);
        self.texts.extend(other.texts);
    }

    pub fn validate(&self) -> ChartResult<()> {
        for line in &self.lines {
            line.validate()?;
        }
        for rect in &self.rects {
            rect.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.rects.is_empty() && self.texts.is_empty()
    }
}
