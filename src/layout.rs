//! Geometry and text placement for flattened field values
//!
//! All coordinates are PDF user-space points with the origin at the
//! bottom-left of the page.

use lopdf::Object;

/// An axis-aligned rectangle, normalized so that `x1 <= x2` and `y1 <= y2`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    /// Build a rectangle from two opposite corners in any order
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// US Letter page box (8.5" × 11"), used when a page declares no MediaBox
    pub fn letter() -> Self {
        Self::new(0.0, 0.0, 612.0, 792.0)
    }

    /// Parse a PDF rectangle array `[x1 y1 x2 y2]`
    pub fn from_pdf_array(values: &[Object]) -> Option<Self> {
        if values.len() != 4 {
            return None;
        }
        let mut nums = [0.0f32; 4];
        for (slot, value) in nums.iter_mut().zip(values) {
            *slot = value.as_float().ok()?;
        }
        Some(Self::new(nums[0], nums[1], nums[2], nums[3]))
    }

    /// Convert back into a PDF rectangle array
    pub fn to_pdf_array(&self) -> Vec<Object> {
        vec![
            Object::Real(self.x1),
            Object::Real(self.y1),
            Object::Real(self.x2),
            Object::Real(self.y2),
        ]
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Whether a point lies inside or on the edge of the rectangle
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

/// Layout tunables for drawing field values
#[derive(Debug, Clone)]
pub struct FlattenOptions {
    /// Inset from the widget edges, in points
    pub margin: f32,
    /// Smallest font size used for any value
    pub min_font_size: f32,
    /// Largest font size used for any value
    pub max_font_size: f32,
    /// Font size as a fraction of the box height for single-line values
    pub text_scale: f32,
    /// Line size as a fraction of the box height for multi-select lists
    pub list_scale: f32,
    /// Vertical gap between stacked lines
    pub line_gap: f32,
    /// Check mark stroke width as a fraction of the box height
    pub stroke_scale: f32,
    /// Thinnest check mark stroke
    pub min_stroke_width: f32,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            margin: 2.0,
            min_font_size: 8.0,
            max_font_size: 12.0,
            text_scale: 0.6,
            list_scale: 0.45,
            line_gap: 2.0,
            stroke_scale: 0.12,
            min_stroke_width: 1.0,
        }
    }
}

impl FlattenOptions {
    fn clamp_font_size(&self, size: f32) -> f32 {
        size.max(self.min_font_size).min(self.max_font_size)
    }
}

/// One line of text positioned at its baseline origin
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub text: String,
}

/// A straight stroke between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: (f32, f32),
    pub to: (f32, f32),
}

/// The two diagonals of a check mark plus the stroke width
#[derive(Debug, Clone, PartialEq)]
pub struct CheckMark {
    pub line_width: f32,
    pub strokes: [Segment; 2],
}

/// Place a single value vertically centered in its box
pub fn single_line(rect: &Rect, text: &str, options: &FlattenOptions) -> TextLine {
    let font_size = options.clamp_font_size(rect.height() * options.text_scale);
    TextLine {
        x: rect.x1 + options.margin,
        y: rect.y1 + (rect.height() - font_size) * 0.5 + 1.0,
        font_size,
        text: text.to_string(),
    }
}

/// Stack values top-down inside the box
///
/// Lines that would start below the bottom margin are dropped.
pub fn stacked_lines(rect: &Rect, texts: &[String], options: &FlattenOptions) -> Vec<TextLine> {
    let line_height = options.clamp_font_size(rect.height() * options.list_scale);
    let floor = rect.y1 + options.margin;
    let mut y = rect.y2 - line_height - options.margin;
    let mut lines = Vec::new();

    for text in texts {
        if y < floor {
            break;
        }
        lines.push(TextLine {
            x: rect.x1 + options.margin,
            y,
            font_size: line_height,
            text: text.clone(),
        });
        y -= line_height + options.line_gap;
    }

    lines
}

/// Corner-to-corner X for a checked box
pub fn check_mark(rect: &Rect, options: &FlattenOptions) -> CheckMark {
    let m = options.margin;
    CheckMark {
        line_width: (rect.height() * options.stroke_scale).max(options.min_stroke_width),
        strokes: [
            Segment {
                from: (rect.x1 + m, rect.y1 + m),
                to: (rect.x2 - m, rect.y2 - m),
            },
            Segment {
                from: (rect.x1 + m, rect.y2 - m),
                to: (rect.x2 - m, rect.y1 + m),
            },
        ],
    }
}
