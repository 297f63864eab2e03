use kurbo::{Circle, Line, Point, RoundedRect, Size};
use ratatui::style::Color;
use std::fmt::Write as _;

/// A 2D drawing target in scene units, y growing downward.
pub trait Surface {
    fn size(&self) -> Size;
    fn clear(&mut self);
    fn stroke_line(&mut self, line: Line, color: Color, width: f64);
    fn fill_circle(&mut self, circle: Circle, fill: Color, stroke: Color);
    fn fill_rounded_rect(&mut self, rect: RoundedRect, fill: Color, stroke: Color);
    /// Draws `text` centered on `at`.
    fn fill_text(&mut self, at: Point, text: &str, color: Color);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Line {
        line: Line,
        color: Color,
        width: f64,
    },
    Circle {
        circle: Circle,
        fill: Color,
        stroke: Color,
    },
    RoundedRect {
        rect: RoundedRect,
        fill: Color,
        stroke: Color,
    },
    Text {
        at: Point,
        text: String,
        color: Color,
    },
}

/// Retained surface: records draw operations in order so they can be
/// painted onto the terminal on every frame.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    size: Size,
    ops: Vec<DrawOp>,
}

impl Scene {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Text labels in draw order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// One line per operation, for logs and test assertions.
    pub fn dump(&self) -> String {
        let mut out = format!("scene {}x{}\n", self.size.width, self.size.height);
        for op in &self.ops {
            // Writing into a String cannot fail.
            let _ = match op {
                DrawOp::Line { line, color, width } => writeln!(
                    out,
                    "line ({},{})-({},{}) {} w{}",
                    line.p0.x,
                    line.p0.y,
                    line.p1.x,
                    line.p1.y,
                    hex(*color),
                    width
                ),
                DrawOp::Circle {
                    circle,
                    fill,
                    stroke,
                } => writeln!(
                    out,
                    "circle ({},{}) r{} {}/{}",
                    circle.center.x,
                    circle.center.y,
                    circle.radius,
                    hex(*fill),
                    hex(*stroke)
                ),
                DrawOp::RoundedRect { rect, fill, stroke } => {
                    let r = rect.rect();
                    writeln!(
                        out,
                        "rrect ({},{})-({},{}) {}/{}",
                        r.x0,
                        r.y0,
                        r.x1,
                        r.y1,
                        hex(*fill),
                        hex(*stroke)
                    )
                }
                DrawOp::Text { at, text, color } => {
                    writeln!(out, "text ({},{}) {:?} {}", at.x, at.y, text, hex(*color))
                }
            };
        }
        out
    }
}

impl Surface for Scene {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self) {
        self.ops.clear();
    }

    fn stroke_line(&mut self, line: Line, color: Color, width: f64) {
        self.ops.push(DrawOp::Line { line, color, width });
    }

    fn fill_circle(&mut self, circle: Circle, fill: Color, stroke: Color) {
        self.ops.push(DrawOp::Circle {
            circle,
            fill,
            stroke,
        });
    }

    fn fill_rounded_rect(&mut self, rect: RoundedRect, fill: Color, stroke: Color) {
        self.ops.push(DrawOp::RoundedRect { rect, fill, stroke });
    }

    fn fill_text(&mut self, at: Point, text: &str, color: Color) {
        self.ops.push(DrawOp::Text {
            at,
            text: text.to_string(),
            color,
        });
    }
}

fn hex(color: Color) -> String {
    match color {
        Color::Rgb(r, g, b) => format!("#{r:02X}{g:02X}{b:02X}"),
        other => format!("{other:?}"),
    }
}
