use crate::app::Viewport;
use crate::ui::surface::{DrawOp, Scene, Surface};
use kurbo::{Point, Shape as KurboShape, Size};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::{Line as TextLine, Span},
    widgets::{
        canvas::{Canvas, Context, Line, Painter, Shape},
        Block, Widget,
    },
};
use unicode_width::UnicodeWidthStr;

// Braille dots per terminal cell.
const DOTS_X: f64 = 2.0;
const DOTS_Y: f64 = 4.0;

/// Logical scene size of a terminal area, `cell` giving the scene units
/// covered by one cell.
pub fn logical_size(area: Rect, cell: Size) -> Size {
    Size::new(
        f64::from(area.width) * cell.width,
        f64::from(area.height) * cell.height,
    )
}

/// Paints a [`Scene`] through the current viewport on a braille canvas.
///
/// Scene coordinates grow downward while the canvas grows upward, so every
/// y is negated on the way in.
pub struct SceneCanvas<'a> {
    scene: &'a Scene,
    viewport: Viewport,
    block: Option<Block<'a>>,
}

impl<'a> SceneCanvas<'a> {
    pub fn new(scene: &'a Scene, viewport: Viewport) -> Self {
        Self {
            scene,
            viewport,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for SceneCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = self.block.as_ref().map_or(area, |block| block.inner(area));
        if inner.width == 0 || inner.height == 0 {
            if let Some(block) = self.block {
                block.render(area, buf);
            }
            return;
        }

        let visible = self.viewport.visible(self.scene.size());
        let grid = Grid {
            visible,
            step_x: visible.width() / (f64::from(inner.width) * DOTS_X),
            step_y: visible.height() / (f64::from(inner.height) * DOTS_Y),
            units_per_cell: visible.width() / f64::from(inner.width),
        };
        let scene = self.scene;

        let mut canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([visible.x0, visible.x1])
            .y_bounds([-visible.y1, -visible.y0])
            .paint(move |ctx| paint_scene(ctx, scene, grid));
        if let Some(block) = self.block {
            canvas = canvas.block(block);
        }
        canvas.render(area, buf);
    }
}

#[derive(Debug, Clone, Copy)]
struct Grid {
    visible: kurbo::Rect,
    step_x: f64,
    step_y: f64,
    units_per_cell: f64,
}

fn paint_scene(ctx: &mut Context, scene: &Scene, grid: Grid) {
    // Lines on the first layer, filled nodes over them.
    for op in scene.ops() {
        if let DrawOp::Line { line, color, .. } = op {
            ctx.draw(&Line::new(
                line.p0.x, -line.p0.y, line.p1.x, -line.p1.y, *color,
            ));
        }
    }
    ctx.layer();

    for op in scene.ops() {
        match op {
            DrawOp::Circle {
                circle,
                fill,
                stroke,
            } => ctx.draw(&Filled::new(circle, *fill, *stroke, grid)),
            DrawOp::RoundedRect { rect, fill, stroke } => {
                ctx.draw(&Filled::new(rect, *fill, *stroke, grid))
            }
            DrawOp::Text { at, text, color } => {
                let half = text.width() as f64 * grid.units_per_cell / 2.0;
                let span = Span::styled(text.clone(), Style::default().fg(*color));
                ctx.print(at.x - half, -at.y, TextLine::from(span));
            }
            DrawOp::Line { .. } => {}
        }
    }
}

/// A closed kurbo shape sampled on the braille dot grid: interior dots in
/// the fill color, dots next to the boundary in the stroke color.
struct Filled<'a, S> {
    shape: &'a S,
    fill: Color,
    stroke: Color,
    grid: Grid,
}

impl<'a, S: KurboShape> Filled<'a, S> {
    fn new(shape: &'a S, fill: Color, stroke: Color, grid: Grid) -> Self {
        Self {
            shape,
            fill,
            stroke,
            grid,
        }
    }

    fn on_edge(&self, p: Point) -> bool {
        let (dx, dy) = (self.grid.step_x, self.grid.step_y);
        [(dx, 0.0), (-dx, 0.0), (0.0, dy), (0.0, -dy)]
            .into_iter()
            .any(|(ox, oy)| !self.shape.contains(Point::new(p.x + ox, p.y + oy)))
    }
}

impl<S: KurboShape> Shape for Filled<'_, S> {
    fn draw(&self, painter: &mut Painter) {
        let area = self.shape.bounding_box().intersect(self.grid.visible);
        if area.width() <= 0.0 || area.height() <= 0.0 {
            return;
        }

        let cols = (area.width() / self.grid.step_x).ceil() as usize;
        let rows = (area.height() / self.grid.step_y).ceil() as usize;
        for row in 0..=rows {
            let y = area.y0 + row as f64 * self.grid.step_y;
            for col in 0..=cols {
                let p = Point::new(area.x0 + col as f64 * self.grid.step_x, y);
                if !self.shape.contains(p) {
                    continue;
                }
                let color = if self.on_edge(p) {
                    self.stroke
                } else {
                    self.fill
                };
                if let Some((x, y)) = painter.get_point(p.x, -p.y) {
                    painter.paint(x, y, color);
                }
            }
        }
    }
}
