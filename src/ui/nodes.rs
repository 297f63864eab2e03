use crate::layout::{LayoutConfig, PositionedNode};
use crate::ui::constants::palette;
use crate::ui::surface::Surface;
use kurbo::{Circle, Point, Rect, RoundedRect};

/// A circle with its single value centered inside.
pub fn draw_binary_node<S: Surface + ?Sized>(
    surface: &mut S,
    node: &PositionedNode,
    config: &LayoutConfig,
) {
    surface.fill_circle(
        Circle::new(node.center, config.node_radius),
        palette::BINARY_FILL,
        palette::BINARY_STROKE,
    );
    if let Some(value) = node.values.first() {
        surface.fill_text(node.center, &value.to_string(), palette::LABEL);
    }
}

/// A rounded box sized to its values, which are spread evenly across it in
/// stored order.
pub fn draw_mary_node<S: Surface + ?Sized>(
    surface: &mut S,
    node: &PositionedNode,
    config: &LayoutConfig,
) {
    let width = config.mary_node_width(node.values.len());
    let rect = Rect::from_center_size(node.center, (width, config.node_height));
    surface.fill_rounded_rect(
        RoundedRect::from_rect(rect, config.corner_radius),
        palette::MARY_FILL,
        palette::MARY_STROKE,
    );

    for (at, value) in value_slots(node.center, width, node.values.len()).zip(&node.values) {
        surface.fill_text(at, &value.to_string(), palette::LABEL);
    }
}

fn value_slots(center: Point, width: f64, count: usize) -> impl Iterator<Item = Point> {
    let left = center.x - width / 2.0;
    let step = width / (count as f64 + 1.0);
    (1..=count).map(move |i| Point::new(left + i as f64 * step, center.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutKey;
    use crate::ui::surface::{DrawOp, Scene};
    use kurbo::Size;

    fn positioned(values: Vec<i64>) -> PositionedNode {
        PositionedNode {
            key: LayoutKey::Root,
            center: Point::new(400.0, 80.0),
            level: 0,
            values,
        }
    }

    #[test]
    fn test_value_slots_are_evenly_spaced() {
        let xs: Vec<f64> = value_slots(Point::new(400.0, 0.0), 160.0, 3)
            .map(|p| p.x)
            .collect();
        assert_eq!(xs, vec![360.0, 400.0, 440.0]);
    }

    #[test]
    fn test_mary_node_width_grows_with_values() {
        let config = LayoutConfig::default();
        let mut scene = Scene::new(Size::new(800.0, 600.0));
        draw_mary_node(&mut scene, &positioned(vec![1, 2, 3, 4, 5]), &config);

        let Some(DrawOp::RoundedRect { rect, .. }) = scene.ops().first() else {
            panic!("expected the box to be drawn first");
        };
        // 5 * 30 + 40 = 190 beats the 150 floor.
        assert_eq!(rect.rect().width(), 190.0);
        assert_eq!(rect.rect().height(), config.node_height);
        assert_eq!(scene.labels().collect::<Vec<_>>(), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_binary_node_draws_circle_then_value() {
        let config = LayoutConfig::default();
        let mut scene = Scene::new(Size::new(800.0, 600.0));
        draw_binary_node(&mut scene, &positioned(vec![42]), &config);

        assert!(matches!(
            scene.ops(),
            [DrawOp::Circle { .. }, DrawOp::Text { .. }]
        ));
        assert_eq!(scene.labels().collect::<Vec<_>>(), vec!["42"]);
    }
}
