//! Gesture states and the pure parts of drag interpretation.

use crate::circle::Circle;
use crate::geometry::{angle_between, signed_angle, snap_angle, Point};

/// Where the current pointer gesture stands.
///
/// `anchor` is the puzzle-space point where the gesture started; `last` is the
/// most recent in-surface pointer position, used when an End event arrives
/// without coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    /// Pointer went down on a piece; no circle chosen yet.
    PieceArmed {
        piece: usize,
        anchor: Point,
        last: Point,
    },
    /// A circle is turning and every piece holds a drag snapshot.
    CircleEngaged {
        circle: usize,
        anchor: Point,
        last: Point,
    },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    pub fn armed_piece(&self) -> Option<usize> {
        match *self {
            Gesture::PieceArmed { piece, .. } => Some(piece),
            _ => None,
        }
    }

    pub fn engaged_circle(&self) -> Option<usize> {
        match *self {
            Gesture::CircleEngaged { circle, .. } => Some(circle),
            _ => None,
        }
    }
}

/// Picks the circle a drag from `anchor` to `pointer` turns.
///
/// Among circles containing `pointer`, the winner is the one whose center is
/// most nearly in line with the drag, i.e. with the smallest shortest-path
/// angle at `anchor` between the pointer and the center. Ties keep the
/// earlier circle.
pub fn select_circle(circles: &[Circle], anchor: Point, pointer: Point) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, circle) in circles.iter().enumerate() {
        if !circle.contains_point(pointer) {
            continue;
        }
        let angle = signed_angle(angle_between(pointer, anchor, circle.center())).abs();
        if best.map_or(true, |(_, min)| angle < min) {
            best = Some((i, angle));
        }
    }
    best.map(|(i, _)| i)
}

/// Live rotation of a drag about `circle`'s center, in (-180, 180].
pub fn drag_angle(circle: &Circle, anchor: Point, pointer: Point) -> f64 {
    signed_angle(angle_between(pointer, circle.center(), anchor))
}

/// Final rotation of a drag: the live angle snapped to the circle's step.
pub fn snapped_angle(circle: &Circle, anchor: Point, pointer: Point) -> f64 {
    snap_angle(drag_angle(circle, anchor, pointer), circle.step_angle())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::rotate_point;

    fn twin_circles() -> Vec<Circle> {
        vec![
            Circle::new(Point::new(-176.8, 0.0), 250.0, 6).unwrap(),
            Circle::new(Point::new(176.8, 0.0), 250.0, 6).unwrap(),
        ]
    }

    #[test]
    fn test_pointer_outside_every_circle_selects_nothing() {
        let circles = twin_circles();
        assert_eq!(
            select_circle(&circles, Point::ORIGIN, Point::new(0.0, 400.0)),
            None
        );
    }

    #[test]
    fn test_single_containing_circle_wins() {
        let circles = twin_circles();
        let anchor = Point::new(380.0, 0.0);
        let pointer = Point::new(370.0, 40.0);
        assert_eq!(select_circle(&circles, anchor, pointer), Some(1));
    }

    #[test]
    fn test_overlap_prefers_center_in_line_with_drag() {
        let circles = twin_circles();
        // both circles contain the pointer; the drag heads towards the left center
        let anchor = Point::new(0.0, 100.0);
        let pointer = Point::new(-20.0, 90.0);
        assert_eq!(select_circle(&circles, anchor, pointer), Some(0));
        // and towards the right center
        let pointer = Point::new(20.0, 90.0);
        assert_eq!(select_circle(&circles, anchor, pointer), Some(1));
    }

    #[test]
    fn test_tie_keeps_declaration_order() {
        let circles = vec![
            Circle::new(Point::new(0.0, 0.0), 100.0, 4).unwrap(),
            Circle::new(Point::new(0.0, 0.0), 80.0, 6).unwrap(),
        ];
        let anchor = Point::new(50.0, 0.0);
        let pointer = Point::new(40.0, 0.0);
        assert_eq!(select_circle(&circles, anchor, pointer), Some(0));
    }

    #[test]
    fn test_drag_angle_and_snap() {
        let circle = Circle::new(Point::new(176.8, 0.0), 250.0, 12).unwrap();
        let anchor = Point::new(376.8, 0.0);
        let pointer = rotate_point(circle.center(), anchor, 28.0);
        assert!((drag_angle(&circle, anchor, pointer) - 28.0).abs() < 1e-9);
        assert!((snapped_angle(&circle, anchor, pointer) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_drag_angle_takes_shortest_path() {
        let circle = Circle::new(Point::ORIGIN, 100.0, 6).unwrap();
        let anchor = Point::new(50.0, 0.0);
        let pointer = rotate_point(Point::ORIGIN, anchor, 300.0);
        assert!((drag_angle(&circle, anchor, pointer) + 60.0).abs() < 1e-9);
        assert!((snapped_angle(&circle, anchor, pointer) + 60.0).abs() < 1e-9);
    }
}
