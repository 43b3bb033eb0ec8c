//! Interactive viewer for a puzzle session using kiss3d.
//!
//! Pieces are drawn as cubes on the z = 0 plane and circles as rings of small
//! cubes. Puzzle space is y-down, so y is flipped on the way into the scene.

use kiss3d::prelude::*;

use circlet::persistence::ProgressStore;
use circlet::pieces::{Pose, Tint};
use circlet::{Catalog, Circle, LevelId, Session, View};

/// Puzzle units per world unit.
const PUZZLE_SCALE: f32 = 100.0;
/// Size of a piece cube.
const PIECE_SIZE: f32 = 0.35;
/// Cubes per circle outline.
const RING_DOTS: usize = 72;
/// Size of an outline cube.
const RING_DOT_SIZE: f32 = 0.05;

/// Returns the display color for a piece tint.
fn tint_color(tint: Tint) -> Color {
    match tint {
        Tint::Red => Color::new(1.0, 0.2, 0.2, 1.0),
        Tint::Green => Color::new(0.2, 1.0, 0.2, 1.0),
        Tint::Yellow => Color::new(1.0, 1.0, 0.2, 1.0),
        Tint::Cyan => Color::new(0.2, 1.0, 1.0, 1.0),
        Tint::Blue => Color::new(0.2, 0.2, 1.0, 1.0),
        Tint::Orange => Color::new(1.0, 0.6, 0.2, 1.0),
        Tint::Purple => Color::new(0.6, 0.2, 1.0, 1.0),
        Tint::White => Color::new(0.95, 0.95, 0.95, 1.0),
    }
}

fn ring_color(selected: bool) -> Color {
    if selected {
        Color::new(1.0, 1.0, 1.0, 1.0)
    } else {
        Color::new(0.35, 0.35, 0.35, 1.0)
    }
}

fn to_world(x: f64, y: f64) -> Vec3 {
    Vec3::new(x as f32 / PUZZLE_SCALE, -(y as f32) / PUZZLE_SCALE, 0.0)
}

/// Session view that moves scene nodes and remembers the status line.
struct SceneView {
    nodes: Vec<SceneNode3d>,
    message: String,
    title_dirty: bool,
}

impl View for SceneView {
    fn refresh_piece(&mut self, index: usize, pose: Pose) {
        // poses may arrive before the nodes exist; build_pieces catches up
        if let Some(node) = self.nodes.get_mut(index) {
            node.set_position(to_world(pose.x, pose.y));
        }
    }

    fn show_message(&mut self, text: &str) {
        self.message = text.to_string();
        self.title_dirty = true;
    }
}

/// Adds one cube per piece, positioned at its current pose.
fn build_pieces(scene: &mut SceneNode3d, session: &Session<SceneView>) -> Vec<SceneNode3d> {
    let Some(level) = session.level() else {
        return Vec::new();
    };
    level
        .pieces()
        .iter()
        .map(|piece| {
            let pose = piece.pose();
            scene
                .add_cube(PIECE_SIZE, PIECE_SIZE, PIECE_SIZE)
                .set_color(tint_color(piece.shape.tint))
                .set_position(to_world(pose.x, pose.y))
        })
        .collect()
}

/// Adds an outline of small cubes for every circle.
fn build_rings(scene: &mut SceneNode3d, circles: &[Circle]) -> Vec<Vec<SceneNode3d>> {
    circles
        .iter()
        .map(|circle| {
            let center = circle.center();
            (0..RING_DOTS)
                .map(|i| {
                    let degrees = 360.0 * i as f64 / RING_DOTS as f64;
                    let rim = circlet::Point::polar(center, circle.outer_radius(), degrees);
                    scene
                        .add_cube(RING_DOT_SIZE, RING_DOT_SIZE, RING_DOT_SIZE)
                        .set_color(ring_color(false))
                        .set_position(to_world(rim.x, rim.y))
                })
                .collect()
        })
        .collect()
}

fn window_title(level: LevelId, selected: usize, message: &str) -> String {
    format!(
        "Level {level} - circle {selected} {message} - [Up/Down] circle, [Left/Right] turn, [R] reset"
    )
}

/// Opens a window for `level` and plays it until the window closes.
pub fn play(level: LevelId, store: Box<dyn ProgressStore>, seed: Option<u64>) -> circlet::Result<()> {
    pollster::block_on(play_async(level, store, seed))
}

async fn play_async(
    level_id: LevelId,
    store: Box<dyn ProgressStore>,
    seed: Option<u64>,
) -> circlet::Result<()> {
    let view = SceneView {
        nodes: Vec::new(),
        message: String::new(),
        title_dirty: false,
    };
    let mut session = Session::new(view, store, seed);
    session.load_level(&Catalog, level_id)?;
    let circles = session
        .level()
        .map(|level| level.circles().to_vec())
        .unwrap_or_default();

    let mut selected = 0;
    let mut window = Window::new(&window_title(level_id, selected, "")).await;

    let mut camera = OrbitCamera3d::default();
    camera.set_dist(12.0);

    let mut scene = SceneNode3d::empty();
    scene
        .add_light(Light::point(100.0))
        .set_position(Vec3::new(0.0, 0.0, 10.0));

    let mut rings = build_rings(&mut scene, &circles);
    let pieces = build_pieces(&mut scene, &session);
    session.view_mut().nodes = pieces;
    if let Some(ring) = rings.get_mut(selected) {
        for dot in ring {
            dot.set_color(ring_color(true));
        }
    }

    loop {
        let mut new_selection = None;
        for event in window.events().iter() {
            if let kiss3d::event::WindowEvent::Key(key, action, _) = event.value {
                use kiss3d::event::{Action, Key};
                if action != Action::Press {
                    continue;
                }
                let outcome = match key {
                    Key::Up => {
                        new_selection = Some((selected + 1) % circles.len());
                        Ok(())
                    }
                    Key::Down => {
                        new_selection =
                            Some(selected.checked_sub(1).unwrap_or(circles.len() - 1));
                        Ok(())
                    }
                    Key::Left => session.turn(selected, -1).map(|_| ()),
                    Key::Right => session.turn(selected, 1).map(|_| ()),
                    Key::R => session.reset(),
                    _ => Ok(()),
                };
                if let Err(e) = outcome {
                    tracing::warn!(error = %e, "key press failed");
                }
            }
        }

        if let Some(next) = new_selection {
            for (i, ring) in rings.iter_mut().enumerate() {
                if i == selected || i == next {
                    for dot in ring.iter_mut() {
                        dot.set_color(ring_color(i == next));
                    }
                }
            }
            selected = next;
            session.view_mut().title_dirty = true;
        }

        if session.view().title_dirty {
            let title = window_title(level_id, selected, &session.view().message);
            window.set_title(&title);
            session.view_mut().title_dirty = false;
        }

        if !window.render_3d(&mut scene, &mut camera).await {
            break;
        }
    }

    Ok(())
}
