//! Interactive session: one active level driven by pointer gestures.
//!
//! Events are handled one at a time in arrival order. Out-of-surface pointer
//! input is ignored at every stage; a cancel finalizes the rotation like an
//! End does.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::catalog::LevelRegistry;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::gesture::{drag_angle, select_circle, snapped_angle, Gesture};
use crate::level::{Level, LevelId};
use crate::persistence::ProgressStore;
use crate::pieces::{Piece, ShapeHandle};
use crate::surface::{NullView, View, Viewport};

pub const MESSAGE_WIN: &str = "Congratulations!";
pub const MESSAGE_INSPECT: &str = "Inspect Mode";
pub const MESSAGE_NOT_FOUND: &str = "Level not found";

/// Play scrambles and checks wins; inspect shows the solved state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Play,
    Inspect,
}

/// Owns the active level and everything a gesture touches.
pub struct Session<V: View = NullView> {
    level: Option<Level>,
    handles: FxHashMap<ShapeHandle, usize>,
    mode: Mode,
    gesture: Gesture,
    viewport: Option<Viewport>,
    view: V,
    store: Box<dyn ProgressStore>,
    rng: StdRng,
}

impl<V: View> Session<V> {
    /// Creates an empty session. `seed` makes scrambles reproducible.
    pub fn new(view: V, store: Box<dyn ProgressStore>, seed: Option<u64>) -> Self {
        Self {
            level: None,
            handles: FxHashMap::default(),
            mode: Mode::Play,
            gesture: Gesture::Idle,
            viewport: None,
            view,
            store,
            rng: seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64),
        }
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn store(&self) -> &dyn ProgressStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn ProgressStore {
        self.store.as_mut()
    }

    /// Loads level `id` in play mode, scrambled.
    ///
    /// An unknown id leaves the session without a level, so interaction
    /// cannot start, and reports `"Level not found"`.
    pub fn load_level(&mut self, registry: &dyn LevelRegistry, id: LevelId) -> Result<&Level> {
        self.gesture = Gesture::Idle;
        self.handles.clear();
        let Some(level) = registry.load(id) else {
            warn!(level = id, "level not found");
            self.level = None;
            self.view.show_message(MESSAGE_NOT_FOUND);
            return Err(Error::UnknownLevel(id));
        };
        info!(
            level = id,
            circles = level.circles().len(),
            pieces = level.pieces().len(),
            "level loaded"
        );
        self.handles = level
            .pieces()
            .iter()
            .enumerate()
            .map(|(i, piece)| (piece.handle, i))
            .collect();
        self.level = Some(level);
        self.mode = Mode::Play;
        self.view.show_message("");
        self.reset()?;
        self.level.as_ref().ok_or(Error::NoLevelLoaded)
    }

    /// Attaches the pointer surface. Requires a loaded level and a
    /// non-degenerate viewport.
    pub fn initialize_interaction(&mut self, viewport: Viewport) -> Result<()> {
        if self.level.is_none() {
            warn!("refusing to start interaction without a level");
            return Err(Error::NoLevelLoaded);
        }
        viewport.validate()?;
        self.viewport = Some(viewport);
        self.gesture = Gesture::Idle;
        Ok(())
    }

    /// Scrambles in play mode, shows the solved state in inspect mode.
    pub fn reset(&mut self) -> Result<()> {
        match self.mode {
            Mode::Play => self.reset_to_scrambled(),
            Mode::Inspect => self.reset_to_solved(),
        }
    }

    pub fn reset_to_scrambled(&mut self) -> Result<()> {
        let level = self.level.as_mut().ok_or(Error::NoLevelLoaded)?;
        level.scramble(&mut self.rng);
        self.gesture = Gesture::Idle;
        refresh_all(level, &mut self.view);
        Ok(())
    }

    pub fn reset_to_solved(&mut self) -> Result<()> {
        let level = self.level.as_mut().ok_or(Error::NoLevelLoaded)?;
        level.reset_to_solved();
        self.gesture = Gesture::Idle;
        refresh_all(level, &mut self.view);
        Ok(())
    }

    /// Switches between play and inspect.
    ///
    /// Entering inspect saves every live pose and shows the solved state;
    /// returning to play restores the saved poses.
    pub fn toggle_mode(&mut self) -> Result<Mode> {
        let level = self.level.as_mut().ok_or(Error::NoLevelLoaded)?;
        self.gesture = Gesture::Idle;
        match self.mode {
            Mode::Play => {
                for piece in &mut level.pieces {
                    piece.save_restore();
                    piece.reset_to_solved();
                }
                self.mode = Mode::Inspect;
                self.view.show_message(MESSAGE_INSPECT);
            }
            Mode::Inspect => {
                level.pieces.iter_mut().for_each(Piece::reset_to_restore);
                self.mode = Mode::Play;
                self.view.show_message("");
            }
        }
        refresh_all(level, &mut self.view);
        debug!(mode = ?self.mode, "mode switched");
        Ok(self.mode)
    }

    fn to_local(&self, screen: Point) -> Result<Option<Point>> {
        if self.level.is_none() {
            return Err(Error::NoLevelLoaded);
        }
        let viewport = self.viewport.ok_or(Error::InteractionNotInitialized)?;
        Ok(viewport.to_local(screen))
    }

    /// Start of a gesture at `screen` over the piece rendered as `target`.
    pub fn pointer_down(&mut self, screen: Point, target: Option<ShapeHandle>) -> Result<()> {
        let Some(anchor) = self.to_local(screen)? else {
            return Ok(());
        };
        match self.gesture {
            Gesture::Idle => {}
            Gesture::PieceArmed { .. } => {
                debug!(gesture = ?self.gesture, "new gesture before the last one ended");
                self.gesture = Gesture::Idle;
            }
            Gesture::CircleEngaged { .. } => {
                // an engaged circle always lands on a step
                debug!(gesture = ?self.gesture, "finalizing unfinished rotation");
                self.pointer_up(None)?;
            }
        }
        let Some(piece) = target.and_then(|handle| self.handles.get(&handle).copied()) else {
            return Ok(());
        };
        self.view.clear_hints();
        self.gesture = Gesture::PieceArmed {
            piece,
            anchor,
            last: anchor,
        };
        debug!(piece, x = anchor.x, y = anchor.y, "piece armed");
        Ok(())
    }

    /// Pointer moved to `screen`.
    pub fn pointer_move(&mut self, screen: Point) -> Result<()> {
        let Some(pointer) = self.to_local(screen)? else {
            return Ok(());
        };
        let level = self.level.as_mut().ok_or(Error::NoLevelLoaded)?;
        match self.gesture {
            Gesture::Idle => Ok(()),
            Gesture::PieceArmed { piece, anchor, .. } => {
                match select_circle(level.circles(), anchor, pointer) {
                    Some(circle) => {
                        level.begin_rotation();
                        self.gesture = Gesture::CircleEngaged {
                            circle,
                            anchor,
                            last: pointer,
                        };
                        debug!(piece, circle, "circle engaged");
                        let delta = drag_angle(&level.circles()[circle], anchor, pointer);
                        turn_zone(level, &mut self.view, circle, delta)
                    }
                    None => {
                        self.gesture = Gesture::PieceArmed {
                            piece,
                            anchor,
                            last: pointer,
                        };
                        Ok(())
                    }
                }
            }
            Gesture::CircleEngaged { circle, anchor, .. } => {
                self.gesture = Gesture::CircleEngaged {
                    circle,
                    anchor,
                    last: pointer,
                };
                let delta = drag_angle(&level.circles()[circle], anchor, pointer);
                turn_zone(level, &mut self.view, circle, delta)
            }
        }
    }

    /// End of a gesture. Without in-surface coordinates the last in-surface
    /// pointer position of the gesture is used.
    ///
    /// Returns true when this gesture solved the level.
    pub fn pointer_up(&mut self, screen: Option<Point>) -> Result<bool> {
        let local = match screen {
            Some(screen) => self.to_local(screen)?,
            None => None,
        };
        let gesture = std::mem::take(&mut self.gesture);
        let Gesture::CircleEngaged {
            circle,
            anchor,
            last,
        } = gesture
        else {
            return Ok(false);
        };
        let level = self.level.as_mut().ok_or(Error::NoLevelLoaded)?;
        let pointer = local.unwrap_or(last);
        let snapped = snapped_angle(&level.circles()[circle], anchor, pointer);
        debug!(circle, snapped, "gesture ended");
        turn_zone(level, &mut self.view, circle, snapped)?;
        self.check_win()
    }

    /// Touch cancel finalizes the rotation exactly like an End.
    pub fn pointer_cancel(&mut self, screen: Option<Point>) -> Result<bool> {
        self.pointer_up(screen)
    }

    /// Turns `circle` by `steps` symmetry steps without a pointer gesture.
    ///
    /// Returns true when the turn solved the level.
    pub fn turn(&mut self, circle: usize, steps: i32) -> Result<bool> {
        let level = self.level.as_mut().ok_or(Error::NoLevelLoaded)?;
        let step = level
            .circles()
            .get(circle)
            .ok_or(Error::UnknownCircle(circle))?
            .step_angle();
        self.gesture = Gesture::Idle;
        level.begin_rotation();
        turn_zone(level, &mut self.view, circle, step * steps as f64)?;
        self.check_win()
    }

    /// Runs the win rule after a completed rotation.
    ///
    /// Only in play mode, unless the store's override flag is set.
    fn check_win(&mut self) -> Result<bool> {
        let level = self.level.as_ref().ok_or(Error::NoLevelLoaded)?;
        let enabled = self.mode == Mode::Play || self.store.force_win_check();
        if !enabled || !level.is_solved() {
            return Ok(false);
        }
        info!(level = level.id(), "level solved");
        self.view.show_message(MESSAGE_WIN);
        self.store.mark_solved(level.id())?;
        Ok(true)
    }
}

fn turn_zone<V: View>(level: &mut Level, view: &mut V, circle: usize, delta: f64) -> Result<()> {
    for i in level.rotate_zone(circle, delta)? {
        view.refresh_piece(i, level.pieces()[i].pose());
    }
    Ok(())
}

fn refresh_all<V: View>(level: &Level, view: &mut V) {
    for (i, piece) in level.pieces().iter().enumerate() {
        view.refresh_piece(i, piece.pose());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::geometry::rotate_point;
    use crate::level::{LevelBuilder, WinRule, ZoneTest};
    use crate::persistence::MemoryStore;
    use crate::pieces::{Pose, Shape, Tint};
    use crate::scramble::Scrambler;

    #[derive(Default)]
    struct RecordingView {
        refreshed: Vec<(usize, Pose)>,
        messages: Vec<String>,
        hint_clears: usize,
    }

    impl View for RecordingView {
        fn refresh_piece(&mut self, index: usize, pose: Pose) {
            self.refreshed.push((index, pose));
        }

        fn show_message(&mut self, text: &str) {
            self.messages.push(text.to_string());
        }

        fn clear_hints(&mut self) {
            self.hint_clears += 1;
        }
    }

    /// Registry with a single 12-step twin-circle level and nothing else.
    struct TwinRegistry;

    const TWIN_ID: LevelId = 40;
    const RIGHT_CENTER: Point = Point::new(176.8, 0.0);
    const RIGHT_SLOT: Point = Point::new(376.8, 0.0);

    impl LevelRegistry for TwinRegistry {
        fn load(&self, id: LevelId) -> Option<Level> {
            if id != TWIN_ID {
                return None;
            }
            let dot = Shape::new("dot", Tint::Green);
            LevelBuilder::new(TWIN_ID)
                .circle(Point::new(-176.8, 0.0), 250.0, 12)
                .ok()?
                .circle(RIGHT_CENTER, 250.0, 12)
                .ok()?
                .ring(dot, 1, 1, 200.0, 0.0, 0.0, 0)
                .ok()?
                .ring(dot, 0, 1, 200.0, 180.0, 0.0, 1)
                .ok()?
                .build(
                    Scrambler::new([1, 1]),
                    WinRule::new()
                        .group(0, [ZoneTest::inside(1), ZoneTest::outside(0)])
                        .otherwise([ZoneTest::inside(0)]),
                )
                .ok()
        }

        fn ids(&self) -> Vec<LevelId> {
            vec![TWIN_ID]
        }
    }

    fn session() -> Session<RecordingView> {
        Session::new(RecordingView::default(), Box::new(MemoryStore::new()), Some(11))
    }

    fn twin_session() -> Session<RecordingView> {
        let mut session = session();
        session.load_level(&TwinRegistry, TWIN_ID).unwrap();
        session.initialize_interaction(Viewport::centered(500.0)).unwrap();
        session
    }

    fn pose(session: &Session<RecordingView>, index: usize) -> Pose {
        session.level().unwrap().pieces()[index].pose()
    }

    #[test]
    fn test_unknown_level_is_reported() {
        let mut session = session();
        let result = session.load_level(&Catalog, 99);
        assert!(matches!(result, Err(Error::UnknownLevel(99))));
        assert!(session.level().is_none());
        assert_eq!(session.view().messages.last().unwrap(), MESSAGE_NOT_FOUND);
        assert!(matches!(
            session.initialize_interaction(Viewport::centered(500.0)),
            Err(Error::NoLevelLoaded)
        ));
    }

    #[test]
    fn test_pointer_before_initialization_is_an_error() {
        let mut session = session();
        session.load_level(&Catalog, 1).unwrap();
        assert!(matches!(
            session.pointer_down(Point::ORIGIN, Some(ShapeHandle(0))),
            Err(Error::InteractionNotInitialized)
        ));
    }

    #[test]
    fn test_zero_scale_viewport_is_rejected() {
        let mut session = session();
        session.load_level(&Catalog, 1).unwrap();
        let flat = Viewport::new(-500.0, -500.0, 1000.0, 1000.0, 0.0);
        assert!(matches!(
            session.initialize_interaction(flat),
            Err(Error::InvalidViewport(_))
        ));
        assert!(matches!(
            session.pointer_down(Point::ORIGIN, Some(ShapeHandle(0))),
            Err(Error::InteractionNotInitialized)
        ));
    }

    #[test]
    fn test_load_scrambles_and_refreshes_every_piece() {
        let mut session = session();
        session.load_level(&Catalog, 1).unwrap();
        assert_eq!(session.mode(), Mode::Play);
        assert_eq!(session.view().refreshed.len(), 23);
    }

    #[test]
    fn test_drag_snaps_to_nearest_step() {
        let mut session = twin_session();
        let moved = rotate_point(RIGHT_CENTER, RIGHT_SLOT, 28.0);

        session.pointer_down(RIGHT_SLOT, Some(ShapeHandle(0))).unwrap();
        assert_eq!(session.gesture().armed_piece(), Some(0));
        assert_eq!(session.view().hint_clears, 1);

        session.pointer_move(moved).unwrap();
        assert_eq!(session.gesture().engaged_circle(), Some(1));
        let live = pose(&session, 0);
        assert!((live.a - 28.0).abs() < 1e-9, "live angle {}", live.a);

        session.pointer_up(Some(moved)).unwrap();
        let expected = Pose::at(rotate_point(RIGHT_CENTER, RIGHT_SLOT, 30.0), 30.0);
        assert!(pose(&session, 0).approx_eq(&expected, 1e-9), "{:?}", pose(&session, 0));
        assert!(session.gesture().is_idle());
        // the piece on the left circle never moved
        assert_eq!(pose(&session, 1), session.level().unwrap().pieces()[1].solved_pose());
    }

    #[test]
    fn test_six_step_circle_snaps_28_degrees_back_to_zero() {
        let mut session = session();
        session.load_level(&Catalog, 1).unwrap();
        session.initialize_interaction(Viewport::centered(500.0)).unwrap();
        session.reset_to_solved().unwrap();
        let center = session.level().unwrap().circles()[1].center();
        // piece 4 is the first green shield on the right circle
        let start = pose(&session, 4).position();
        let moved = rotate_point(center, start, 28.0);

        session.pointer_down(start, Some(ShapeHandle(4))).unwrap();
        session.pointer_move(moved).unwrap();
        assert_eq!(session.gesture().engaged_circle(), Some(1));
        session.pointer_up(Some(moved)).unwrap();
        assert!(session.level().unwrap().is_solved(), "28 degrees should snap back");

        let moved = rotate_point(center, start, 32.0);
        session.pointer_down(start, Some(ShapeHandle(4))).unwrap();
        session.pointer_move(moved).unwrap();
        session.pointer_up(Some(moved)).unwrap();
        let expected = rotate_point(center, start, 60.0);
        let actual = pose(&session, 4).position();
        assert!(crate::geometry::distance(actual, expected) < 1e-9);
    }

    #[test]
    fn test_out_of_surface_start_is_ignored() {
        let mut session = twin_session();
        session
            .pointer_down(Point::new(900.0, 0.0), Some(ShapeHandle(0)))
            .unwrap();
        assert!(session.gesture().is_idle());
        assert_eq!(session.view().hint_clears, 0);
    }

    #[test]
    fn test_out_of_surface_move_is_ignored() {
        let mut session = twin_session();
        session.pointer_down(RIGHT_SLOT, Some(ShapeHandle(0))).unwrap();
        session.pointer_move(Point::new(900.0, 900.0)).unwrap();
        assert_eq!(session.gesture().armed_piece(), Some(0));
    }

    #[test]
    fn test_start_without_piece_is_ignored() {
        let mut session = twin_session();
        session.pointer_down(RIGHT_SLOT, None).unwrap();
        assert!(session.gesture().is_idle());
        session.pointer_down(RIGHT_SLOT, Some(ShapeHandle(77))).unwrap();
        assert!(session.gesture().is_idle());
    }

    #[test]
    fn test_tap_changes_nothing() {
        let mut session = twin_session();
        let before = session.view().refreshed.len();
        session.pointer_down(RIGHT_SLOT, Some(ShapeHandle(0))).unwrap();
        let solved = session.pointer_up(Some(RIGHT_SLOT)).unwrap();
        assert!(!solved);
        assert!(session.gesture().is_idle());
        assert_eq!(session.view().refreshed.len(), before);
    }

    #[test]
    fn test_restart_mid_gesture_snaps_unfinished_rotation() {
        let mut session = twin_session();
        let moved = rotate_point(RIGHT_CENTER, RIGHT_SLOT, 17.0);
        session.pointer_down(RIGHT_SLOT, Some(ShapeHandle(0))).unwrap();
        session.pointer_move(moved).unwrap();
        assert!(session.gesture().engaged_circle().is_some());

        session.pointer_down(moved, Some(ShapeHandle(0))).unwrap();
        assert_eq!(session.gesture().armed_piece(), Some(0));
        let expected = Pose::at(rotate_point(RIGHT_CENTER, RIGHT_SLOT, 30.0), 30.0);
        assert!(pose(&session, 0).approx_eq(&expected, 1e-9), "{:?}", pose(&session, 0));

        // a tap ends the new gesture without moving anything
        session.pointer_up(None).unwrap();
        let angle = pose(&session, 0).a;
        assert!((angle / 30.0 - (angle / 30.0).round()).abs() < 1e-9, "angle {angle}");
    }

    #[test]
    fn test_restart_while_armed_rearms() {
        let mut session = twin_session();
        session.pointer_down(RIGHT_SLOT, Some(ShapeHandle(0))).unwrap();
        session.pointer_down(RIGHT_SLOT, Some(ShapeHandle(0))).unwrap();
        assert_eq!(session.gesture().armed_piece(), Some(0));
        assert_eq!(pose(&session, 0), session.level().unwrap().pieces()[0].solved_pose());
    }

    #[test]
    fn test_cancel_without_coordinates_uses_last_position() {
        let mut session = twin_session();
        let moved = rotate_point(RIGHT_CENTER, RIGHT_SLOT, -33.0);
        session.pointer_down(RIGHT_SLOT, Some(ShapeHandle(0))).unwrap();
        session.pointer_move(moved).unwrap();
        session.pointer_cancel(None).unwrap();
        let expected = Pose::at(rotate_point(RIGHT_CENTER, RIGHT_SLOT, -30.0), -30.0);
        assert!(pose(&session, 0).approx_eq(&expected, 1e-9));
    }

    #[test]
    fn test_full_turn_restores_every_level() {
        for id in [1, 2, 3] {
            let mut session = session();
            session.load_level(&Catalog, id).unwrap();
            let circles = session.level().unwrap().circles().len();
            for circle in 0..circles {
                let before: Vec<_> = session
                    .level()
                    .unwrap()
                    .pieces()
                    .iter()
                    .map(Piece::pose)
                    .collect();
                let steps = session.level().unwrap().circles()[circle].steps() as i32;
                for _ in 0..steps {
                    session.turn(circle, 1).unwrap();
                }
                for (i, piece) in session.level().unwrap().pieces().iter().enumerate() {
                    assert!(
                        piece.pose().approx_eq(&before[i], 1e-6),
                        "level {id} circle {circle} piece {i}: {:?} vs {:?}",
                        piece.pose(),
                        before[i]
                    );
                }
            }
        }
    }

    #[test]
    fn test_failing_piece_blocks_the_win() {
        let mut session = session();
        session.load_level(&Catalog, 1).unwrap();
        session.reset_to_solved().unwrap();

        let solved = session.turn(0, 1).unwrap();
        assert!(!solved);
        assert!(!session.view().messages.iter().any(|m| m == MESSAGE_WIN));
        assert!(!session.store().is_solved(1));

        let solved = session.turn(0, -1).unwrap();
        assert!(solved);
        assert_eq!(session.view().messages.last().unwrap(), MESSAGE_WIN);
        assert!(session.store().is_solved(1));
    }

    #[test]
    fn test_inspect_mode_skips_win_check_unless_forced() {
        let mut session = session();
        session.load_level(&Catalog, 2).unwrap();
        assert_eq!(session.toggle_mode().unwrap(), Mode::Inspect);
        assert_eq!(session.view().messages.last().unwrap(), MESSAGE_INSPECT);

        assert!(!session.turn(0, 6).unwrap());
        assert!(!session.store().is_solved(2));

        session.store_mut().set_force_win_check(true).unwrap();
        assert!(session.turn(0, 6).unwrap());
        assert!(session.store().is_solved(2));
    }

    #[test]
    fn test_toggle_mode_round_trip_restores_scramble() {
        let mut session = session();
        session.load_level(&Catalog, 3).unwrap();
        let scrambled: Vec<_> = session
            .level()
            .unwrap()
            .pieces()
            .iter()
            .map(Piece::pose)
            .collect();

        session.toggle_mode().unwrap();
        assert!(session
            .level()
            .unwrap()
            .pieces()
            .iter()
            .all(|p| p.pose() == p.solved_pose()));

        assert_eq!(session.toggle_mode().unwrap(), Mode::Play);
        assert_eq!(session.view().messages.last().unwrap(), "");
        let restored: Vec<_> = session
            .level()
            .unwrap()
            .pieces()
            .iter()
            .map(Piece::pose)
            .collect();
        assert_eq!(restored, scrambled);
    }

    #[test]
    fn test_reset_follows_mode() {
        let mut session = session();
        session.load_level(&Catalog, 1).unwrap();
        session.toggle_mode().unwrap();
        session.turn(1, 2).unwrap();
        session.reset().unwrap();
        assert!(session
            .level()
            .unwrap()
            .pieces()
            .iter()
            .all(|p| p.pose() == p.solved_pose()));
    }

    #[test]
    fn test_turn_on_missing_circle() {
        let mut session = session();
        session.load_level(&Catalog, 1).unwrap();
        assert!(matches!(session.turn(5, 1), Err(Error::UnknownCircle(5))));
    }
}
