//! Level model: circles, pieces, scramble groups and the win rule.

use rand::Rng;

use crate::circle::Circle;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::pieces::{Piece, Pose, Shape, ShapeHandle};
use crate::scramble::Scrambler;

pub type LevelId = u32;

/// One membership condition of a win rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneTest {
    pub circle: usize,
    pub inside: bool,
}

impl ZoneTest {
    pub const fn inside(circle: usize) -> Self {
        Self {
            circle,
            inside: true,
        }
    }

    pub const fn outside(circle: usize) -> Self {
        Self {
            circle,
            inside: false,
        }
    }
}

/// Data-driven win predicate.
///
/// Each group maps to a conjunction of zone tests; groups without an explicit
/// entry use the fallback. An empty conjunction always holds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WinRule {
    groups: Vec<(u32, Vec<ZoneTest>)>,
    fallback: Vec<ZoneTest>,
}

impl WinRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the tests a piece of `group` must pass.
    pub fn group(mut self, group: u32, tests: impl Into<Vec<ZoneTest>>) -> Self {
        self.groups.push((group, tests.into()));
        self
    }

    /// Sets the tests for every group without its own entry.
    pub fn otherwise(mut self, tests: impl Into<Vec<ZoneTest>>) -> Self {
        self.fallback = tests.into();
        self
    }

    fn tests_for(&self, group: u32) -> &[ZoneTest] {
        self.groups
            .iter()
            .find(|(g, _)| *g == group)
            .map_or(&self.fallback[..], |(_, tests)| &tests[..])
    }

    /// Evaluates the rule for one piece pose. The angle is accepted for
    /// rules that care about orientation; zone tests ignore it.
    pub fn holds(&self, circles: &[Circle], x: f64, y: f64, _a: f64, group: u32) -> bool {
        let point = Point::new(x, y);
        self.tests_for(group).iter().all(|test| {
            circles
                .get(test.circle)
                .is_some_and(|c| c.contains_point(point) == test.inside)
        })
    }

    fn max_circle(&self) -> Option<usize> {
        self.groups
            .iter()
            .flat_map(|(_, tests)| tests)
            .chain(&self.fallback)
            .map(|test| test.circle)
            .max()
    }
}

/// A fully constructed puzzle instance.
#[derive(Clone, Debug)]
pub struct Level {
    id: LevelId,
    circles: Vec<Circle>,
    pub(crate) pieces: Vec<Piece>,
    scrambler: Scrambler,
    win_rule: WinRule,
}

impl Level {
    /// Validates and assembles a level. Every piece starts at its solved pose.
    pub fn new(
        id: LevelId,
        circles: Vec<Circle>,
        pieces: Vec<Piece>,
        scrambler: Scrambler,
        win_rule: WinRule,
    ) -> Result<Self> {
        if circles.is_empty() {
            return Err(Error::InvalidLevel(format!("level {id} has no circles")));
        }
        scrambler.validate(pieces.len())?;
        if let Some(circle) = win_rule.max_circle().filter(|&c| c >= circles.len()) {
            return Err(Error::InvalidLevel(format!(
                "win rule of level {id} references circle {circle}"
            )));
        }
        let mut handles: Vec<_> = pieces.iter().map(|p| p.handle).collect();
        handles.sort_unstable();
        if handles.windows(2).any(|w| w[0] == w[1]) {
            return Err(Error::InvalidLevel(format!("level {id} reuses a shape handle")));
        }
        if let Some(i) = pieces.iter().position(|p| p.pose() != p.solved_pose()) {
            return Err(Error::InvalidLevel(format!(
                "piece {i} of level {id} does not start solved"
            )));
        }
        Ok(Self {
            id,
            circles,
            pieces,
            scrambler,
            win_rule,
        })
    }

    pub fn id(&self) -> LevelId {
        self.id
    }

    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn scrambler(&self) -> &Scrambler {
        &self.scrambler
    }

    pub fn win_rule(&self) -> &WinRule {
        &self.win_rule
    }

    /// Applies the win rule to one piece's current pose.
    pub fn piece_passes(&self, piece: &Piece) -> bool {
        let pose = piece.pose();
        self.win_rule
            .holds(&self.circles, pose.x, pose.y, pose.a, piece.group)
    }

    /// True when every piece passes the win rule.
    pub fn is_solved(&self) -> bool {
        self.pieces.iter().all(|p| self.piece_passes(p))
    }

    pub fn scramble<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.scrambler.scramble(&mut self.pieces, rng);
    }

    pub fn reset_to_solved(&mut self) {
        self.pieces.iter_mut().for_each(Piece::reset_to_solved);
    }

    /// Snapshots every piece, not only those on the circle about to turn.
    pub fn begin_rotation(&mut self) {
        self.pieces.iter_mut().for_each(Piece::begin_rotation);
    }

    /// Turns every piece whose live position lies in `circle` by `delta`
    /// degrees from its snapshot. Returns the indices of the moved pieces.
    pub fn rotate_zone(&mut self, circle: usize, delta: f64) -> Result<Vec<usize>> {
        let zone = self
            .circles
            .get(circle)
            .ok_or(Error::UnknownCircle(circle))?;
        let mut moved = Vec::new();
        for (i, piece) in self.pieces.iter_mut().enumerate() {
            if zone.contains_point(piece.position()) {
                if piece.rotate(zone.center(), delta).is_none() {
                    debug_assert!(false, "piece {i} rotated without begin_rotation");
                    return Err(Error::RotationNotStarted { piece: i });
                }
                moved.push(i);
            }
        }
        Ok(moved)
    }
}

/// Incremental level construction with ring placement of pieces.
pub struct LevelBuilder {
    id: LevelId,
    circles: Vec<Circle>,
    pieces: Vec<Piece>,
}

impl LevelBuilder {
    pub fn new(id: LevelId) -> Self {
        Self {
            id,
            circles: Vec::new(),
            pieces: Vec::new(),
        }
    }

    pub fn circle(mut self, center: Point, radius: f64, steps: u32) -> Result<Self> {
        self.circles.push(Circle::new(center, radius, steps)?);
        Ok(self)
    }

    /// Places `count` pieces around circle `circle`, one symmetry step apart.
    ///
    /// Piece `i` sits at `radius` from the circle center in direction
    /// `start + step * i` with angle `angle + step * i`.
    #[allow(clippy::too_many_arguments)]
    pub fn ring(
        mut self,
        shape: Shape,
        circle: usize,
        count: usize,
        radius: f64,
        start: f64,
        angle: f64,
        group: u32,
    ) -> Result<Self> {
        let around = self
            .circles
            .get(circle)
            .ok_or(Error::UnknownCircle(circle))?;
        let center = around.center();
        let step = around.step_angle();
        for i in 0..count {
            let offset = step * i as f64;
            let handle = ShapeHandle(self.pieces.len() as u32);
            let pose = Pose::at(Point::polar(center, radius, start + offset), angle + offset);
            self.pieces.push(Piece::new(shape, handle, pose, group));
        }
        Ok(self)
    }

    pub fn build(self, scrambler: Scrambler, win_rule: WinRule) -> Result<Level> {
        Level::new(self.id, self.circles, self.pieces, scrambler, win_rule)
    }
}
