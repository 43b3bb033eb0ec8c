//! Built-in levels.
//!
//! Pieces are listed shape by shape so each scramble group is a contiguous
//! index range: all pieces of one shape are interchangeable, whatever their
//! win group.

use std::f64::consts::SQRT_2;

use crate::error::Result;
use crate::geometry::{sind, Point};
use crate::level::{Level, LevelBuilder, LevelId, WinRule, ZoneTest};
use crate::pieces::{Shape, Tint};
use crate::scramble::Scrambler;

const SQRT_3: f64 = 1.732_050_807_568_877_2;
const SQRT_6: f64 = 2.449_489_742_783_178;

/// Source of fully constructed levels.
pub trait LevelRegistry {
    /// Builds level `id`, or `None` if there is no such level.
    fn load(&self, id: LevelId) -> Option<Level>;

    /// Ids this registry can build, ascending.
    fn ids(&self) -> Vec<LevelId>;
}

/// The levels shipped with the crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct Catalog;

pub const LEVEL_IDS: &[LevelId] = &[1, 2, 3];

impl LevelRegistry for Catalog {
    fn load(&self, id: LevelId) -> Option<Level> {
        let built = match id {
            1 => twin_shields(),
            2 => lens_pair(),
            3 => three_rings(),
            _ => return None,
        };
        // the catalog is static data, so a build failure is a bug in this file
        match built {
            Ok(level) => Some(level),
            Err(e) => {
                tracing::error!(level = id, error = %e, "built-in level is invalid");
                None
            }
        }
    }

    fn ids(&self) -> Vec<LevelId> {
        LEVEL_IDS.to_vec()
    }
}

/// Two 6-step disks overlapping in a lens.
fn twin_shields() -> Result<Level> {
    let r = 250.0;
    let shield = |tint| Shape::new("shield-4", tint);
    let pillow = |tint| Shape::new("pillow-4", tint);
    let hex = |tint| Shape::new("hex-4", tint);

    LevelBuilder::new(1)
        .circle(Point::new(-r / SQRT_2, 0.0), r, 6)?
        .circle(Point::new(r / SQRT_2, 0.0), r, 6)?
        .ring(shield(Tint::Red), 0, 4, SQRT_6 / 3.0 * r, 90.0, 60.0, 0)?
        .ring(shield(Tint::Green), 1, 4, SQRT_6 / 3.0 * r, -90.0, 0.0, 1)?
        .ring(shield(Tint::Yellow), 1, 2, SQRT_6 / 3.0 * r, 150.0, 0.0, 2)?
        .ring(pillow(Tint::Red), 0, 5, r / SQRT_2, 60.0, 60.0, 0)?
        .ring(pillow(Tint::Green), 1, 5, r / SQRT_2, -120.0, 60.0, 1)?
        .ring(pillow(Tint::Yellow), 0, 1, r / SQRT_2, 0.0, 0.0, 2)?
        .ring(hex(Tint::Red), 0, 1, 0.0, 0.0, 0.0, 0)?
        .ring(hex(Tint::Green), 1, 1, 0.0, 0.0, 0.0, 1)?
        .build(
            Scrambler::new([10, 11, 1, 1]),
            WinRule::new()
                .group(0, [ZoneTest::inside(0), ZoneTest::outside(1)])
                .group(1, [ZoneTest::inside(1), ZoneTest::outside(0)])
                .otherwise([ZoneTest::inside(0), ZoneTest::inside(1)]),
        )
}

/// Two 6-step disks, each centered on the other's rim.
fn lens_pair() -> Result<Level> {
    let r = 300.0;
    let lens = |tint| Shape::new("lens-6", tint);
    let tri = |tint| Shape::new("tri-6", tint);

    LevelBuilder::new(2)
        .circle(Point::new(-r / 2.0, 0.0), r, 6)?
        .circle(Point::new(r / 2.0, 0.0), r, 6)?
        .ring(lens(Tint::Cyan), 1, 6, r / 2.0, 0.0, 90.0, 0)?
        .ring(lens(Tint::Cyan), 1, 6, r / 2.0 * SQRT_3, 30.0, 30.0, 0)?
        .ring(lens(Tint::Blue), 0, 3, r / 2.0, 120.0, 210.0, 1)?
        .ring(lens(Tint::Blue), 0, 4, r / 2.0 * SQRT_3, 90.0, 90.0, 1)?
        .ring(tri(Tint::Cyan), 1, 6, r / 2.0, -30.0, 0.0, 0)?
        .ring(tri(Tint::Blue), 0, 4, r / 2.0, 90.0, 120.0, 1)?
        .build(
            Scrambler::new([19, 10]),
            WinRule::new()
                .group(0, [ZoneTest::inside(1)])
                .otherwise([ZoneTest::outside(1)]),
        )
}

/// A large 6-step disk with two small 3-step disks cutting into it.
fn three_rings() -> Result<Level> {
    let r = 300.0;
    let rs = 2.0 * r * sind(15.0);
    let lens = |tint| Shape::new("lens-12", tint);
    let rocket = |tint| Shape::new("rocket-12", tint);
    let mushroom = |tint| Shape::new("mushroom-12", tint);

    // rockets of the big disk sit between the two small disks
    let gap = (r - rs) / 2.0;
    let rocket_radius = (r * r * 0.75 + gap * gap).sqrt();
    let rocket_start = (r * 0.75 - gap / 2.0)
        .atan2(r * SQRT_3 / 4.0 + gap * SQRT_3 / 2.0)
        .to_degrees();

    LevelBuilder::new(3)
        .circle(Point::new(r * SQRT_3 / 2.0, -r / 2.0), rs, 3)?
        .circle(Point::new(-r * SQRT_3 / 2.0, -r / 2.0), rs, 3)?
        .circle(Point::ORIGIN, r, 6)?
        .ring(lens(Tint::Orange), 0, 3, r / 2.0, 90.0, 90.0, 0)?
        .ring(lens(Tint::Purple), 1, 3, r / 2.0, 90.0, 90.0, 1)?
        .ring(lens(Tint::White), 2, 2, r / 2.0 * SQRT_3, 60.0, -30.0, 2)?
        .ring(rocket(Tint::Orange), 0, 3, rs / 2.0, -30.0, -120.0, 0)?
        .ring(rocket(Tint::Purple), 1, 3, rs / 2.0, -30.0, -120.0, 1)?
        .ring(rocket(Tint::White), 2, 3, rocket_radius, rocket_start, 60.0, 2)?
        .ring(rocket(Tint::White), 2, 1, rocket_radius, rocket_start - 120.0, -60.0, 2)?
        .ring(rocket(Tint::White), 2, 3, rocket_radius, 60.0 - rocket_start, 180.0, 2)?
        .ring(rocket(Tint::White), 2, 1, rocket_radius, -60.0 - rocket_start, 60.0, 2)?
        .ring(mushroom(Tint::Orange), 0, 3, rs / 2.0, 30.0, 120.0, 0)?
        .ring(mushroom(Tint::Purple), 1, 3, rs / 2.0, 30.0, 120.0, 1)?
        .ring(mushroom(Tint::White), 2, 3, r - rs / 2.0, 30.0, -60.0, 2)?
        .ring(mushroom(Tint::White), 2, 1, r - rs / 2.0, -90.0, 180.0, 2)?
        .build(
            Scrambler::new([8, 14, 10]),
            WinRule::new()
                .group(0, [ZoneTest::inside(0)])
                .group(1, [ZoneTest::inside(1)])
                .otherwise([ZoneTest::outside(0), ZoneTest::outside(1)]),
        )
}

/// Formats a level as a table of circles and piece counts per shape.
pub fn format_level(level: &Level) -> String {
    let mut output = format!("Level {}\n", level.id());
    for (i, circle) in level.circles().iter().enumerate() {
        let center = circle.center();
        output.push_str(&format!(
            "circle {i}: center ({:.1}, {:.1}) radius {:.1} steps {}\n",
            center.x,
            center.y,
            circle.outer_radius(),
            circle.steps()
        ));
    }
    let mut start = 0;
    for (g, size) in level.scrambler().group_sizes().iter().enumerate() {
        let name = level.pieces()[start].shape.name;
        output.push_str(&format!("group {g}: {size} x {name}\n"));
        start += size;
    }
    output
}
