//! Sampled passability and adjacency queries against the terrain grid.
//!
//! Circles are never intersected analytically with the grid. Instead the
//! scans walk the ring between two radii at the resolution of a single pixel
//! and mirror every sample into the selected quadrants. A sample outside the
//! world counts as blocked.

use std::iter;

use worms_core::{Position, QuadrantMask, ADJACENCY_MARGIN};

use crate::terrain::Terrain;

/// Reports whether every sample of the annulus between the radii is passable.
///
/// An inner radius that is not below the outer radius selects the full disc.
/// Returns `false` as soon as one sample in a selected quadrant lands on an
/// impassable pixel or outside the world.
#[must_use]
pub fn scan_annulus(
    terrain: &Terrain,
    center: Position,
    outer_radius: f64,
    inner_radius: f64,
    mask: QuadrantMask,
) -> bool {
    if !center.is_finite() || !outer_radius.is_finite() {
        return false;
    }

    let outer = outer_radius.max(0.0);
    let inner = if inner_radius.is_finite() && inner_radius < outer {
        inner_radius.max(0.0)
    } else {
        0.0
    };

    let pixel_width = terrain.pixel_width();
    let pixel_height = terrain.pixel_height();
    for dx in stepped(0.0, outer, pixel_width) {
        let low = circle_height(inner, dx);
        let high = circle_height(outer, dx);
        for dy in stepped(low, high, pixel_height) {
            for quadrant in mask.iter() {
                let (sign_x, sign_y) = quadrant.signs();
                if terrain.is_blocked(center.offset(sign_x * dx, sign_y * dy)) {
                    return false;
                }
            }
        }
    }
    true
}

/// Reports whether the full disc lies on passable terrain inside the world.
#[must_use]
pub fn is_passable(terrain: &Terrain, center: Position, radius: f64) -> bool {
    scan_annulus(terrain, center, radius, 0.0, QuadrantMask::ALL)
}

/// Reports whether a passable disc touches impassable terrain within a thin margin.
///
/// The margin spans from `radius` to `radius * ADJACENCY_MARGIN` and is only
/// inspected in the quadrants selected by the mask.
#[must_use]
pub fn is_adjacent_to_impassable_terrain(
    terrain: &Terrain,
    center: Position,
    radius: f64,
    mask: QuadrantMask,
) -> bool {
    is_passable(terrain, center, radius)
        && !scan_annulus(terrain, center, radius * ADJACENCY_MARGIN, radius, mask)
}

/// Reports whether the body rests on solid ground.
#[must_use]
pub fn is_adjacent_to_floor(terrain: &Terrain, center: Position, radius: f64) -> bool {
    is_adjacent_to_impassable_terrain(terrain, center, radius, QuadrantMask::LOWER)
}

/// Reports whether the body touches solid terrain above it.
#[must_use]
pub fn is_adjacent_to_ceiling(terrain: &Terrain, center: Position, radius: f64) -> bool {
    is_adjacent_to_impassable_terrain(terrain, center, radius, QuadrantMask::UPPER)
}

/// Vertical half-extent of a circle at the provided horizontal offset.
fn circle_height(radius: f64, dx: f64) -> f64 {
    (radius * radius - dx * dx).max(0.0).sqrt()
}

/// Values `start, start + step, ...` strictly below `end`, followed by `end` itself.
fn stepped(start: f64, end: f64, step: f64) -> impl Iterator<Item = f64> {
    (0_u64..)
        .map(move |index| start + index as f64 * step)
        .take_while(move |value| *value < end)
        .chain(iter::once(end))
}
