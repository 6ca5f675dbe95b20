//! Action point and hit point bookkeeping for worms.

/// Signals raised when a counter reaches zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Depletion {
    /// The worm spent its last action point and its turn is over.
    ActionPoints,
    /// The worm lost its last hit point and is now dead.
    Died,
}

/// Derives the action point and hit point ceiling from a body mass.
///
/// The mass is rounded to the nearest integer and saturates at `u32::MAX`.
/// Negative and NaN masses yield zero.
#[must_use]
pub fn max_points(mass: f64) -> u32 {
    if mass.is_nan() || mass <= 0.0 {
        return 0;
    }
    let rounded = mass.round();
    if rounded >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        rounded as u32
    }
}

/// Current action points, hit points and the alive flag of a worm.
///
/// Ceilings are not stored: they follow from the worm's radius and are passed
/// into every mutation so that growing worms never exceed a stale maximum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Vitality {
    action_points: u32,
    hit_points: u32,
    alive: bool,
}

impl Vitality {
    /// Creates a living worm with both counters at the ceiling.
    pub(crate) const fn full(max: u32) -> Self {
        Self {
            action_points: max,
            hit_points: max,
            alive: max > 0,
        }
    }

    /// Remaining action points.
    #[must_use]
    pub const fn action_points(&self) -> u32 {
        self.action_points
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn hit_points(&self) -> u32 {
        self.hit_points
    }

    /// Reports whether the worm is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Stores a new action point total clamped into `[0, max]`.
    ///
    /// Returns [`Depletion::ActionPoints`] only when the total drops to zero
    /// from a positive value.
    pub(crate) fn set_action_points(&mut self, value: i64, max: u32) -> Option<Depletion> {
        let previous = self.action_points;
        self.action_points = clamp_points(value, max);
        if previous > 0 && self.action_points == 0 {
            Some(Depletion::ActionPoints)
        } else {
            None
        }
    }

    /// Stores a new hit point total clamped into `[0, max]`.
    ///
    /// Reaching zero kills a living worm and returns [`Depletion::Died`].
    pub(crate) fn set_hit_points(&mut self, value: i64, max: u32) -> Option<Depletion> {
        self.hit_points = clamp_points(value, max);
        if self.hit_points == 0 && self.alive {
            self.alive = false;
            Some(Depletion::Died)
        } else {
            None
        }
    }

    /// Re-clamps both counters after the ceiling changed.
    pub(crate) fn clamp_to(&mut self, max: u32) {
        self.action_points = self.action_points.min(max);
        self.hit_points = self.hit_points.min(max);
    }
}

fn clamp_points(value: i64, max: u32) -> u32 {
    u32::try_from(value.clamp(0, i64::from(max))).unwrap_or(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_points_rounds_and_saturates() {
        assert_eq!(max_points(284.7), 285);
        assert_eq!(max_points(69.49), 69);
        assert_eq!(max_points(1.0e300), u32::MAX);
        assert_eq!(max_points(-4.0), 0);
        assert_eq!(max_points(f64::NAN), 0);
    }

    #[test]
    fn setters_clamp_into_range() {
        let mut vitality = Vitality::full(100);
        assert_eq!(vitality.set_action_points(250, 100), None);
        assert_eq!(vitality.action_points(), 100);
        assert_eq!(vitality.set_hit_points(-3, 100), Some(Depletion::Died));
        assert_eq!(vitality.hit_points(), 0);
        assert!(!vitality.is_alive());
    }

    #[test]
    fn action_point_depletion_fires_once() {
        let mut vitality = Vitality::full(10);
        assert_eq!(
            vitality.set_action_points(-1, 10),
            Some(Depletion::ActionPoints)
        );
        assert_eq!(vitality.set_action_points(0, 10), None);
        assert!(vitality.is_alive());
    }

    #[test]
    fn death_is_reported_once() {
        let mut vitality = Vitality::full(10);
        assert_eq!(vitality.set_hit_points(0, 10), Some(Depletion::Died));
        assert_eq!(vitality.set_hit_points(0, 10), None);
    }

    #[test]
    fn clamp_follows_shrinking_ceiling() {
        let mut vitality = Vitality::full(50);
        vitality.clamp_to(20);
        assert_eq!(vitality.action_points(), 20);
        assert_eq!(vitality.hit_points(), 20);
    }
}
