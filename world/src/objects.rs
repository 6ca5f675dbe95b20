//! Game objects placed in a world and the per-kind state they carry.

use worms_core::{
    mass_of, normalize_angle, ConfigurationError, ObjectId, ObjectKind, Position, WeaponKind,
    WorldId, WormSnapshot, FOOD_RADIUS, WORM_MIN_RADIUS,
};

use crate::vitality::{max_points, Depletion, Vitality};

const DEFAULT_ARSENAL: [WeaponKind; 2] = [WeaponKind::Rifle, WeaponKind::Bazooka];

/// Object that may be attached to a world.
///
/// Position and radius are shared by every kind; everything else lives in the
/// [`Body`] variant.
#[derive(Clone, Debug, PartialEq)]
pub struct GameObject {
    world: Option<WorldId>,
    position: Position,
    radius: f64,
    body: Body,
}

/// Kind-specific state of a game object.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// A worm that can act during its turn.
    Worm(WormState),
    /// A ration that makes worms grow when eaten.
    Food,
    /// A projectile in flight.
    Projectile(ProjectileState),
}

/// State of a worm beyond its position and radius.
#[derive(Clone, Debug, PartialEq)]
pub struct WormState {
    name: String,
    direction: f64,
    vitality: Vitality,
    weapons: Vec<WeaponKind>,
    selected_weapon: Option<usize>,
}

/// State of a projectile beyond its position and radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileState {
    weapon: WeaponKind,
    direction: f64,
}

impl GameObject {
    /// Creates a worm at full strength carrying the default arsenal.
    ///
    /// The name must start with an uppercase letter followed by at least one
    /// letter, space, or quote.
    pub fn worm(
        name: impl Into<String>,
        position: Position,
        radius: f64,
        direction: f64,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(ConfigurationError::InvalidName(name));
        }
        validate_position(position)?;
        validate_radius(radius, WORM_MIN_RADIUS)?;

        let state = WormState {
            name,
            direction: normalize_angle(direction),
            vitality: Vitality::full(max_points(mass_of(radius))),
            weapons: DEFAULT_ARSENAL.to_vec(),
            selected_weapon: None,
        };
        Ok(Self {
            world: None,
            position,
            radius,
            body: Body::Worm(state),
        })
    }

    /// Creates a food ration of the fixed food radius.
    pub fn food(position: Position) -> Result<Self, ConfigurationError> {
        validate_position(position)?;
        Ok(Self {
            world: None,
            position,
            radius: FOOD_RADIUS,
            body: Body::Food,
        })
    }

    /// Creates a projectile fired from the provided weapon.
    pub fn projectile(
        position: Position,
        radius: f64,
        weapon: WeaponKind,
        direction: f64,
    ) -> Result<Self, ConfigurationError> {
        validate_position(position)?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ConfigurationError::InvalidRadius {
                radius,
                lower_bound: 0.0,
            });
        }
        Ok(Self {
            world: None,
            position,
            radius,
            body: Body::Projectile(ProjectileState {
                weapon,
                direction: normalize_angle(direction),
            }),
        })
    }

    /// Overrides the starting action points of a worm, clamped to its ceiling.
    #[must_use]
    pub fn with_action_points(mut self, points: u32) -> Self {
        let _ = self.set_action_points(i64::from(points));
        self
    }

    /// Overrides the starting hit points of a worm, clamped to its ceiling.
    #[must_use]
    pub fn with_hit_points(mut self, points: u32) -> Self {
        let _ = self.set_hit_points(i64::from(points));
        self
    }

    /// World the object is attached to, if any.
    #[must_use]
    pub const fn world(&self) -> Option<WorldId> {
        self.world
    }

    /// Center of the object's body.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Radius of the object's body.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Kind-specific state.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Kind tag of the object.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        match self.body {
            Body::Worm(_) => ObjectKind::Worm,
            Body::Food => ObjectKind::Food,
            Body::Projectile(_) => ObjectKind::Projectile,
        }
    }

    /// Mass of the object's spherical body.
    #[must_use]
    pub fn mass(&self) -> f64 {
        mass_of(self.radius)
    }

    /// Ceiling shared by action points and hit points.
    #[must_use]
    pub fn max_points(&self) -> u32 {
        max_points(self.mass())
    }

    /// Worm state, when the object is a worm.
    #[must_use]
    pub const fn as_worm(&self) -> Option<&WormState> {
        match &self.body {
            Body::Worm(worm) => Some(worm),
            _ => None,
        }
    }

    /// Reports whether the body partially overlaps the provided circle.
    #[must_use]
    pub fn overlaps(&self, center: Position, radius: f64) -> bool {
        self.position.distance_to(center) < self.radius + radius
    }

    pub(crate) fn as_worm_mut(&mut self) -> Option<&mut WormState> {
        match &mut self.body {
            Body::Worm(worm) => Some(worm),
            _ => None,
        }
    }

    pub(crate) fn stamp(&mut self, world: Option<WorldId>) {
        self.world = world;
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn set_action_points(&mut self, value: i64) -> Option<Depletion> {
        let max = self.max_points();
        self.as_worm_mut()
            .and_then(|worm| worm.vitality.set_action_points(value, max))
    }

    pub(crate) fn set_hit_points(&mut self, value: i64) -> Option<Depletion> {
        let max = self.max_points();
        self.as_worm_mut()
            .and_then(|worm| worm.vitality.set_hit_points(value, max))
    }

    /// Scales the radius and re-clamps a worm's counters to the new ceiling.
    pub(crate) fn grow(&mut self, factor: f64) {
        self.radius *= factor;
        let max = self.max_points();
        if let Some(worm) = self.as_worm_mut() {
            worm.vitality.clamp_to(max);
        }
    }

    pub(crate) fn snapshot(&self, id: ObjectId, active: bool) -> Option<WormSnapshot> {
        let worm = self.as_worm()?;
        let max = self.max_points();
        Some(WormSnapshot {
            id,
            name: worm.name.clone(),
            position: self.position,
            radius: self.radius,
            direction: worm.direction,
            action_points: worm.vitality.action_points(),
            max_action_points: max,
            hit_points: worm.vitality.hit_points(),
            max_hit_points: max,
            alive: worm.vitality.is_alive(),
            active,
        })
    }
}

impl WormState {
    /// Display name of the worm.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Facing direction in `[0, 2π)`.
    #[must_use]
    pub const fn direction(&self) -> f64 {
        self.direction
    }

    /// Action points, hit points and alive flag.
    #[must_use]
    pub const fn vitality(&self) -> &Vitality {
        &self.vitality
    }

    /// Weapons carried by the worm.
    #[must_use]
    pub fn weapons(&self) -> &[WeaponKind] {
        &self.weapons
    }

    /// Currently selected weapon, if any.
    #[must_use]
    pub fn selected_weapon(&self) -> Option<WeaponKind> {
        self.selected_weapon
            .and_then(|index| self.weapons.get(index).copied())
    }

    pub(crate) fn set_direction(&mut self, direction: f64) {
        self.direction = normalize_angle(direction);
    }

    /// Selects the first weapon, if the worm carries any.
    pub(crate) fn select_first_weapon(&mut self) {
        self.selected_weapon = if self.weapons.is_empty() { None } else { Some(0) };
    }

    /// Advances the selection to the next weapon, wrapping around.
    pub(crate) fn select_next_weapon(&mut self) -> Option<WeaponKind> {
        if self.weapons.is_empty() {
            return None;
        }
        let next = self
            .selected_weapon
            .map_or(0, |index| (index + 1) % self.weapons.len());
        self.selected_weapon = Some(next);
        self.weapons.get(next).copied()
    }
}

impl ProjectileState {
    /// Weapon that fired the projectile.
    #[must_use]
    pub const fn weapon(&self) -> WeaponKind {
        self.weapon
    }

    /// Direction of flight in `[0, 2π)`.
    #[must_use]
    pub const fn direction(&self) -> f64 {
        self.direction
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut characters = name.chars();
    let Some(first) = characters.next() else {
        return false;
    };
    let rest = characters.as_str();
    first.is_ascii_uppercase()
        && !rest.is_empty()
        && rest.chars().all(|character| {
            character.is_ascii_alphabetic() || matches!(character, ' ' | '\'' | '"')
        })
}

fn validate_position(position: Position) -> Result<(), ConfigurationError> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::NonFinitePosition {
            x: position.x(),
            y: position.y(),
        })
    }
}

fn validate_radius(radius: f64, lower_bound: f64) -> Result<(), ConfigurationError> {
    if radius.is_finite() && radius >= lower_bound {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidRadius {
            radius,
            lower_bound,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn worm() -> GameObject {
        GameObject::worm("Jim", Position::new(5.0, 5.0), 0.4, 0.0).expect("valid worm")
    }

    #[test]
    fn worms_start_at_full_strength() {
        let worm = worm();
        let state = worm.as_worm().expect("worm body");
        assert_eq!(worm.max_points(), 285);
        assert_eq!(state.vitality().action_points(), 285);
        assert_eq!(state.vitality().hit_points(), 285);
        assert!(state.vitality().is_alive());
        assert_eq!(state.selected_weapon(), None);
        assert_eq!(worm.world(), None);
    }

    #[test]
    fn worm_names_follow_capitalised_pattern() {
        let position = Position::new(1.0, 1.0);
        assert!(GameObject::worm("James o'Hara", position, 0.5, 0.0).is_ok());
        assert!(GameObject::worm("Jo \"Slim\"", position, 0.5, 0.0).is_ok());
        assert!(GameObject::worm("J", position, 0.5, 0.0).is_err());
        assert!(GameObject::worm("jim", position, 0.5, 0.0).is_err());
        assert!(GameObject::worm("Jim2", position, 0.5, 0.0).is_err());
    }

    #[test]
    fn worm_radius_respects_lower_bound() {
        let position = Position::new(1.0, 1.0);
        let result = GameObject::worm("Jim", position, 0.2, 0.0);
        assert_eq!(
            result,
            Err(ConfigurationError::InvalidRadius {
                radius: 0.2,
                lower_bound: WORM_MIN_RADIUS,
            })
        );
        assert!(GameObject::worm("Jim", position, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn constructors_reject_non_finite_positions() {
        assert!(GameObject::food(Position::new(f64::INFINITY, 0.0)).is_err());
        assert!(GameObject::worm("Jim", Position::new(0.0, f64::NAN), 0.5, 0.0).is_err());
    }

    #[test]
    fn direction_is_normalised_on_creation() {
        let worm = GameObject::worm("Jim", Position::new(1.0, 1.0), 0.5, -PI / 2.0)
            .expect("valid worm");
        let direction = worm.as_worm().expect("worm body").direction();
        assert!((direction - 1.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn weapon_selection_cycles() {
        let mut worm = worm();
        let state = worm.as_worm_mut().expect("worm body");
        assert_eq!(state.select_next_weapon(), Some(WeaponKind::Rifle));
        assert_eq!(state.select_next_weapon(), Some(WeaponKind::Bazooka));
        assert_eq!(state.select_next_weapon(), Some(WeaponKind::Rifle));
        state.select_first_weapon();
        assert_eq!(state.selected_weapon(), Some(WeaponKind::Rifle));
    }

    #[test]
    fn growing_raises_the_ceiling_without_refilling() {
        let mut worm = worm().with_action_points(20);
        let before = worm.max_points();
        worm.grow(1.1);
        assert!(worm.max_points() > before);
        let state = worm.as_worm().expect("worm body");
        assert_eq!(state.vitality().action_points(), 20);
    }

    #[test]
    fn overlap_is_strict() {
        let food = GameObject::food(Position::new(1.0, 1.0)).expect("valid food");
        assert!(food.overlaps(Position::new(1.5, 1.0), 0.31));
        assert!(!food.overlaps(Position::new(1.5, 1.0), 0.29));
        assert_eq!(food.kind(), ObjectKind::Food);
    }

    #[test]
    fn projectiles_need_positive_radius() {
        let position = Position::new(1.0, 1.0);
        assert!(GameObject::projectile(position, 0.0, WeaponKind::Rifle, 0.0).is_err());
        let projectile =
            GameObject::projectile(position, 0.05, WeaponKind::Bazooka, 1.0).expect("valid");
        assert_eq!(projectile.kind(), ObjectKind::Projectile);
        assert!(projectile.as_worm().is_none());
    }
}
