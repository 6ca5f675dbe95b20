//! Worm actions and the action point economy that pays for them.

use std::f64::consts::{PI, TAU};

use tracing::{debug, info};
use worms_core::{
    mass_of, normalize_angle, Event, IllegalStateError, ObjectId, ObjectKind, OwnershipError,
    Position, QuadrantMask, Tuning, WorldError, ADJACENCY_MARGIN,
};

use crate::{
    geometry::{is_adjacent_to_floor, is_adjacent_to_impassable_terrain, is_passable},
    objects::{GameObject, WormState},
    terrain::Terrain,
    vitality::Depletion,
    World,
};

/// Slack added before flooring the number of fan headings.
const ANGLE_EPSILON: f64 = 1e-9;
/// Wrapping residue, relative to the turned angle, that still counts as whole revolutions.
const REVOLUTION_RESIDUE: f64 = 4.0 * f64::EPSILON;
/// Relative rounding noise tolerated before a cost is rounded up to the next point.
const COST_TOLERANCE: f64 = 1e-9;
/// Action points charged for a full revolution.
const TURN_COST_PER_REVOLUTION: f64 = 60.0;
/// Upper bound on the number of samples traced along a jump.
const MAX_JUMP_SAMPLES: f64 = 100_000.0;

/// Action points charged for turning by the provided angle.
///
/// The angle is wrapped into `[0, 2π)` and reflected into `[0, π]`, so a
/// quarter turn either way costs 15 points and a half turn costs 30. Only
/// whole revolutions are free; any other rotation costs at least one point.
#[must_use]
pub fn turn_cost(angle: f64) -> u32 {
    let normalized = normalize_angle(angle);
    let effective = if normalized > PI {
        TAU - normalized
    } else {
        normalized
    };
    if effective <= REVOLUTION_RESIDUE * angle.abs().max(TAU) {
        return 0;
    }
    let raw = TURN_COST_PER_REVOLUTION / (TAU / effective);
    (raw * (1.0 - COST_TOLERANCE)).ceil() as u32
}

/// Action points charged for a step along the displacement between two points.
///
/// Climbing is four times as expensive as walking on level ground.
#[must_use]
pub fn step_cost(from: Position, to: Position) -> u32 {
    let slope = (to.y() - from.y()).atan2(to.x() - from.x());
    (slope.cos().abs() + 4.0 * slope.sin().abs() - COST_TOLERANCE).ceil() as u32
}

#[derive(Clone, Copy, Debug)]
struct Step {
    to: Position,
    cost: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Footing {
    Landed,
    Open,
    Blocked,
    OffWorld,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Descent {
    Landed(Position),
    Lost,
}

pub(crate) fn activate(
    world: &mut World,
    id: ObjectId,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    let bonus = i64::from(world.tuning.activation_hit_point_bonus);
    let object = lookup_mut(world, id)?;
    let (alive, hit_points) = worm_counters(object);
    if !alive {
        return Err(IllegalStateError::Dead(id).into());
    }

    let max = object.max_points();
    let _ = object.set_action_points(i64::from(max));
    let _ = object.set_hit_points(i64::from(hit_points) + bonus);
    if let Some(worm) = object.as_worm_mut() {
        worm.select_first_weapon();
    }

    world.active = Some(id);
    info!(worm = id.get(), action_points = max, "worm_activated");
    out_events.push(Event::WormActivated { worm: id });
    Ok(())
}

pub(crate) fn can_turn(world: &World, id: ObjectId, angle: f64) -> Result<bool, WorldError> {
    let (_, worm) = lookup(world, id)?;
    Ok(angle.is_finite()
        && worm.vitality().is_alive()
        && worm.vitality().action_points() >= turn_cost(angle))
}

pub(crate) fn turn(
    world: &mut World,
    id: ObjectId,
    angle: f64,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    if !can_turn(world, id, angle)? {
        return Err(IllegalStateError::CannotTurn(id).into());
    }

    let cost = turn_cost(angle);
    let object = lookup_mut(world, id)?;
    let direction = match object.as_worm_mut() {
        Some(worm) => {
            worm.set_direction(worm.direction() + angle);
            worm.direction()
        }
        None => return Err(IllegalStateError::NotAWorm(id).into()),
    };
    debug!(worm = id.get(), direction, cost, "worm_turned");
    out_events.push(Event::WormTurned {
        worm: id,
        direction,
        cost,
    });
    spend_action_points(world, id, cost, out_events)
}

pub(crate) fn can_move(world: &World, id: ObjectId) -> Result<bool, WorldError> {
    Ok(plan_step(world, id)?.is_some())
}

pub(crate) fn move_worm(
    world: &mut World,
    id: ObjectId,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    let step = plan_step(world, id)?.ok_or(IllegalStateError::CannotMove(id))?;
    let from = relocate(world, id, step.to)?;
    debug!(worm = id.get(), cost = step.cost, "worm_moved");
    out_events.push(Event::WormMoved {
        worm: id,
        from,
        to: step.to,
        cost: step.cost,
    });

    if can_fall(world, id)? {
        fall(world, id, out_events)?;
    }
    if is_standing(world, id) {
        spend_action_points(world, id, step.cost, out_events)?;
        eat(world, id, out_events)?;
    }
    Ok(())
}

pub(crate) fn can_fall(world: &World, id: ObjectId) -> Result<bool, WorldError> {
    let (object, worm) = lookup(world, id)?;
    Ok(worm.vitality().is_alive()
        && !is_adjacent_to_floor(&world.terrain, object.position(), object.radius()))
}

pub(crate) fn fall(
    world: &mut World,
    id: ObjectId,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    if !can_fall(world, id)? {
        return Err(IllegalStateError::CannotFall(id).into());
    }

    let (object, _) = lookup(world, id)?;
    let from = object.position();
    let radius = object.radius();
    match descend(
        &world.terrain,
        from,
        radius,
        world.tuning.fall_refinement_steps,
    ) {
        Descent::Landed(to) => {
            let damage = fall_damage(from.y() - to.y(), world.tuning.fall_damage_per_unit);
            let object = lookup_mut(world, id)?;
            object.set_position(to);
            let (_, hit_points) = worm_counters(object);
            let depletion = object.set_hit_points(i64::from(hit_points) - i64::from(damage));
            debug!(worm = id.get(), distance = from.y() - to.y(), damage, "worm_fell");
            out_events.push(Event::WormFell {
                worm: id,
                from,
                to,
                damage,
            });
            record_depletion(world, id, depletion, out_events);
            if is_standing(world, id) {
                eat(world, id, out_events)?;
            }
        }
        Descent::Lost => {
            let depletion = lookup_mut(world, id)?.set_hit_points(0);
            record_depletion(world, id, depletion, out_events);
            let _ = world.detach(id)?;
            info!(worm = id.get(), "worm_fell_off_world");
            out_events.push(Event::WormFellOffWorld { worm: id });
        }
    }
    Ok(())
}

pub(crate) fn can_jump(world: &World, id: ObjectId, time_step: f64) -> Result<bool, WorldError> {
    Ok(plan_jump(world, id, time_step)?.is_some())
}

pub(crate) fn jump(
    world: &mut World,
    id: ObjectId,
    time_step: f64,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    let to = plan_jump(world, id, time_step)?.ok_or(IllegalStateError::CannotJump(id))?;
    let from = relocate(world, id, to)?;
    debug!(worm = id.get(), distance = from.distance_to(to), "worm_jumped");
    out_events.push(Event::WormJumped { worm: id, from, to });

    if can_fall(world, id)? {
        fall(world, id, out_events)?;
    }
    if is_standing(world, id) {
        let depletion = lookup_mut(world, id)?.set_action_points(0);
        record_depletion(world, id, depletion, out_events);
        eat(world, id, out_events)?;
    }
    Ok(())
}

pub(crate) fn select_next_weapon(
    world: &mut World,
    id: ObjectId,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    let object = lookup_mut(world, id)?;
    let (alive, _) = worm_counters(object);
    if !alive {
        return Err(IllegalStateError::Dead(id).into());
    }
    if let Some(weapon) = object.as_worm_mut().and_then(WormState::select_next_weapon) {
        out_events.push(Event::WeaponSelected { worm: id, weapon });
    }
    Ok(())
}

/// Consumes every food ration overlapping the worm's body.
fn eat(world: &mut World, id: ObjectId, out_events: &mut Vec<Event>) -> Result<(), WorldError> {
    let (object, _) = lookup(world, id)?;
    let meals = world
        .objects
        .overlapping(ObjectKind::Food, object.position(), object.radius());
    let growth = 1.0 + world.tuning.food_growth;

    for food in meals {
        let _ = world.detach(food)?;
        let object = lookup_mut(world, id)?;
        object.grow(growth);
        let radius = object.radius();
        debug!(worm = id.get(), food = food.get(), radius, "food_eaten");
        out_events.push(Event::FoodEaten {
            worm: id,
            food,
            radius,
        });
    }
    Ok(())
}

fn plan_step(world: &World, id: ObjectId) -> Result<Option<Step>, WorldError> {
    let (object, worm) = lookup(world, id)?;
    let action_points = worm.vitality().action_points();
    if !worm.vitality().is_alive() || action_points == 0 {
        return Ok(None);
    }

    let from = object.position();
    let Some(to) = find_step(
        &world.terrain,
        &world.tuning,
        from,
        object.radius(),
        worm.direction(),
    ) else {
        return Ok(None);
    };

    let cost = step_cost(from, to);
    Ok((cost <= action_points).then_some(Step { to, cost }))
}

/// Picks the landing spot of a step.
///
/// Footing candidates win over merely passable ones; within each class the
/// first candidate in fan order is taken.
fn find_step(
    terrain: &Terrain,
    tuning: &Tuning,
    from: Position,
    radius: f64,
    direction: f64,
) -> Option<Position> {
    let candidates = step_candidates(terrain, tuning, from, radius, direction);
    candidates
        .iter()
        .copied()
        .find(|candidate| is_adjacent_to_floor(terrain, *candidate, radius))
        .or_else(|| {
            candidates
                .iter()
                .copied()
                .find(|candidate| is_passable(terrain, *candidate, radius))
        })
}

/// Candidate positions ordered by divergence from the facing direction, then by distance.
fn step_candidates(
    terrain: &Terrain,
    tuning: &Tuning,
    from: Position,
    radius: f64,
    direction: f64,
) -> Vec<Position> {
    let angular_step = tuning.move_angular_step;
    let fan_steps = if angular_step.is_finite() && angular_step > 0.0 {
        (tuning.move_fan_half_angle / angular_step + ANGLE_EPSILON).floor() as u32
    } else {
        0
    };
    let radial_step =
        tuning.move_radial_step_pixels * terrain.pixel_width().min(terrain.pixel_height());
    let distance_steps = if radial_step.is_finite() && radial_step > 0.0 {
        ((radius - tuning.min_move_distance) / radial_step).floor().max(0.0) as u32
    } else {
        0
    };

    let mut candidates = Vec::new();
    for fan_index in 0..=fan_steps {
        let divergence = f64::from(fan_index) * angular_step;
        let headings = if fan_index == 0 {
            vec![direction]
        } else {
            vec![direction + divergence, direction - divergence]
        };
        for heading in headings {
            for distance_index in 0..=distance_steps {
                let distance = radius - f64::from(distance_index) * radial_step;
                if distance < tuning.min_move_distance {
                    break;
                }
                candidates.push(from.offset(distance * heading.cos(), distance * heading.sin()));
            }
        }
    }
    candidates
}

fn footing(terrain: &Terrain, position: Position, radius: f64) -> Footing {
    if !terrain.is_located_in_world(position, radius * ADJACENCY_MARGIN) {
        Footing::OffWorld
    } else if !is_passable(terrain, position, radius) {
        Footing::Blocked
    } else if is_adjacent_to_floor(terrain, position, radius) {
        Footing::Landed
    } else {
        Footing::Open
    }
}

/// Drops a body straight down until it rests on the floor.
///
/// Descends a pixel at a time until the next pixel would be blocked, then
/// creeps down from the last open height in fine steps to settle on the floor.
fn descend(terrain: &Terrain, start: Position, radius: f64, refinement_steps: u32) -> Descent {
    let pixel_height = terrain.pixel_height();
    let coarse_steps = (start.y() / pixel_height).ceil().max(0.0) as u64 + 2;

    let mut base = start;
    let mut obstructed = false;
    for index in 1..=coarse_steps {
        let candidate = start.offset(0.0, -(index as f64) * pixel_height);
        match footing(terrain, candidate, radius) {
            Footing::Landed => return Descent::Landed(candidate),
            Footing::Open => base = candidate,
            Footing::Blocked | Footing::OffWorld => {
                obstructed = true;
                break;
            }
        }
    }
    if !obstructed {
        return Descent::Lost;
    }

    let fine_step = pixel_height.min(0.1 * radius) / f64::from(refinement_steps.max(1));
    let fine_steps = (pixel_height / fine_step).ceil() as u64 + 2;
    for index in 1..=fine_steps {
        let candidate = base.offset(0.0, -(index as f64) * fine_step);
        match footing(terrain, candidate, radius) {
            Footing::Landed => return Descent::Landed(candidate),
            Footing::Open => {}
            Footing::Blocked | Footing::OffWorld => return Descent::Lost,
        }
    }
    Descent::Lost
}

/// Where a body dropped from the start position comes to rest, if anywhere.
pub(crate) fn landing_below(
    terrain: &Terrain,
    tuning: &Tuning,
    start: Position,
    radius: f64,
) -> Option<Position> {
    match descend(terrain, start, radius, tuning.fall_refinement_steps) {
        Descent::Landed(landing) => Some(landing),
        Descent::Lost => None,
    }
}

fn fall_damage(distance: f64, damage_per_unit: f64) -> u32 {
    // float-to-int casts saturate and map NaN to zero
    (distance * damage_per_unit).max(0.0).round() as u32
}

fn plan_jump(world: &World, id: ObjectId, time_step: f64) -> Result<Option<Position>, WorldError> {
    let (object, worm) = lookup(world, id)?;
    let action_points = worm.vitality().action_points();
    if !worm.vitality().is_alive()
        || action_points == 0
        || !time_step.is_finite()
        || time_step <= 0.0
    {
        return Ok(None);
    }

    let start = object.position();
    let radius = object.radius();
    let endpoint = trajectory_endpoint(
        &world.terrain,
        &world.tuning,
        start,
        radius,
        worm.direction(),
        action_points,
        time_step,
    );
    Ok((endpoint.distance_to(start) >= radius).then_some(endpoint))
}

/// Traces the ballistic arc of a jump and returns where it ends.
///
/// The arc ends at the first sample touching terrain at least one radius away
/// from the start, or at the last open sample before the body would leave the
/// world or enter solid terrain.
fn trajectory_endpoint(
    terrain: &Terrain,
    tuning: &Tuning,
    start: Position,
    radius: f64,
    direction: f64,
    action_points: u32,
    time_step: f64,
) -> Position {
    let mass = mass_of(radius);
    let force =
        tuning.jump_force_per_action_point * f64::from(action_points) + mass * tuning.gravity;
    let speed = force / mass * tuning.jump_thrust_duration;
    let velocity_x = speed * direction.cos();
    let velocity_y = speed * direction.sin();

    let step = time_step.max(tuning.max_jump_duration / MAX_JUMP_SAMPLES);
    let sample_count = (tuning.max_jump_duration / step).floor() as u64;

    let mut previous = start;
    for index in 1..=sample_count {
        let t = index as f64 * step;
        let sample = start.offset(
            velocity_x * t,
            velocity_y * t - 0.5 * tuning.gravity * t * t,
        );
        if !terrain.is_located_in_world(sample, radius) || !is_passable(terrain, sample, radius) {
            return previous;
        }
        if sample.distance_to(start) >= radius
            && is_adjacent_to_impassable_terrain(terrain, sample, radius, QuadrantMask::ALL)
        {
            return sample;
        }
        previous = sample;
    }
    previous
}

fn relocate(world: &mut World, id: ObjectId, to: Position) -> Result<Position, WorldError> {
    let object = lookup_mut(world, id)?;
    let from = object.position();
    object.set_position(to);
    Ok(from)
}

fn spend_action_points(
    world: &mut World,
    id: ObjectId,
    cost: u32,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    let object = lookup_mut(world, id)?;
    let remaining = object
        .as_worm()
        .map_or(0, |worm| worm.vitality().action_points());
    let depletion = object.set_action_points(i64::from(remaining) - i64::from(cost));
    record_depletion(world, id, depletion, out_events);
    Ok(())
}

/// Translates a vitality transition into events and releases the turn of a dead worm.
fn record_depletion(
    world: &mut World,
    id: ObjectId,
    depletion: Option<Depletion>,
    out_events: &mut Vec<Event>,
) {
    match depletion {
        Some(Depletion::ActionPoints) => {
            debug!(worm = id.get(), "action_points_depleted");
            out_events.push(Event::ActionPointsDepleted { worm: id });
        }
        Some(Depletion::Died) => {
            if world.active == Some(id) {
                world.active = None;
            }
            info!(worm = id.get(), "worm_died");
            out_events.push(Event::WormDied { worm: id });
        }
        None => {}
    }
}

fn is_standing(world: &World, id: ObjectId) -> bool {
    world
        .objects
        .get(id)
        .and_then(GameObject::as_worm)
        .is_some_and(|worm| worm.vitality().is_alive())
}

fn worm_counters(object: &GameObject) -> (bool, u32) {
    object.as_worm().map_or((false, 0), |worm| {
        (worm.vitality().is_alive(), worm.vitality().hit_points())
    })
}

pub(crate) fn lookup(
    world: &World,
    id: ObjectId,
) -> Result<(&GameObject, &WormState), WorldError> {
    let object = world
        .objects
        .get(id)
        .ok_or(OwnershipError::NotAMember(id))?;
    let worm = object.as_worm().ok_or(IllegalStateError::NotAWorm(id))?;
    Ok((object, worm))
}

fn lookup_mut(world: &mut World, id: ObjectId) -> Result<&mut GameObject, WorldError> {
    let object = world
        .objects
        .get_mut(id)
        .ok_or(OwnershipError::NotAMember(id))?;
    if object.as_worm().is_none() {
        return Err(IllegalStateError::NotAWorm(id).into());
    }
    Ok(object)
}
