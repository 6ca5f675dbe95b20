use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use worms_core::{
    Command, Event, IllegalStateError, ObjectId, ObjectKind, OwnershipError, Position,
    WeaponKind, WorldDimensions, WorldError,
};
use worms_world::{self as world, is_adjacent_to_floor, query, GameObject, PassableMap, World};

fn floor_world(width: usize, height: usize) -> World {
    let map = PassableMap::from_fn(width, height, |cell| cell.row() > 0).expect("valid map");
    World::new(
        WorldDimensions::new(width as f64, height as f64).expect("dimensions"),
        map,
    )
}

fn worm_at(name: &str, x: f64, y: f64, radius: f64) -> GameObject {
    GameObject::worm(name, Position::new(x, y), radius, 0.0).expect("valid worm")
}

fn snapshot(world: &World, id: ObjectId) -> worms_core::WormSnapshot {
    query::worm_view(world)
        .get(id)
        .cloned()
        .expect("worm attached")
}

fn run(world: &mut World, command: Command) -> Result<Vec<Event>, WorldError> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events)?;
    Ok(events)
}

fn landed(world: &mut World, id: ObjectId) {
    if query::can_fall(world, id).expect("worm attached") {
        let _ = run(world, Command::Fall { worm: id }).expect("fall");
    }
}

#[test]
fn falling_onto_the_floor_costs_hit_points() {
    let mut world = floor_world(10, 10);
    let worm = world
        .attach(worm_at("Jim", 5.0, 5.0, 0.4).with_action_points(20))
        .expect("attach");

    assert_eq!(query::can_fall(&world, worm), Ok(true));
    let events = run(&mut world, Command::Fall { worm }).expect("fall");

    let after = snapshot(&world, worm);
    assert!(
        after.position.y() > 1.35 && after.position.y() < 1.5,
        "rests at {}",
        after.position.y()
    );
    assert!((after.position.x() - 5.0).abs() < 1e-12);
    assert_eq!(after.max_hit_points, 285);
    assert_eq!(after.hit_points, 285 - 11);
    assert_eq!(after.action_points, 20);
    assert!(matches!(
        events.as_slice(),
        [Event::WormFell { damage: 11, .. }]
    ));
    assert_eq!(query::can_fall(&world, worm), Ok(false));
}

#[test]
fn falling_while_resting_is_rejected() {
    let mut world = floor_world(10, 10);
    let worm = world.attach(worm_at("Jim", 5.0, 5.0, 0.4)).expect("attach");
    landed(&mut world, worm);

    assert_eq!(
        run(&mut world, Command::Fall { worm }),
        Err(WorldError::IllegalState(IllegalStateError::CannotFall(worm)))
    );
}

#[test]
fn falling_without_a_floor_removes_the_worm() {
    let map = PassableMap::from_fn(10, 10, |_| true).expect("valid map");
    let mut world = World::new(WorldDimensions::new(10.0, 10.0).expect("dimensions"), map);
    let worm = world.attach(worm_at("Jim", 5.0, 5.0, 0.4)).expect("attach");
    let mut events = Vec::new();
    world::apply(&mut world, Command::Activate { worm }, &mut events).expect("activate");

    let events = run(&mut world, Command::Fall { worm }).expect("fall");

    assert_eq!(
        events,
        vec![
            Event::WormDied { worm },
            Event::WormFellOffWorld { worm },
        ]
    );
    assert!(query::object(&world, worm).is_none());
    assert_eq!(query::active_worm(&world), None);
    assert_eq!(
        query::is_alive(&world, worm),
        Err(WorldError::Ownership(OwnershipError::NotAMember(worm)))
    );
}

#[test]
fn fatal_falls_kill_but_keep_the_worm_attached() {
    let mut world = floor_world(10, 10);
    let worm = world
        .attach(worm_at("Jim", 5.0, 8.0, 0.4).with_hit_points(5))
        .expect("attach");

    let events = run(&mut world, Command::Fall { worm }).expect("fall");

    assert!(matches!(events.last(), Some(Event::WormDied { worm: dead }) if *dead == worm));
    let after = snapshot(&world, worm);
    assert_eq!(after.hit_points, 0);
    assert!(!after.alive);
    assert_eq!(query::can_move(&world, worm), Ok(false));
    assert_eq!(query::can_turn(&world, worm, 0.0), Ok(false));
}

#[test]
fn moving_without_action_points_is_illegal() {
    let mut world = floor_world(10, 10);
    let worm = world
        .attach(worm_at("Jim", 5.0, 5.0, 0.4).with_action_points(0))
        .expect("attach");
    landed(&mut world, worm);

    assert_eq!(query::can_move(&world, worm), Ok(false));
    assert_eq!(
        run(&mut world, Command::Move { worm }),
        Err(WorldError::IllegalState(IllegalStateError::CannotMove(worm)))
    );
}

#[test]
fn moving_with_too_few_action_points_for_the_climb_is_illegal() {
    let mut world = floor_world(10, 10);
    let climber = GameObject::worm("Jim", Position::new(5.0, 1.42), 0.4, FRAC_PI_2)
        .expect("valid worm")
        .with_action_points(3);
    let worm = world.attach(climber).expect("attach");
    assert_eq!(query::can_fall(&world, worm), Ok(false));

    assert_eq!(query::can_move(&world, worm), Ok(false));
    assert_eq!(
        run(&mut world, Command::Move { worm }),
        Err(WorldError::IllegalState(IllegalStateError::CannotMove(worm)))
    );
    assert_eq!(snapshot(&world, worm).action_points, 3);
    assert_eq!(snapshot(&world, worm).position, Position::new(5.0, 1.42));
}

#[test]
fn level_steps_cost_one_action_point() {
    let mut world = floor_world(10, 10);
    let worm = world.attach(worm_at("Jim", 5.0, 5.0, 0.4)).expect("attach");
    landed(&mut world, worm);
    let before = snapshot(&world, worm);

    let events = run(&mut world, Command::Move { worm }).expect("move");

    let after = snapshot(&world, worm);
    assert!((after.position.x() - 5.4).abs() < 1e-9);
    assert!((after.position.y() - before.position.y()).abs() < 1e-9);
    assert_eq!(after.action_points, before.action_points - 1);
    assert!(matches!(events.as_slice(), [Event::WormMoved { cost: 1, .. }]));
}

#[test]
fn footing_is_preferred_over_open_air() {
    let mut world = floor_world(10, 10);
    let worm = world
        .attach(GameObject::worm("Jim", Position::new(5.0, 5.0), 0.4, FRAC_PI_4).expect("worm"))
        .expect("attach");
    landed(&mut world, worm);
    let before = snapshot(&world, worm);

    let events = run(&mut world, Command::Move { worm }).expect("move");

    let Some(Event::WormMoved { to, cost, .. }) = events.first() else {
        panic!("expected a move event, got {events:?}");
    };
    assert!(is_adjacent_to_floor(query::terrain(&world), *to, 0.4));
    assert!(to.y() < before.position.y() + 0.05);
    assert!(to.x() > before.position.x());
    assert_eq!(*cost, worms_world::step_cost(before.position, *to));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::WormFell { .. })));
}

#[test]
fn stepping_into_the_air_falls_immediately() {
    let mut world = floor_world(10, 10);
    let worm = world.attach(worm_at("Jim", 5.0, 5.0, 0.4)).expect("attach");

    let events = run(&mut world, Command::Move { worm }).expect("move");

    assert!(matches!(
        events.as_slice(),
        [Event::WormMoved { cost: 1, .. }, Event::WormFell { .. }]
    ));
    let Event::WormMoved { to, .. } = &events[0] else {
        unreachable!();
    };
    assert!((to.x() - 5.4).abs() < 1e-9);
    assert!((to.y() - 5.0).abs() < 1e-9);
    let after = snapshot(&world, worm);
    assert!(after.position.y() < 1.5);
    assert_eq!(after.action_points, after.max_action_points - 1);
}

#[test]
fn turning_costs_follow_the_angle() {
    let mut world = floor_world(10, 10);
    let worm = world
        .attach(worm_at("Jim", 5.0, 5.0, 0.4).with_action_points(40))
        .expect("attach");

    for revolutions in [TAU, -TAU, 3.0 * TAU] {
        let events = run(&mut world, Command::Turn { worm, angle: revolutions }).expect("turn");
        assert!(matches!(events.as_slice(), [Event::WormTurned { cost: 0, .. }]));
    }
    assert_eq!(snapshot(&world, worm).action_points, 40);

    let events = run(&mut world, Command::Turn { worm, angle: PI }).expect("turn");
    let [Event::WormTurned { direction, cost, .. }] = events.as_slice() else {
        panic!("unexpected events {events:?}");
    };
    assert_eq!(*cost, 30);
    assert!((direction - PI).abs() < 1e-9);
    assert_eq!(snapshot(&world, worm).action_points, 10);

    assert_eq!(query::can_turn(&world, worm, PI), Ok(false));
    assert_eq!(
        run(&mut world, Command::Turn { worm, angle: PI }),
        Err(WorldError::IllegalState(IllegalStateError::CannotTurn(worm)))
    );
}

#[test]
fn spending_the_last_point_reports_depletion() {
    let mut world = floor_world(10, 10);
    let worm = world
        .attach(worm_at("Jim", 5.0, 5.0, 0.4).with_action_points(15))
        .expect("attach");

    let events = run(&mut world, Command::Turn { worm, angle: -PI / 2.0 }).expect("turn");

    assert_eq!(events.len(), 2);
    assert_eq!(events[1], Event::ActionPointsDepleted { worm });
    let direction = snapshot(&world, worm).direction;
    assert!((direction - 1.5 * PI).abs() < 1e-9);
}

#[test]
fn eating_grows_the_worm_and_removes_the_food() {
    let mut world = floor_world(10, 10);
    let worm = world.attach(worm_at("Jim", 5.0, 5.0, 0.4)).expect("attach");
    let food = world
        .attach(GameObject::food(Position::new(5.0, 1.5)).expect("food"))
        .expect("attach");
    let before = snapshot(&world, worm);

    let events = run(&mut world, Command::Fall { worm }).expect("fall");

    assert!(events.contains(&Event::FoodEaten {
        worm,
        food,
        radius: 0.4 * 1.1,
    }));
    let after = snapshot(&world, worm);
    assert!((after.radius - 0.44).abs() < 1e-12);
    assert!(after.max_action_points > before.max_action_points);
    assert!(after.max_hit_points > before.max_hit_points);
    assert!(after.hit_points <= after.max_hit_points);
    assert!(query::object(&world, food).is_none());
    assert!(query::overlapping(&world, ObjectKind::Food, Position::new(5.0, 1.5), 0.1).is_empty());
}

#[test]
fn jumping_lands_further_along_and_ends_the_turn() {
    let mut world = floor_world(40, 20);
    let worm = world
        .attach(GameObject::worm("Jim", Position::new(10.0, 5.0), 0.5, FRAC_PI_4).expect("worm"))
        .expect("attach");
    landed(&mut world, worm);
    let before = snapshot(&world, worm);
    assert_eq!(before.action_points, 556);

    assert_eq!(query::can_jump(&world, worm, 0.01), Ok(true));
    let events = run(&mut world, Command::Jump { worm, time_step: 0.01 }).expect("jump");

    let after = snapshot(&world, worm);
    assert!(
        (after.position.x() - 15.6).abs() < 0.1,
        "landed at {:?}",
        after.position
    );
    assert!(after.position.y() < 2.0);
    assert!(is_adjacent_to_floor(query::terrain(&world), after.position, 0.5));
    assert_eq!(after.action_points, 0);
    assert!(matches!(events.first(), Some(Event::WormJumped { .. })));
    assert_eq!(events.last(), Some(&Event::ActionPointsDepleted { worm }));
}

#[test]
fn jumps_without_displacement_are_rejected() {
    let mut world = floor_world(40, 20);
    let worm = world
        .attach(
            GameObject::worm("Jim", Position::new(10.0, 5.0), 0.5, 1.5 * PI).expect("worm"),
        )
        .expect("attach");
    landed(&mut world, worm);

    assert_eq!(query::can_jump(&world, worm, 0.01), Ok(false));
    assert_eq!(query::can_jump(&world, worm, 0.0), Ok(false));
    assert_eq!(query::can_jump(&world, worm, f64::NAN), Ok(false));
    assert_eq!(
        run(&mut world, Command::Jump { worm, time_step: 0.01 }),
        Err(WorldError::IllegalState(IllegalStateError::CannotJump(worm)))
    );
}

#[test]
fn activation_restores_points_and_arms_the_worm() {
    let mut world = floor_world(10, 10);
    let worm = world
        .attach(worm_at("Jim", 5.0, 5.0, 0.4).with_action_points(3).with_hit_points(100))
        .expect("attach");

    let events = run(&mut world, Command::Activate { worm }).expect("activate");

    assert_eq!(events, vec![Event::WormActivated { worm }]);
    let after = snapshot(&world, worm);
    assert!(after.active);
    assert_eq!(after.action_points, after.max_action_points);
    assert_eq!(after.hit_points, 110);
    let object = query::object(&world, worm).expect("attached");
    let state = object.as_worm().expect("worm body");
    assert_eq!(state.selected_weapon(), Some(WeaponKind::Rifle));

    let events = run(&mut world, Command::SelectNextWeapon { worm }).expect("select");
    assert_eq!(
        events,
        vec![Event::WeaponSelected {
            worm,
            weapon: WeaponKind::Bazooka,
        }]
    );
}

#[test]
fn dead_worms_cannot_be_activated() {
    let mut world = floor_world(10, 10);
    let worm = world
        .attach(worm_at("Jim", 5.0, 8.0, 0.4).with_hit_points(1))
        .expect("attach");
    let _ = run(&mut world, Command::Fall { worm }).expect("fall");

    assert_eq!(
        run(&mut world, Command::Activate { worm }),
        Err(WorldError::IllegalState(IllegalStateError::Dead(worm)))
    );
}

#[test]
fn commands_reject_non_worms_and_strangers() {
    let mut world = floor_world(10, 10);
    let food = world
        .attach(GameObject::food(Position::new(3.0, 3.0)).expect("food"))
        .expect("attach");
    let stranger = ObjectId::new(999);

    assert_eq!(
        run(&mut world, Command::Move { worm: food }),
        Err(WorldError::IllegalState(IllegalStateError::NotAWorm(food)))
    );
    assert_eq!(
        query::can_fall(&world, stranger),
        Err(WorldError::Ownership(OwnershipError::NotAMember(stranger)))
    );
}

#[test]
fn objects_belong_to_a_single_world() {
    let mut first = floor_world(10, 10);
    let mut second = floor_world(10, 10);
    let worm = first.attach(worm_at("Jim", 5.0, 5.0, 0.4)).expect("attach");

    let still_owned = query::object(&first, worm).cloned().expect("attached");
    assert_eq!(
        second.attach(still_owned),
        Err(OwnershipError::AlreadyAttached(first.id()))
    );

    let released = first.detach(worm).expect("detach");
    assert!(second.attach(released).is_ok());
}

#[test]
fn running_games_only_accept_projectiles() {
    let mut world = floor_world(10, 10);
    let _ = world.attach(worm_at("Jim", 5.0, 5.0, 0.4)).expect("attach");
    let _ = run(&mut world, Command::StartGame).expect("start");

    assert_eq!(
        world.attach(worm_at("Bob", 2.0, 5.0, 0.4)),
        Err(OwnershipError::GameStarted(ObjectKind::Worm))
    );
    assert_eq!(
        world.attach(GameObject::food(Position::new(3.0, 3.0)).expect("food")),
        Err(OwnershipError::GameStarted(ObjectKind::Food))
    );
    let projectile =
        GameObject::projectile(Position::new(4.0, 4.0), 0.05, WeaponKind::Bazooka, 0.3)
            .expect("projectile");
    assert!(world.attach(projectile).is_ok());
}
