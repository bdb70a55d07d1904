use approx::assert_relative_eq;
use gravity_wells::utils::math::angle_between;
use gravity_wells::*;

const DT: f32 = 1.0 / 60.0;

fn manual_world() -> GravityWorld {
    GravityWorld::new(GravityConfig {
        detect_overlaps: false,
        ..GravityConfig::default()
    })
    .unwrap()
}

fn well(world: &mut GravityWorld, position: Vec3) -> SourceId {
    world
        .add_source(
            GravitySource::builder()
                .surface(500.0, 2.0)
                .mass_authority(MassAuthority::Internal)
                .position(position)
                .volume(InfluenceVolume::sphere(40.0)),
        )
        .unwrap()
}

/// Body that is tracked but not moved by gravity, so the target orientation stays fixed.
fn hovering_body(world: &mut GravityWorld, position: Vec3, rotation: Quat) -> BodyId {
    let mut body = PhysicsBody::new(position, 1.0);
    body.gravity_enabled = false;
    body.transform.rotation = rotation;
    world.add_body(body)
}

fn up_error(world: &GravityWorld, body: BodyId, dominant: Vec3) -> f32 {
    let rotation = world.body(body).unwrap().transform.rotation;
    angle_between(rotation * Vec3::Y, -dominant)
}

#[test]
fn dominant_gravity_without_sources_is_the_ambient_field() {
    let mut world = manual_world();
    let ambient = Vec3::new(0.0, -9.81, 0.0);
    world.set_ambient_gravity(ambient).unwrap();
    let body = world.add_body(PhysicsBody::new(Vec3::new(3.0, 4.0, 5.0), 2.0));

    assert_eq!(world.compute_dominant_gravity(body).unwrap(), ambient);
}

#[test]
fn dominant_gravity_of_unknown_body_is_an_error() {
    let mut world = manual_world();
    let body = world.add_body(PhysicsBody::new(Vec3::ZERO, 1.0));
    world.remove_body(body);
    assert_eq!(
        world.compute_dominant_gravity(body),
        Err(GravityError::UnknownBody(body))
    );
}

#[test]
fn strongest_source_wins_over_ambient_and_weaker_wells() {
    let mut world = manual_world();
    world.set_ambient_gravity(Vec3::new(0.0, -1.0, 0.0)).unwrap();
    let near = well(&mut world, Vec3::new(5.0, 0.0, 0.0));
    let far = well(&mut world, Vec3::new(-20.0, 0.0, 0.0));
    let body = hovering_body(&mut world, Vec3::ZERO, Quat::IDENTITY);
    world.handle_overlap(OverlapEvent::Begin { source: far, body });
    world.handle_overlap(OverlapEvent::Begin { source: near, body });

    let dominant = world.compute_dominant_gravity(body).unwrap();

    // 500 * (2 / 5)^2 toward +x; the sum of all three would tilt it.
    assert_relative_eq!(dominant.x, 80.0, max_relative = 1e-3);
    assert_eq!(dominant.y, 0.0);
    assert_eq!(dominant.z, 0.0);
}

#[test]
fn self_righting_converges_monotonically() {
    let mut world = manual_world();
    let source = well(&mut world, Vec3::ZERO);
    let body = hovering_body(
        &mut world,
        Vec3::new(0.0, 0.0, 10.0),
        Quat::from_rotation_x(2.5),
    );
    world.handle_overlap(OverlapEvent::Begin { source, body });
    world
        .attach_gravity_object(body, GravityObject::self_righting(0.5).unwrap())
        .unwrap();

    let dominant = world.compute_dominant_gravity(body).unwrap();
    let tolerance = world.config().alignment_tolerance;
    let mut previous = up_error(&world, body, dominant);

    let mut aligned_after = None;
    for tick in 0..40 {
        world.fixed_tick();
        let error = up_error(&world, body, dominant);
        assert!(
            error <= previous + 1e-4,
            "tick {tick}: error grew {previous} -> {error}"
        );
        previous = error;
        if error <= tolerance && aligned_after.is_none() {
            aligned_after = Some(tick);
        }
    }

    assert!(aligned_after.is_some(), "never aligned, error = {previous}");
    assert_eq!(
        world.gravity_object(body).unwrap().righting_state(),
        RightingState::Aligned
    );
    let up = world.body(body).unwrap().transform.up();
    assert!(up.abs_diff_eq(Vec3::Z, 1e-3), "up = {up:?}");
}

#[test]
fn righting_states_follow_the_gravity() {
    let mut world = manual_world();
    let source = well(&mut world, Vec3::ZERO);
    let body = hovering_body(&mut world, Vec3::new(10.0, 0.0, 0.0), Quat::IDENTITY);
    world
        .attach_gravity_object(body, GravityObject::self_righting(1.0).unwrap())
        .unwrap();

    world.fixed_tick();
    assert_eq!(
        world.gravity_object(body).unwrap().righting_state(),
        RightingState::Stable
    );

    world.handle_overlap(OverlapEvent::Begin { source, body });
    world.fixed_tick();
    assert_eq!(
        world.gravity_object(body).unwrap().righting_state(),
        RightingState::Correcting
    );

    world.fixed_tick();
    assert_eq!(
        world.gravity_object(body).unwrap().righting_state(),
        RightingState::Aligned
    );

    world.handle_overlap(OverlapEvent::End { source, body });
    world.fixed_tick();
    assert_eq!(
        world.gravity_object(body).unwrap().righting_state(),
        RightingState::Stable
    );
}

#[test]
fn bodies_without_self_righting_keep_their_orientation() {
    let mut world = manual_world();
    let source = well(&mut world, Vec3::ZERO);
    let rotation = Quat::from_rotation_z(1.0);
    let body = hovering_body(&mut world, Vec3::new(0.0, 10.0, 0.0), rotation);
    world.handle_overlap(OverlapEvent::Begin { source, body });
    world.attach_gravity_object(body, GravityObject::new()).unwrap();

    for _ in 0..10 {
        world.fixed_tick();
    }

    assert_eq!(world.body(body).unwrap().transform.rotation, rotation);
    let object = world.gravity_object(body).unwrap();
    assert_eq!(object.righting_state(), RightingState::Stable);
    assert!(object.dominant_gravity().y < 0.0);
}

#[test]
fn disabled_gravity_object_is_left_alone() {
    let mut world = manual_world();
    let source = well(&mut world, Vec3::ZERO);
    let rotation = Quat::from_rotation_x(1.0);
    let body = hovering_body(&mut world, Vec3::new(0.0, 10.0, 0.0), rotation);
    world.handle_overlap(OverlapEvent::Begin { source, body });
    world
        .attach_gravity_object(body, GravityObject::self_righting(1.0).unwrap())
        .unwrap();
    world.set_gravity_object_enabled(body, false).unwrap();

    world.fixed_tick();

    assert_eq!(world.body(body).unwrap().transform.rotation, rotation);
}

#[test]
fn time_constant_blend_is_tick_rate_independent() {
    let run = |time_step: f32| {
        let mut world = GravityWorld::new(GravityConfig {
            detect_overlaps: false,
            time_step,
            ..GravityConfig::default()
        })
        .unwrap();
        let source = well(&mut world, Vec3::ZERO);
        let body = hovering_body(&mut world, Vec3::new(0.0, 10.0, 0.0), Quat::from_rotation_x(1.5));
        world.handle_overlap(OverlapEvent::Begin { source, body });
        let mut object = GravityObject::self_righting(0.5).unwrap();
        object
            .set_blend(RightingBlend::TimeConstant { seconds: 0.25 })
            .unwrap();
        world.attach_gravity_object(body, object).unwrap();

        let ticks = (0.5 / time_step).round() as usize;
        for _ in 0..ticks {
            world.fixed_tick();
        }
        up_error(&world, body, Vec3::new(0.0, -1.0, 0.0))
    };

    let coarse = run(1.0 / 30.0);
    let fine = run(1.0 / 120.0);
    let expected = 1.5 * (-0.5_f32 / 0.25).exp();
    assert_relative_eq!(coarse, expected, max_relative = 1e-2);
    assert_relative_eq!(fine, expected, max_relative = 1e-2);
}

#[test]
fn invalid_righting_parameters_are_rejected() {
    assert!(GravityObject::self_righting(1.5).is_err());
    assert!(GravityObject::self_righting(-0.1).is_err());
    let mut object = GravityObject::new();
    assert!(object
        .set_blend(RightingBlend::TimeConstant { seconds: 0.0 })
        .is_err());
    assert_eq!(object.blend(), RightingBlend::PerTick);
}

/// Two equal wells on either side of a body: the strongest-candidate rule
/// flips direction as the body crosses the midpoint, while the strength of
/// the winner barely changes.
#[test]
fn equal_wells_flip_direction_not_magnitude() {
    let mut world = manual_world();
    let left = well(&mut world, Vec3::new(-10.0, 0.0, 0.0));
    let right = well(&mut world, Vec3::new(10.0, 0.0, 0.0));
    let body = hovering_body(&mut world, Vec3::ZERO, Quat::IDENTITY);
    world.handle_overlap(OverlapEvent::Begin { source: left, body });
    world.handle_overlap(OverlapEvent::Begin { source: right, body });

    let single = 500.0 * (2.0_f32 / 10.0).powi(2);

    let mut dominant_at = |x: f32| {
        world.body_mut(body).unwrap().transform.position = Vec3::new(x, 0.0, 0.0);
        world.compute_dominant_gravity(body).unwrap()
    };

    let centre = dominant_at(0.0);
    let toward_right = dominant_at(0.01);
    let toward_left = dominant_at(-0.01);

    // An exact tie keeps the earlier source.
    assert!(centre.x < 0.0);
    assert_relative_eq!(centre.length(), single, max_relative = 1e-4);

    assert!(toward_right.x > 0.0);
    assert!(toward_left.x < 0.0);
    assert_relative_eq!(toward_right.length(), toward_left.length(), max_relative = 1e-4);
    assert_relative_eq!(toward_right.length(), single, max_relative = 1e-2);
}
