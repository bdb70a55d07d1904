use gravity_wells::*;

/// A lander launched between two planetoids: it is handed from one well to
/// the other and keeps righting itself toward whichever pulls harder.
fn main() -> Result<(), GravityError> {
    let mut engine = GravityEngine::new(1.0 / 60.0)?;
    engine.world_mut().set_parallel_enabled(true);

    let home = engine.add_body(PhysicsBody::new(Vec3::ZERO, 1.0).with_kind(BodyKind::Static));
    engine.add_source(
        GravitySource::builder()
            .surface(30.0, 5.0)
            .attached_to(home)
            .volume(InfluenceVolume::sphere(40.0)),
    )?;
    engine.add_source(
        GravitySource::builder()
            .surface(60.0, 8.0)
            .mass_authority(MassAuthority::Internal)
            .position(Vec3::new(60.0, 0.0, 0.0))
            .volume(InfluenceVolume::sphere(45.0)),
    )?;

    let mut lander = PhysicsBody::new(Vec3::new(0.0, 8.0, 0.0), 1.0).with_radius(0.5);
    lander.velocity.linear = Vec3::new(14.0, 6.0, 0.0);
    let lander = engine.add_body(lander);
    engine.attach_gravity_object(lander, GravityObject::self_righting(0.2)?)?;

    for tick in 0..=240 {
        engine.step(1.0 / 60.0);
        if tick % 30 == 0 {
            let body = engine.get_body(lander).expect("lander exists");
            let object = engine.world().gravity_object(lander).expect("lander tracker");
            println!(
                "t={:>5.2}s pos={:?} up={:?} sources={:?} state={:?}",
                tick as f32 / 60.0,
                body.transform.position,
                body.transform.up(),
                engine.world().sources_affecting(lander),
                object.righting_state(),
            );
        }
    }
    Ok(())
}
