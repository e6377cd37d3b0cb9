use anyhow::Context;
use cloth_break::ecs::components::ClothSurface;
use cloth_break::{
    BreakPolicy, ClothBreakSystem, ClothMesh, CollisionEvent, ControllerConfig, EcsHost,
    GeneratorConfig, ImpactSource, MaterialId, StrategyKind, SurfaceId,
};
use glam::Vec3;

const FRAME: f32 = 1.0 / 60.0;

/// A 2 m x 2 m cape: material 0 below the waist, material 1 above.
fn cape() -> ClothMesh {
    let mut mesh = ClothMesh::panel(Vec3::new(0.0, 0.0, 150.0), 200.0, 200.0, 40, 40, MaterialId(0));
    for i in 0..mesh.triangle_count() {
        if mesh.triangle_centroid(i).y > 0.0 {
            mesh.materials[i] = MaterialId(1);
        }
    }
    mesh
}

fn bullet(speed: f32, mass: f32) -> ImpactSource {
    ImpactSource::projectile("Bullet", 5.0, Vec3::new(0.0, 0.0, -speed), mass)
}

/// Run frames for `seconds`, disposing of expired fragments.
fn run(host: &mut EcsHost, system: &mut ClothBreakSystem, seconds: f32) -> usize {
    let mut expired = 0;
    let frames = (seconds / FRAME).ceil() as usize;
    for _ in 0..frames {
        for fragment in host.step(FRAME) {
            if system.on_fragment_expired(host, fragment) {
                expired += 1;
            }
        }
    }
    expired
}

fn scenario(strategy: StrategyKind) -> anyhow::Result<()> {
    log::info!("--- {strategy:?} fragments ---");

    let mut host = EcsHost::new();
    let surface: SurfaceId = host.spawn_surface(ClothSurface::new(cape()));

    let config = ControllerConfig::default().generator(GeneratorConfig::default().strategy(strategy));
    let mut system = ClothBreakSystem::with_defaults(BreakPolicy::default(), config);
    if !system.attach_to_surface(&mut host, surface) {
        anyhow::bail!("could not attach to {surface:?}");
    }
    system.enable_debug_visualization(surface, true, 2.0);
    system
        .controller_mut(surface)
        .context("controller missing after attach")?
        .on_break(|event| {
            log::info!(
                "break event: {} fragments, radius {:.1}, force {:.1}, material {}",
                event.fragments,
                event.radius,
                event.force,
                event.material.0
            );
        });

    let point = Vec3::new(20.0, -30.0, 150.0);

    // 2000 units/s at mass 2 is well under the default threshold.
    let weak = CollisionEvent::new(surface, point, bullet(2000.0, 2.0));
    let broke = system.dispatch_collision(&mut host, &weak);
    log::info!("weak hit broke cloth: {broke}, fragments: {}", host.fragment_count());

    let strong = CollisionEvent::new(surface, point, bullet(8000.0, 2.0));
    let broke = system.dispatch_collision(&mut host, &strong);
    log::info!("strong hit broke cloth: {broke}, fragments: {}", host.fragment_count());
    log::info!("debug overlay: {} line vertices", host.debug.vertices().len());

    // Only the upper half may break from here on.
    system.set_material_breakable(&mut host, surface, MaterialId(1), true);
    let lower = Vec3::new(-40.0, -60.0, 150.0);
    let upper = Vec3::new(-40.0, 60.0, 150.0);
    log::info!(
        "manual break below the waist: {}",
        system.force_break_at_location(&mut host, surface, lower, 15.0)
    );
    log::info!(
        "manual break above the waist: {}",
        system.force_break_at_location(&mut host, surface, upper, 15.0)
    );

    let remaining = host
        .surface_mesh(surface)
        .map_or(0, |mesh| mesh.triangle_count());
    log::info!("cloth triangles left: {remaining}");

    let expired = run(&mut host, &mut system, 6.0);
    log::info!(
        "{expired} fragments expired, {} still alive",
        host.fragment_count()
    );

    system.detach(&mut host, surface);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    scenario(StrategyKind::Primitive)?;
    scenario(StrategyKind::MeshCut)?;
    Ok(())
}
