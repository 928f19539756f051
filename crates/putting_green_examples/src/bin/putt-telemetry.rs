use glam::{Vec2, Vec3};
use putting_green::prelude::*;
use putting_green_examples::{init_tracing, render_green_to_png, RenderConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let outline = OutlineSpec::new(OutlineShape::Oval, Vec2::new(10.0, 7.0));
    let surface = GreenSurfaceSpec::flat()
        .with_base_slope(2.0, 30.0)
        .with_undulation(UndulationParams::default());
    let green = generate(11, &outline, &surface, 129)?;

    let params = BallParams::default();
    let speed = green_speed_from_rating(11.0);
    let cup = green.place_cup(CupConfig::default().with_ball_radius(params.radius));
    let start = green.start_position(params.radius);

    // Rough launch speed for a flat roll of the planned distance, plus a little extra
    let rolling = speed.friction * params.gravity;
    let launch = (2.0 * rolling * green.placement.distance).sqrt() * 1.1;
    let aim = green.placement.aim_direction();
    let velocity = Vec3::new(aim.x, 0.0, aim.y) * launch;

    let mut trajectory = Vec::new();
    for model in [PhysicsModel::SurfaceConstrained, PhysicsModel::RigidBody] {
        let simulator = simulator_for(model, params, speed, SimConfig::default())?;
        let mut events = VecSink::new();
        let mut state = BallState::new(start, velocity);
        let outcome = PuttRunner::new(simulator.as_ref())
            .with_trajectory(true)
            .run(&mut state, &green.heightfield, Some(&cup), &mut events);

        info!(
            "{}: {:?} after {} steps, rolled {:.2} m, {} lip-outs, {} warnings.",
            model,
            outcome.result,
            outcome.steps,
            outcome.distance_rolled,
            outcome.lip_outs,
            outcome.warnings.len()
        );
        for event in events.as_slice() {
            info!("  {:?}", event);
        }

        if model == PhysicsModel::SurfaceConstrained {
            trajectory = outcome.trajectory;
        }
    }

    render_green_to_png(
        &green,
        &RenderConfig::new(800),
        Some(trajectory.as_slice()),
        "putt-telemetry.png",
    )?;

    Ok(())
}
