use glam::{Vec2, Vec3};
use putting_green::prelude::*;
use putting_green_examples::init_tracing;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let outline = OutlineSpec::new(OutlineShape::Round, Vec2::new(9.0, 9.0));
    let surface = GreenSurfaceSpec::flat().with_base_slope(1.0, 0.0);
    let green = generate(3, &outline, &surface, 97)?;

    let params = BallParams::default();
    let cup = green.place_cup(CupConfig::default().with_ball_radius(params.radius));
    let start = green.start_position(params.radius);
    let aim = green.placement.aim_direction();
    let mut rng = StdRng::seed_from_u64(4242);

    // Holed ratio per green speed over jittered launch speeds and aim angles
    for stimp in [7.0, 9.0, 11.0, 13.0] {
        let speed = green_speed_from_rating(stimp);
        let simulator = simulator_for(
            PhysicsModel::SurfaceConstrained,
            params,
            speed,
            SimConfig::default(),
        )?;
        let nominal = (2.0 * speed.friction * params.gravity * green.placement.distance).sqrt();

        let attempts = 200;
        let mut holed = 0;
        for _ in 0..attempts {
            let scale = 0.9 + 0.3 * unit(&mut rng);
            let angle = (unit(&mut rng) - 0.5) * 0.04;
            let dir = Vec2::from_angle(angle).rotate(aim);
            let velocity = Vec3::new(dir.x, 0.0, dir.y) * nominal * scale;
            let outcome = run_putt(
                simulator.as_ref(),
                &green.heightfield,
                Some(&cup),
                start,
                velocity,
            );
            if outcome.result == PuttResult::Holed {
                holed += 1;
            }
        }
        info!(
            "Stimpmeter {:.0}: holed {}/{} from {:.1} m.",
            stimp, holed, attempts, green.placement.distance
        );
    }

    Ok(())
}

fn unit(rng: &mut impl Rng) -> f32 {
    (rng.next_u32() >> 8) as f32 / (1u32 << 24) as f32
}
