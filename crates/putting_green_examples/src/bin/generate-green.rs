use glam::Vec2;
use putting_green::prelude::*;
use putting_green_examples::{init_tracing, render_green_to_png, RenderConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let seed = std::env::args()
        .nth(1)
        .map(|s| s.parse::<u64>())
        .transpose()?
        .unwrap_or(7);

    // Kidney green, about 24 m x 16 m
    let outline = OutlineSpec::new(OutlineShape::Kidney, Vec2::new(12.0, 8.0)).with_jitter(0.08);

    // A back-to-front tilt with a tier, a swale, and some undulation
    let surface = GreenSurfaceSpec::flat()
        .with_base_slope(1.5, 90.0)
        .with_noise(0.03, 0.15)
        .with_undulation(UndulationParams::default())
        .with_tiers(TierParams::default())
        .with_swales(SwaleParams::default());

    let green = generate(seed, &outline, &surface, 129)?;

    info!(
        "Seed {}: {} pin flats, putt of {:.1} m, difficulty {:.2} ({}).",
        green.seed,
        green.pin_candidates.len(),
        green.placement.distance,
        green.difficulty.score,
        green.difficulty.tier
    );
    for failure in green.validation.failures() {
        info!(
            "Rule {:?} failed: measured {:.2}, limit {:.2}.",
            failure.rule, failure.measured, failure.limit
        );
    }

    let out = format!("generate-green-{seed}.png");
    render_green_to_png(&green, &RenderConfig::new(800), None, &out)?;

    Ok(())
}
