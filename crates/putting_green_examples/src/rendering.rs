//! PNG rendering of generated greens and putt trajectories for the example binaries.
use std::path::Path;

use glam::{Vec2, Vec3};
use image::{Rgb, RgbImage};
use putting_green::green::GeneratedGreen;
use tracing::{debug, info};
use tracing_subscriber::FmtSubscriber;

/// Installs a plain `fmt` subscriber. Honours `PUTTING_GREEN_LOG` (`trace`..`error`).
pub fn init_tracing() {
    let level = match std::env::var("PUTTING_GREEN_LOG")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        debug!("Keeping the existing tracing subscriber: {}.", err);
    }
}

#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Output width and height in pixels.
    pub size: u32,
    pub background: [u8; 3],
    pub trajectory_color: [u8; 3],
    /// Draw height contours every `contour_interval` metres; zero disables them.
    pub contour_interval: f32,
}

impl RenderConfig {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            background: [34, 68, 34],
            trajectory_color: [255, 255, 255],
            contour_interval: 0.05,
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn with_contour_interval(mut self, contour_interval: f32) -> Self {
        self.contour_interval = contour_interval;
        self
    }
}

/// Renders a top-down view: heights as a green-to-yellow ramp, pin flats, start and cup
/// markers, and an optional ball trajectory.
pub fn render_green_to_png(
    green: &GeneratedGreen,
    config: &RenderConfig,
    trajectory: Option<&[Vec3]>,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let size = config.size.max(2);
    let world = green.heightfield.world_size();
    let (_, max_height) = green.heightfield.raster().min_max();
    let max_height = max_height.max(1e-3);
    let to_world = |px: u32, py: u32| -> Vec2 {
        let u = (px as f32 + 0.5) / size as f32;
        let v = (py as f32 + 0.5) / size as f32;
        Vec2::new((u - 0.5) * world, (v - 0.5) * world)
    };

    let mut img = RgbImage::from_pixel(size, size, Rgb(config.background));
    for py in 0..size {
        for px in 0..size {
            let p = to_world(px, py);
            let Some(h) = green.heightfield.try_height_at(p) else {
                continue;
            };
            if !green.sdf.contains(p) {
                continue;
            }
            let mut color = height_color(h / max_height);
            if config.contour_interval > 0.0 {
                let band = (h / config.contour_interval).fract();
                if band < 0.06 {
                    color = Rgb([color.0[0] / 2, color.0[1] / 2, color.0[2] / 2]);
                }
            }
            img.put_pixel(px, py, color);
        }
    }

    let to_pixel = |p: Vec2| -> (i32, i32) {
        let u = p.x / world + 0.5;
        let v = p.y / world + 0.5;
        ((u * size as f32) as i32, (v * size as f32) as i32)
    };
    let scale = size as f32 / world;

    for pin in &green.pin_candidates {
        let (x, y) = to_pixel(pin.center);
        draw_ring(&mut img, x, y, (pin.radius * scale) as i32, Rgb([120, 200, 255]));
    }
    if let Some(points) = trajectory {
        let color = Rgb(config.trajectory_color);
        for pair in points.windows(2) {
            let (x0, y0) = to_pixel(Vec2::new(pair[0].x, pair[0].z));
            let (x1, y1) = to_pixel(Vec2::new(pair[1].x, pair[1].z));
            draw_line(&mut img, x0, y0, x1, y1, color);
        }
    }
    let (sx, sy) = to_pixel(green.placement.start);
    fill_disk(&mut img, sx, sy, 4, Rgb([250, 250, 250]));
    let (cx, cy) = to_pixel(green.placement.cup);
    fill_disk(&mut img, cx, cy, 4, Rgb([10, 10, 10]));

    img.save(path.as_ref())?;
    info!("Wrote {}.", path.as_ref().display());
    Ok(())
}

fn height_color(t: f32) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let r = 40.0 + 180.0 * t;
    let g = 120.0 + 100.0 * t;
    let b = 40.0 + 20.0 * (1.0 - t);
    Rgb([r as u8, g as u8, b as u8])
}

fn put(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_disk(img: &mut RgbImage, cx: i32, cy: i32, radius: i32, color: Rgb<u8>) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put(img, cx + dx, cy + dy, color);
            }
        }
    }
}

fn draw_ring(img: &mut RgbImage, cx: i32, cy: i32, radius: i32, color: Rgb<u8>) {
    let steps = (radius.max(1) * 8) as usize;
    for i in 0..steps {
        let a = std::f32::consts::TAU * i as f32 / steps as f32;
        let x = cx + (a.cos() * radius as f32).round() as i32;
        let y = cy + (a.sin() * radius as f32).round() as i32;
        put(img, x, y, color);
    }
}

/// Bresenham line.
fn draw_line(img: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    loop {
        put(img, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
