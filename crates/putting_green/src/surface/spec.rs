//! Surface specification: which elevation features are active and how they are tuned.
use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, Error, Result};

/// Default cap on the steepest slope anywhere on the green, in percent.
pub const DEFAULT_MAX_SLOPE_PERCENT: f32 = 30.0;

/// Radial cosine bumps plus a gentle directional swell.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct UndulationParams {
    pub amplitude: f32,
    pub wavelength: f32,
    pub count: u32,
}

impl Default for UndulationParams {
    fn default() -> Self {
        Self {
            amplitude: 0.06,
            wavelength: 2.5,
            count: 4,
        }
    }
}

/// Stepped tiers rising along a compass direction.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct TierParams {
    pub count: u32,
    pub step_height: f32,
    pub transition_width: f32,
    pub direction_degrees: f32,
}

impl Default for TierParams {
    fn default() -> Self {
        Self {
            count: 1,
            step_height: 0.12,
            transition_width: 0.8,
            direction_degrees: 90.0,
        }
    }
}

/// Straight raised spines with a Gaussian cross-section.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RidgeParams {
    pub count: u32,
    pub height: f32,
    pub width: f32,
}

impl Default for RidgeParams {
    fn default() -> Self {
        Self {
            count: 1,
            height: 0.06,
            width: 0.6,
        }
    }
}

/// Straight shallow troughs with a Gaussian cross-section.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SwaleParams {
    pub count: u32,
    pub depth: f32,
    pub width: f32,
}

impl Default for SwaleParams {
    fn default() -> Self {
        Self {
            count: 1,
            depth: 0.05,
            width: 0.8,
        }
    }
}

/// Radial dome near the middle of the green.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct CrownParams {
    pub height: f32,
    /// Dome radius as a fraction of the green's radius.
    pub radius_fraction: f32,
    /// Offset of the dome centre from the green centroid.
    pub offset: Vec2,
}

impl Default for CrownParams {
    fn default() -> Self {
        Self {
            height: 0.1,
            radius_fraction: 0.8,
            offset: Vec2::ZERO,
        }
    }
}

/// Ramp falling away over the last `depth` metres toward one edge.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct FalseFrontParams {
    pub height: f32,
    pub depth: f32,
    pub direction_degrees: f32,
}

impl Default for FalseFrontParams {
    fn default() -> Self {
        Self {
            height: 0.15,
            depth: 1.2,
            direction_degrees: 270.0,
        }
    }
}

/// Enumerates the elevation terms summed by the heightfield synthesiser.
///
/// Directions are compass angles in degrees in the x/z plane: 0° points along +x and
/// 90° along +z. The base slope falls toward its direction.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct GreenSurfaceSpec {
    pub base_slope_percent: f32,
    pub base_slope_direction_degrees: f32,
    /// Turf roughness amplitude in metres. Always applied; zero disables it.
    pub noise_amplitude: f32,
    /// Turf roughness frequency in cycles per metre.
    pub noise_frequency: f32,
    pub max_slope_percent: f32,
    pub undulation: Option<UndulationParams>,
    pub tiers: Option<TierParams>,
    pub ridges: Option<RidgeParams>,
    pub swales: Option<SwaleParams>,
    pub crown: Option<CrownParams>,
    pub false_front: Option<FalseFrontParams>,
}

impl Default for GreenSurfaceSpec {
    fn default() -> Self {
        Self {
            base_slope_percent: 1.5,
            base_slope_direction_degrees: 0.0,
            noise_amplitude: 0.01,
            noise_frequency: 0.35,
            max_slope_percent: DEFAULT_MAX_SLOPE_PERCENT,
            undulation: None,
            tiers: None,
            ridges: None,
            swales: None,
            crown: None,
            false_front: None,
        }
    }
}

impl GreenSurfaceSpec {
    /// A perfectly flat, featureless surface.
    pub fn flat() -> Self {
        Self {
            base_slope_percent: 0.0,
            noise_amplitude: 0.0,
            ..Default::default()
        }
    }

    pub fn with_base_slope(mut self, percent: f32, direction_degrees: f32) -> Self {
        self.base_slope_percent = percent;
        self.base_slope_direction_degrees = direction_degrees;
        self
    }

    pub fn with_noise(mut self, amplitude: f32, frequency: f32) -> Self {
        self.noise_amplitude = amplitude;
        self.noise_frequency = frequency;
        self
    }

    pub fn with_max_slope_percent(mut self, max_slope_percent: f32) -> Self {
        self.max_slope_percent = max_slope_percent;
        self
    }

    pub fn with_undulation(mut self, params: UndulationParams) -> Self {
        self.undulation = Some(params);
        self
    }

    pub fn with_tiers(mut self, params: TierParams) -> Self {
        self.tiers = Some(params);
        self
    }

    pub fn with_ridges(mut self, params: RidgeParams) -> Self {
        self.ridges = Some(params);
        self
    }

    pub fn with_swales(mut self, params: SwaleParams) -> Self {
        self.swales = Some(params);
        self
    }

    pub fn with_crown(mut self, params: CrownParams) -> Self {
        self.crown = Some(params);
        self
    }

    pub fn with_false_front(mut self, params: FalseFrontParams) -> Self {
        self.false_front = Some(params);
        self
    }

    /// Every optional feature enabled with default parameters.
    pub fn all_features() -> Self {
        Self::default()
            .with_undulation(UndulationParams::default())
            .with_tiers(TierParams::default())
            .with_ridges(RidgeParams::default())
            .with_swales(SwaleParams::default())
            .with_crown(CrownParams::default())
            .with_false_front(FalseFrontParams::default())
    }

    /// Number of optional feature blocks that are enabled.
    pub fn active_feature_count(&self) -> usize {
        [
            self.undulation.is_some(),
            self.tiers.is_some(),
            self.ridges.is_some(),
            self.swales.is_some(),
            self.crown.is_some(),
            self.false_front.is_some(),
        ]
        .iter()
        .filter(|on| **on)
        .count()
    }

    /// Unit fall direction of the base slope.
    pub fn base_slope_direction(&self) -> Vec2 {
        Vec2::from_angle(self.base_slope_direction_degrees.to_radians())
    }

    pub fn validate(&self) -> Result<()> {
        surface_non_negative("base_slope_percent", self.base_slope_percent)?;
        if self.base_slope_percent > self.max_slope_percent {
            return Err(Error::InvalidSurface(format!(
                "base slope {}% exceeds the slope cap {}%",
                self.base_slope_percent, self.max_slope_percent
            )));
        }
        surface_finite("base_slope_direction_degrees", self.base_slope_direction_degrees)?;
        surface_non_negative("noise_amplitude", self.noise_amplitude)?;
        surface_non_negative("noise_frequency", self.noise_frequency)?;
        ensure_positive("max_slope_percent", self.max_slope_percent)?;

        if let Some(u) = &self.undulation {
            surface_non_negative("undulation.amplitude", u.amplitude)?;
            surface_positive("undulation.wavelength", u.wavelength)?;
        }
        if let Some(t) = &self.tiers {
            surface_non_negative("tiers.step_height", t.step_height)?;
            surface_positive("tiers.transition_width", t.transition_width)?;
            surface_finite("tiers.direction_degrees", t.direction_degrees)?;
        }
        if let Some(r) = &self.ridges {
            surface_non_negative("ridges.height", r.height)?;
            surface_positive("ridges.width", r.width)?;
        }
        if let Some(s) = &self.swales {
            surface_non_negative("swales.depth", s.depth)?;
            surface_positive("swales.width", s.width)?;
        }
        if let Some(c) = &self.crown {
            surface_non_negative("crown.height", c.height)?;
            surface_positive("crown.radius_fraction", c.radius_fraction)?;
            if !c.offset.is_finite() {
                return Err(Error::InvalidSurface("crown.offset must be finite".into()));
            }
        }
        if let Some(f) = &self.false_front {
            surface_non_negative("false_front.height", f.height)?;
            surface_positive("false_front.depth", f.depth)?;
            surface_finite("false_front.direction_degrees", f.direction_degrees)?;
        }
        Ok(())
    }
}

fn surface_finite(name: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidSurface(format!("{name} must be finite")))
    }
}

fn surface_non_negative(name: &str, value: f32) -> Result<()> {
    ensure_non_negative(name, value).map_err(|_| {
        Error::InvalidSurface(format!("{name} must be finite and >= 0 (got {value})"))
    })
}

fn surface_positive(name: &str, value: f32) -> Result<()> {
    ensure_positive(name, value)
        .map_err(|_| Error::InvalidSurface(format!("{name} must be finite and > 0 (got {value})")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_active_features() {
        assert_eq!(GreenSurfaceSpec::default().active_feature_count(), 0);
        assert_eq!(GreenSurfaceSpec::all_features().active_feature_count(), 6);
        let spec = GreenSurfaceSpec::flat().with_crown(CrownParams::default());
        assert_eq!(spec.active_feature_count(), 1);
    }

    #[test]
    fn validation_rejects_nan_and_negative_parameters() {
        assert!(GreenSurfaceSpec::all_features().validate().is_ok());
        let nan = GreenSurfaceSpec::default().with_noise(f32::NAN, 0.3);
        assert!(matches!(nan.validate(), Err(Error::InvalidSurface(_))));
        let negative = GreenSurfaceSpec::flat().with_ridges(RidgeParams {
            height: -0.1,
            ..Default::default()
        });
        assert!(matches!(negative.validate(), Err(Error::InvalidSurface(_))));
        let zero_width = GreenSurfaceSpec::flat().with_swales(SwaleParams {
            width: 0.0,
            ..Default::default()
        });
        assert!(zero_width.validate().is_err());
    }

    #[test]
    fn base_slope_above_cap_is_rejected() {
        let steep = GreenSurfaceSpec::flat().with_base_slope(35.0, 0.0);
        assert!(matches!(steep.validate(), Err(Error::InvalidSurface(_))));
    }

    #[test]
    fn base_direction_follows_compass_convention() {
        let spec = GreenSurfaceSpec::flat().with_base_slope(2.0, 90.0);
        let dir = spec.base_slope_direction();
        assert!(dir.x.abs() < 1e-6);
        assert!((dir.y - 1.0).abs() < 1e-6);
    }
}
