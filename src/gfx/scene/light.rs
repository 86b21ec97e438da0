//! Scene lighting: one ambient term and one point light

use crate::solar::params::LightingParams;

/// Lights shared by every Phong material in the scene.
///
/// `point_position` is in world space, after the scene root rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLights {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub point_color: [f32; 3],
    pub point_intensity: f32,
    pub point_position: [f32; 3],
}

impl Default for SceneLights {
    fn default() -> Self {
        Self::from(&LightingParams::default())
    }
}

impl From<&LightingParams> for SceneLights {
    fn from(params: &LightingParams) -> Self {
        Self {
            ambient_color: params.ambient_color,
            ambient_intensity: params.ambient_intensity,
            point_color: params.point_color,
            point_intensity: params.point_intensity,
            point_position: params.point_position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_light_sits_beside_the_earth() {
        let lights = SceneLights::default();
        assert_eq!(lights.point_position, [5.0, 3.0, 5.0]);
        assert_eq!(lights.point_intensity, 1.0);
        assert!(lights.ambient_intensity > 0.0);
    }
}
