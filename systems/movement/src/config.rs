//! Movement tunables and their validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunables for a [`crate::MovementController`].
///
/// Deserializes from partial documents; missing fields keep their defaults.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Edge length of a square cell in pixels.
    pub tile_size: f32,
    /// Interpolation speed in pixels per second.
    pub pixel_speed: f32,
    /// Remaining distance, in pixels, below which a move snaps to its target.
    pub arrival_epsilon: f32,
    /// When set, row 0 is drawn at the top of the viewport.
    pub flip_y: bool,
    /// When set, each step's pixel speed is multiplied by the destination
    /// tile's speed factor.
    pub scale_by_terrain: bool,
}

impl MovementConfig {
    /// Checks that the configuration describes a usable controller.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(ConfigError::TileSize(self.tile_size));
        }
        if !(self.pixel_speed.is_finite() && self.pixel_speed > 0.0) {
            return Err(ConfigError::PixelSpeed(self.pixel_speed));
        }
        if !(self.arrival_epsilon.is_finite() && self.arrival_epsilon >= 0.0) {
            return Err(ConfigError::ArrivalEpsilon(self.arrival_epsilon));
        }
        Ok(())
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            tile_size: 24.0,
            pixel_speed: 140.0,
            arrival_epsilon: 0.5,
            flip_y: true,
            scale_by_terrain: false,
        }
    }
}

/// Invalid [`MovementConfig`] values.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Tile size must be a positive, finite number of pixels.
    #[error("tile size must be positive, got {0}")]
    TileSize(f32),
    /// Pixel speed must be a positive, finite number of pixels per second.
    #[error("pixel speed must be positive, got {0}")]
    PixelSpeed(f32),
    /// Arrival epsilon must be a non-negative, finite number of pixels.
    #[error("arrival epsilon must not be negative, got {0}")]
    ArrivalEpsilon(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert_eq!(MovementConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_degenerate_values() {
        let config = MovementConfig {
            tile_size: 0.0,
            ..MovementConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::TileSize(0.0)));

        let config = MovementConfig {
            pixel_speed: -5.0,
            ..MovementConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::PixelSpeed(-5.0)));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: MovementConfig =
            toml::from_str("pixel_speed = 60.0\nflip_y = false").expect("valid toml");
        assert_eq!(config.pixel_speed, 60.0);
        assert!(!config.flip_y);
        assert_eq!(config.tile_size, MovementConfig::default().tile_size);
    }
}
