use crate::errors::PieceError;
use crate::units::Length;
use serde::{Deserialize, Serialize};

/// Which dimension of the trimmed artwork is driven to the target size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleAxis {
    /// The larger of (width, height) ends up at the target size.
    LongestEdge,
    Width,
    Height,
}

/// Describes how one source image becomes `quantity` placed pieces.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceConfig {
    /// Physical size of the scale axis after resizing.
    pub target_size: Length,
    pub scale_axis: ScaleAxis,
    /// Uniform outward expansion distance around the silhouette. Zero disables
    /// the bleed mask entirely: the footprint is the bare alpha silhouette.
    pub bleed: Length,
    /// Controls the blur radius used to round the corners of the expanded mask.
    pub smoothing_level: u32,
    /// Stroke width of the visible cut-guide outline, `None` to disable.
    pub cut_line: Option<Length>,
    /// Horizontal flip before any processing.
    pub mirror: bool,
    /// Number of copies to place. Zero is valid and produces nothing.
    pub quantity: usize,
}

impl Default for PieceConfig {
    fn default() -> Self {
        PieceConfig {
            target_size: Length::mm(50.0),
            scale_axis: ScaleAxis::LongestEdge,
            bleed: Length::mm(2.0),
            smoothing_level: 2,
            cut_line: None,
            mirror: false,
            quantity: 1,
        }
    }
}

impl PieceConfig {
    /// Checks the config invariants before any pixel work starts.
    pub fn validate(&self) -> Result<(), PieceError> {
        let target_mm = self.target_size.to_mm();
        if !target_mm.is_finite() || target_mm <= 0.0 {
            return Err(PieceError::InvalidConfig(format!(
                "target size must be positive, got {}",
                self.target_size
            )));
        }
        let bleed_mm = self.bleed.to_mm();
        if !bleed_mm.is_finite() || bleed_mm < 0.0 {
            return Err(PieceError::InvalidConfig(format!(
                "bleed must be non-negative, got {}",
                self.bleed
            )));
        }
        if let Some(stroke) = self.cut_line {
            let stroke_mm = stroke.to_mm();
            if !stroke_mm.is_finite() || stroke_mm <= 0.0 {
                return Err(PieceError::InvalidConfig(format!(
                    "cut line stroke width must be positive, got {stroke}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(PieceConfig::default().validate(), Ok(()));
    }

    #[test]
    fn non_positive_target_size_is_rejected() {
        let config = PieceConfig {
            target_size: Length::mm(0.0),
            ..PieceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PieceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn negative_bleed_is_rejected() {
        let config = PieceConfig {
            bleed: Length::mm(-1.0),
            ..PieceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PieceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = PieceConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: PieceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }
}
