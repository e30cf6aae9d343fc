use anyhow::{Result, bail, ensure};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MM_PER_INCH: f32 = 25.4;

/// Physical length unit accepted from the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Mm,
    Cm,
}

/// A physical length, convertible to pixels through a [`PixelScale`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub value: f32,
    pub unit: Unit,
}

impl Length {
    pub const ZERO: Length = Length {
        value: 0.0,
        unit: Unit::Mm,
    };

    pub fn mm(value: f32) -> Self {
        Length {
            value,
            unit: Unit::Mm,
        }
    }

    pub fn cm(value: f32) -> Self {
        Length {
            value,
            unit: Unit::Cm,
        }
    }

    pub fn to_mm(self) -> f32 {
        match self.unit {
            Unit::Mm => self.value,
            Unit::Cm => self.value * 10.0,
        }
    }
}

impl FromStr for Length {
    type Err = anyhow::Error;

    /// Parses strings like `"5cm"`, `"12.5 mm"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (value_str, unit) = if let Some(v) = s.strip_suffix("mm") {
            (v, Unit::Mm)
        } else if let Some(v) = s.strip_suffix("cm") {
            (v, Unit::Cm)
        } else {
            bail!("missing unit suffix (expected 'mm' or 'cm') in {s:?}");
        };
        let value: f32 = value_str
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("malformed length value in {s:?}"))?;
        ensure!(value.is_finite(), "non-finite length value in {s:?}");
        Ok(Length { value, unit })
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Unit::Mm => write!(f, "{}mm", self.value),
            Unit::Cm => write!(f, "{}cm", self.value),
        }
    }
}

/// Fixed physical-to-pixel scale factor. All raster dimensions in the engine
/// derive from lengths through this single constant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelScale {
    pub dpi: f32,
}

impl PixelScale {
    pub fn new(dpi: f32) -> Result<Self> {
        ensure!(dpi.is_finite() && dpi > 0.0, "dpi must be positive: {dpi}");
        Ok(PixelScale { dpi })
    }

    pub fn px_per_mm(self) -> f32 {
        self.dpi / MM_PER_INCH
    }

    /// Converts a length to whole pixels, rounding to nearest.
    /// Negative lengths clamp to 0.
    pub fn to_px(self, length: Length) -> u32 {
        (length.to_mm() * self.px_per_mm()).round().max(0.0) as u32
    }
}

impl Default for PixelScale {
    fn default() -> Self {
        PixelScale { dpi: 300.0 }
    }
}

/// Fixed-size page canvas in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    pub width_px: u32,
    pub height_px: u32,
}

impl PageSpec {
    pub fn try_new(width_px: u32, height_px: u32) -> Result<Self> {
        ensure!(
            width_px > 0 && height_px > 0,
            "page dimensions must be positive: {width_px}x{height_px}"
        );
        Ok(PageSpec {
            width_px,
            height_px,
        })
    }

    /// ISO A4 (210mm x 297mm). At the default 300 DPI this is 2480x3508 px.
    pub fn a4(scale: PixelScale) -> Self {
        PageSpec {
            width_px: scale.to_px(Length::mm(210.0)),
            height_px: scale.to_px(Length::mm(297.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use test_case::test_case;

    #[test]
    fn px_per_mm_at_300_dpi() {
        let scale = PixelScale::default();
        assert!(approx_eq!(f32, scale.px_per_mm(), 11.811024, epsilon = 1e-4));
    }

    #[test_case("5cm", 50.0; "cm suffix")]
    #[test_case("12.5 mm", 12.5; "mm with space")]
    #[test_case(" 3mm ", 3.0; "surrounding whitespace")]
    fn parse_valid(s: &str, expected_mm: f32) {
        let l: Length = s.parse().unwrap();
        assert!(approx_eq!(f32, l.to_mm(), expected_mm));
    }

    #[test_case("5"; "no unit")]
    #[test_case("cm"; "no value")]
    #[test_case("5in"; "unknown unit")]
    #[test_case("abc mm"; "garbage value")]
    fn parse_invalid(s: &str) {
        assert!(s.parse::<Length>().is_err());
    }

    #[test]
    fn a4_at_300_dpi_matches_print_constants() {
        let page = PageSpec::a4(PixelScale::default());
        assert_eq!(page.width_px, 2480);
        assert_eq!(page.height_px, 3508);
    }

    #[test]
    fn to_px_rounds_to_nearest() {
        let scale = PixelScale::default();
        assert_eq!(scale.to_px(Length::cm(5.0)), 591); // 590.55..
        assert_eq!(scale.to_px(Length::mm(-1.0)), 0);
    }
}
