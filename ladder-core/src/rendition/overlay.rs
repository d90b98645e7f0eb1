//! Burned-in dynamic range marker.
//!
//! HDR renditions carry a larger green dot in the top-right corner, SDR
//! renditions a smaller white dot in the bottom-right corner. The dot is drawn
//! with ffmpeg's `drawtext` filter as a half-transparent letter `o`.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayColor {
    Green,
    White,
}

impl OverlayColor {
    /// Color name as ffmpeg understands it.
    pub fn as_str(self) -> &'static str {
        match self {
            OverlayColor::Green => "green",
            OverlayColor::White => "white",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayCorner {
    TopRight,
    BottomRight,
}

/// Geometry and color of the marker for one frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverlaySpec {
    pub color: OverlayColor,
    pub radius: u32,
    pub corner: OverlayCorner,
    pub x: u32,
    pub y: u32,
}

impl OverlaySpec {
    /// Radius is 7% (HDR) or 5% (SDR) of the height, rounded down.
    pub fn for_frame(width: u32, height: u32, is_hdr: bool) -> Self {
        let percent = if is_hdr { 7 } else { 5 };
        let radius = height * percent / 100;
        let x = width.saturating_sub(radius);

        if is_hdr {
            Self {
                color: OverlayColor::Green,
                radius,
                corner: OverlayCorner::TopRight,
                x,
                y: height * 7 / 100,
            }
        } else {
            Self {
                color: OverlayColor::White,
                radius,
                corner: OverlayCorner::BottomRight,
                x,
                y: height.saturating_sub(radius),
            }
        }
    }

    /// The `drawtext` filter that renders the marker.
    pub fn drawtext_filter(&self) -> String {
        format!(
            "drawtext=text='o':x={}:y={}:fontsize={}:fontcolor={}:alpha=0.5",
            self.x,
            self.y,
            self.radius * 2,
            self.color.as_str()
        )
    }
}
