//! Zoom and panel placement of the dialog preview

use crate::config::PanelPosition;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 4.0;

/// Zoom change per wheel notch
pub const ZOOM_STEP: f64 = 0.1;

/// Wheel delta of one notch
pub const WHEEL_NOTCH: i32 = 120;

/// Margin between the panel edge and the dialog
pub const DIALOG_MARGIN: f64 = 20.0;

/// Height of the dialog caption
pub const CAPTION_HEIGHT: f64 = 25.0;

/// Scale factor of the dialog preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    scale: f64,
}

impl Default for Zoom {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl Zoom {
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the scale; values outside `[MIN_ZOOM, MAX_ZOOM]` are ignored.
    pub fn set(&mut self, scale: f64) -> bool {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&scale) {
            return false;
        }
        self.scale = scale;
        true
    }

    /// Apply a mouse wheel delta. Returns the zoom change, `None` when the
    /// delta is less than one notch or the result would leave the zoom range.
    pub fn wheel(&mut self, delta: i32) -> Option<f64> {
        let notches = delta / WHEEL_NOTCH;
        if notches == 0 {
            return None;
        }
        let change = ZOOM_STEP * f64::from(notches);
        if !self.set(self.scale + change) {
            return None;
        }
        // Accumulated steps drift around 1.0.
        if self.scale > 0.9 && self.scale < 1.1 {
            self.scale = 1.0;
        }
        Some(change)
    }

    /// Zoom as a whole percentage.
    pub fn percentage(&self) -> i32 {
        (100.0 * self.scale).round() as i32
    }
}

/// Where the preview panel docks and how large it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelLayout {
    position: PanelPosition,
    extent: f64,
}

impl PanelLayout {
    /// Initial layout: `fraction` of the viewport plus the current margin.
    pub fn new(position: PanelPosition, fraction: f64, viewport: f64, margin: f64) -> Self {
        Self {
            position,
            extent: fraction * (viewport + margin),
        }
    }

    pub fn position(&self) -> PanelPosition {
        self.position
    }

    /// Size along the docking axis.
    pub fn extent(&self) -> f64 {
        self.extent
    }

    /// Move to another side, keeping the size the panel currently has along
    /// the new docking axis.
    pub fn redock(&mut self, position: PanelPosition, current_width: f64, current_height: f64) {
        self.extent = if position.is_horizontal() {
            current_height
        } else {
            current_width
        };
        self.position = position;
    }

    /// Width and height needed to show a dialog at the given scale.
    pub fn content_size(width: u32, height: u32, scale: f64) -> (f64, f64) {
        (
            f64::from(width) * scale + 2.0 * DIALOG_MARGIN,
            (f64::from(height) + CAPTION_HEIGHT) * scale + 2.0 * DIALOG_MARGIN,
        )
    }
}
