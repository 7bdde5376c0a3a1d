//! Body-diagram injury annotator.
//!
//! Owns the marker list for one form being edited. Positions are captured as
//! percentages of the silhouette image's rendered size and converted back to
//! pixels for whatever size the image currently has, so storage never depends
//! on a particular viewport.
//!
//! Geometry is only known once an image has loaded. Until
//! [`InjuryAnnotator::image_loaded`] is called for a view, clicks on that view
//! are ignored and it cannot be rendered.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::models::injury::{BodyView, InjuryMarker, InjuryType};

#[derive(Debug, Error, PartialEq)]
pub enum AnnotateError {
    #[error("{0} image has not finished loading")]
    ImageNotReady(BodyView),

    #[error("invalid image geometry {width}x{height}")]
    InvalidGeometry { width: f64, height: f64 },

    #[error("invalid click position ({x}, {y})")]
    InvalidClick { x: f64, y: f64 },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Rendered size of a silhouette image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImageGeometry {
    pub width: f64,
    pub height: f64,
}

impl ImageGeometry {
    pub fn new(width: f64, height: f64) -> Result<Self, AnnotateError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(AnnotateError::InvalidGeometry { width, height });
        }
        Ok(Self { width, height })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ImageState {
    #[default]
    Loading,
    Ready(ImageGeometry),
}

/// A marker positioned for the current display size of its image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlacedMarker {
    pub number: u32,
    pub injury_type: InjuryType,
    pub view: BodyView,
    pub left_px: f64,
    pub top_px: f64,
    pub notes: Option<String>,
}

/// Convert a pixel offset within an image to a percentage of its extent,
/// clamped into [0, 100].
pub fn to_percent(pixel: f64, extent: f64) -> f64 {
    (100.0 * pixel / extent).clamp(0.0, 100.0)
}

pub fn to_pixel(percent: f64, extent: f64) -> f64 {
    percent * extent / 100.0
}

/// Place markers of `view` for an image of the given size.
pub fn place_markers(
    markers: &[InjuryMarker],
    view: BodyView,
    geometry: ImageGeometry,
) -> Vec<PlacedMarker> {
    markers
        .iter()
        .filter(|m| m.view == view)
        .map(|m| PlacedMarker {
            number: m.number,
            injury_type: m.injury_type,
            view: m.view,
            left_px: to_pixel(m.x, geometry.width),
            top_px: to_pixel(m.y, geometry.height),
            notes: m.notes.clone(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct InjuryAnnotator {
    markers: Vec<InjuryMarker>,
    next_number: u32,
    selected_type: InjuryType,
    front: ImageState,
    back: ImageState,
}

impl Default for InjuryAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl InjuryAnnotator {
    pub fn new() -> Self {
        Self {
            markers: Vec::new(),
            next_number: 1,
            selected_type: InjuryType::Other,
            front: ImageState::Loading,
            back: ImageState::Loading,
        }
    }

    /// Reset the annotator with the markers of a stored form (edit view).
    /// Image readiness is kept; numbering resumes after the highest ordinal.
    pub fn load(&mut self, markers: Vec<InjuryMarker>) {
        self.next_number = markers
            .iter()
            .map(|m| m.number)
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        self.markers = markers;
    }

    /// Record that a view's image has loaded (or been resized) to `geometry`.
    pub fn image_loaded(&mut self, view: BodyView, geometry: ImageGeometry) {
        *self.state_mut(view) = ImageState::Ready(geometry);
    }

    pub fn image_state(&self, view: BodyView) -> ImageState {
        match view {
            BodyView::Front => self.front,
            BodyView::Back => self.back,
        }
    }

    pub fn select_type(&mut self, injury_type: InjuryType) {
        self.selected_type = injury_type;
    }

    /// Record a click at pixel offset (`click_x`, `click_y`) within `view`'s
    /// image as a new marker of the selected type.
    pub fn capture(
        &mut self,
        view: BodyView,
        click_x: f64,
        click_y: f64,
        notes: Option<String>,
    ) -> Result<&InjuryMarker, AnnotateError> {
        let geometry = self.geometry(view)?;
        if !(click_x.is_finite() && click_y.is_finite()) {
            return Err(AnnotateError::InvalidClick {
                x: click_x,
                y: click_y,
            });
        }

        let marker = InjuryMarker {
            number: self.next_number,
            injury_type: self.selected_type,
            view,
            x: to_percent(click_x, geometry.width),
            y: to_percent(click_y, geometry.height),
            notes: notes.filter(|n| !n.trim().is_empty()),
        };
        self.next_number = self.next_number.saturating_add(1);
        self.markers.push(marker);

        let idx = self.markers.len() - 1;
        Ok(&self.markers[idx])
    }

    /// Pixel positions of `view`'s markers at the image's current size.
    pub fn render(&self, view: BodyView) -> Result<Vec<PlacedMarker>, AnnotateError> {
        let geometry = self.geometry(view)?;
        Ok(place_markers(&self.markers, view, geometry))
    }

    /// Remove one marker. Its number is not reused.
    pub fn remove(&mut self, number: u32) -> Option<InjuryMarker> {
        let idx = self.markers.iter().position(|m| m.number == number)?;
        Some(self.markers.remove(idx))
    }

    /// Remove every marker. Numbering continues from where it was.
    pub fn clear_all(&mut self) {
        self.markers.clear();
    }

    pub fn markers(&self) -> &[InjuryMarker] {
        &self.markers
    }

    /// The serialized marker list mirrored into the form's hidden field.
    pub fn to_field_value(&self) -> Result<String, AnnotateError> {
        serde_json::to_string(&self.markers)
            .map_err(|e| AnnotateError::Serialization(e.to_string()))
    }

    fn geometry(&self, view: BodyView) -> Result<ImageGeometry, AnnotateError> {
        match self.image_state(view) {
            ImageState::Ready(geometry) => Ok(geometry),
            ImageState::Loading => Err(AnnotateError::ImageNotReady(view)),
        }
    }

    fn state_mut(&mut self, view: BodyView) -> &mut ImageState {
        match view {
            BodyView::Front => &mut self.front,
            BodyView::Back => &mut self.back,
        }
    }
}
