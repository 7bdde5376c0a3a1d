use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::limits::MAX_INJURY_NOTES_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum InjuryType {
    Laceration,
    Fracture,
    Burn,
    Contusion,
    Abrasion,
    Other,
}

impl InjuryType {
    pub const ALL: [InjuryType; 6] = [
        InjuryType::Laceration,
        InjuryType::Fracture,
        InjuryType::Burn,
        InjuryType::Contusion,
        InjuryType::Abrasion,
        InjuryType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InjuryType::Laceration => "laceration",
            InjuryType::Fracture => "fracture",
            InjuryType::Burn => "burn",
            InjuryType::Contusion => "contusion",
            InjuryType::Abrasion => "abrasion",
            InjuryType::Other => "other",
        }
    }
}

impl fmt::Display for InjuryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InjuryType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InjuryType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::InvalidEnum {
                field: "injury_type",
                value: s.to_string(),
            })
    }
}

/// Which silhouette of the body diagram a marker sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum BodyView {
    Front,
    Back,
}

impl BodyView {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyView::Front => "front",
            BodyView::Back => "back",
        }
    }
}

impl fmt::Display for BodyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyView {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front" => Ok(BodyView::Front),
            "back" => Ok(BodyView::Back),
            other => Err(CoreError::InvalidEnum {
                field: "body_view",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// One annotated point on a body silhouette.
///
/// `x` and `y` are percentages (0–100) of the silhouette image's rendered
/// width and height, so a marker redraws at the same relative position
/// whatever size the image is displayed at. The wire names (`id`, `type`)
/// match the hidden form field the intake wizard submits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InjuryMarker {
    #[serde(rename = "id")]
    pub number: u32,
    #[serde(rename = "type")]
    pub injury_type: InjuryType,
    pub view: BodyView,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl InjuryMarker {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.number == 0 {
            return Err(CoreError::InvalidInjuryNumber(self.number));
        }
        for (axis, value) in [(Axis::X, self.x), (Axis::Y, self.y)] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(CoreError::CoordinateOutOfRange {
                    number: self.number,
                    axis,
                    value,
                });
            }
        }
        if let Some(notes) = &self.notes
            && notes.chars().count() > MAX_INJURY_NOTES_LEN
        {
            return Err(CoreError::InjuryNotesTooLong {
                number: self.number,
                max: MAX_INJURY_NOTES_LEN,
            });
        }
        Ok(())
    }
}

/// The injury list as it arrives with a form submission.
///
/// The intake wizard mirrors its marker list into a hidden field, so the list
/// usually arrives as a JSON-encoded string; API clients may send the array
/// directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum InjuryListField {
    Encoded(String),
    List(Vec<InjuryMarker>),
}

impl Default for InjuryListField {
    fn default() -> Self {
        InjuryListField::List(Vec::new())
    }
}

impl InjuryListField {
    pub fn decode(self) -> Result<Vec<InjuryMarker>, CoreError> {
        let mut markers = match self {
            InjuryListField::List(list) => list,
            InjuryListField::Encoded(raw) if raw.trim().is_empty() => Vec::new(),
            InjuryListField::Encoded(raw) => serde_json::from_str(&raw)?,
        };
        for marker in &mut markers {
            if marker.notes.as_deref().is_some_and(|n| n.trim().is_empty()) {
                marker.notes = None;
            }
        }
        Ok(markers)
    }
}

/// Check a complete injury list before it is written.
///
/// The count limit is checked first so an oversized list is rejected without
/// inspecting its entries.
pub fn validate_injuries(markers: &[InjuryMarker], max: usize) -> Result<(), CoreError> {
    if markers.len() > max {
        return Err(CoreError::TooManyInjuries {
            count: markers.len(),
            max,
        });
    }

    let mut seen = HashSet::with_capacity(markers.len());
    for marker in markers {
        marker.validate()?;
        if !seen.insert(marker.number) {
            return Err(CoreError::DuplicateInjuryNumber(marker.number));
        }
    }
    Ok(())
}
