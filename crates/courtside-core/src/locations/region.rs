use serde::{Deserialize, Serialize};

use super::GeoPoint;
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub north_east: GeoPoint,
    pub south_west: GeoPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CenterPoint {
    pub center: GeoPoint,
    pub radius_miles: f64,
}

/// A validated geographic area of interest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Region {
    BoundingBox(BoundingBox),
    CenterPoint(CenterPoint),
}

/// Region as received from a transport layer, where both shapes are
/// optional fields. At most one may be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionInput {
    pub bounding_box: Option<BoundingBox>,
    pub center_point: Option<CenterPoint>,
}

impl RegionInput {
    /// Convert into a [`Region`], validating coordinates and radius.
    ///
    /// Returns `Ok(None)` when neither shape is set.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when both shapes are given, any
    /// corner or center is out of range, or the radius is not positive.
    pub fn into_region(self) -> Result<Option<Region>, CoreError> {
        match (self.bounding_box, self.center_point) {
            (Some(_), Some(_)) => Err(CoreError::Validation(
                "boundingBox and centerPoint are mutually exclusive".to_string(),
            )),
            (Some(bbox), None) => {
                bbox.north_east.validate()?;
                bbox.south_west.validate()?;
                Ok(Some(Region::BoundingBox(bbox)))
            }
            (None, Some(cp)) => {
                cp.center.validate()?;
                if !cp.radius_miles.is_finite() || cp.radius_miles <= 0.0 {
                    return Err(CoreError::Validation(format!(
                        "radius must be a positive number of miles, got {}",
                        cp.radius_miles
                    )));
                }
                Ok(Some(Region::CenterPoint(cp)))
            }
            (None, None) => Ok(None),
        }
    }
}
