// Geocoding types.
// Coordinates and the geocoding API response format.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create coordinates from latitude and longitude.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Cell values for the latitude and longitude columns.
    pub fn to_cells(self) -> (String, String) {
        (self.lat.to_string(), self.lng.to_string())
    }
}

/// Address search response.
#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    #[serde(default)]
    pub documents: Vec<GeocodeDocument>,
}

/// One candidate match. `x` is longitude and `y` latitude.
#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeDocument {
    pub x: String,
    pub y: String,
}

impl GeocodeResponse {
    /// Coordinates of the first candidate, if any.
    pub fn first_match(&self) -> Result<Option<Coordinates>> {
        let Some(doc) = self.documents.first() else {
            return Ok(None);
        };

        let parse = |field: &str, value: &str| {
            value.trim().parse::<f64>().map_err(|_| {
                SyncError::InvalidResponse(format!("{} is not a number: {:?}", field, value))
            })
        };
        Ok(Some(Coordinates {
            lat: parse("y", &doc.y)?,
            lng: parse("x", &doc.x)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let body = r#"{
            "meta": {"total_count": 2},
            "documents": [
                {"address_name": "서울 강남구 역삼동 737", "x": "127.0286", "y": "37.4999"},
                {"address_name": "서울 강남구 역삼동 738", "x": "127.0300", "y": "37.5000"}
            ]
        }"#;
        let response: GeocodeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.first_match().unwrap(),
            Some(Coordinates::new(37.4999, 127.0286))
        );
    }

    #[test]
    fn test_no_documents_is_none() {
        let response: GeocodeResponse =
            serde_json::from_str(r#"{"meta": {"total_count": 0}, "documents": []}"#).unwrap();
        assert_eq!(response.first_match().unwrap(), None);
    }

    #[test]
    fn test_bad_coordinate_is_invalid_response() {
        let response: GeocodeResponse =
            serde_json::from_str(r#"{"documents": [{"x": "east", "y": "37.5"}]}"#).unwrap();
        assert!(matches!(
            response.first_match(),
            Err(SyncError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_to_cells() {
        let (lat, lng) = Coordinates::new(37.4999, 127.0286).to_cells();
        assert_eq!(lat, "37.4999");
        assert_eq!(lng, "127.0286");
    }
}
