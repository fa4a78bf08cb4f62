use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::domain::{Coordinate, NewSubmission, Role, VehicleType};

/// Coordinate as received over the wire, range-checked before use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct CoordinateInput {
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
}

impl From<CoordinateInput> for Coordinate {
    fn from(value: CoordinateInput) -> Self {
        Coordinate::new(value.latitude, value.longitude)
    }
}

/// Body for both `/find-ride` and `/provide-service`
///
/// ```json
/// {
///   "userName": "string",
///   "contactNo": "string",
///   "source": { "lat": 12.90, "lng": 77.50 },
///   "destination": { "lat": 12.95, "lng": 77.60 },
///   "sourceAddress": "optional",
///   "destinationAddress": "optional",
///   "vehicleType": "bike|car|sedan"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmissionRequest {
    #[validate(length(min = 1), custom(function = "not_blank"))]
    #[serde(alias = "user_name", rename = "userName")]
    pub user_name: String,
    #[validate(length(min = 1), custom(function = "not_blank"))]
    #[serde(alias = "contact_no", rename = "contactNo")]
    pub contact_no: String,
    #[validate(nested)]
    pub source: CoordinateInput,
    #[validate(nested)]
    pub destination: CoordinateInput,
    #[serde(alias = "source_address", rename = "sourceAddress", default)]
    pub source_address: Option<String>,
    #[serde(alias = "destination_address", rename = "destinationAddress", default)]
    pub destination_address: Option<String>,
    #[validate(length(min = 1))]
    #[serde(alias = "vehicle_type", rename = "vehicleType")]
    pub vehicle_type: String,
}

/// Why a request could not become a submission
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("{0}")]
    Fields(#[from] ValidationErrors),

    #[error("Invalid vehicle type: {0} (expected bike, car or sedan)")]
    VehicleType(String),
}

impl SubmissionRequest {
    /// Validate the request and turn it into a submission for `role`
    pub fn into_new_submission(self, role: Role) -> Result<NewSubmission, RequestError> {
        self.validate()?;

        let vehicle_type = self
            .vehicle_type
            .parse::<VehicleType>()
            .map_err(|_| RequestError::VehicleType(self.vehicle_type.clone()))?;

        Ok(NewSubmission {
            user_name: self.user_name.trim().to_string(),
            contact_no: self.contact_no.trim().to_string(),
            role,
            source: self.source.into(),
            destination: self.destination.into(),
            source_address: non_blank(self.source_address),
            destination_address: non_blank(self.destination_address),
            vehicle_type,
        })
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SubmissionRequest {
        serde_json::from_str(
            r#"{
                "userName": "Ravi",
                "contactNo": "9000000002",
                "source": {"lat": 12.90, "lng": 77.50},
                "destination": {"lat": 12.95, "lng": 77.60},
                "sourceAddress": "  ",
                "vehicleType": "Car"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_valid_request_converts() {
        let submission = request().into_new_submission(Role::Taker).unwrap();
        assert_eq!(submission.vehicle_type, VehicleType::Car);
        assert_eq!(submission.role, Role::Taker);
        assert_eq!(submission.source, Coordinate::new(12.90, 77.50));
        assert_eq!(submission.source_address, None);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut req = request();
        req.user_name = String::new();
        assert!(matches!(
            req.into_new_submission(Role::Provider),
            Err(RequestError::Fields(_))
        ));
    }

    #[test]
    fn test_whitespace_only_identity_rejected() {
        let mut req = request();
        req.user_name = "   ".to_string();
        assert!(matches!(
            req.into_new_submission(Role::Provider),
            Err(RequestError::Fields(e)) if e.field_errors().contains_key("user_name")
        ));

        let mut req = request();
        req.contact_no = " \t ".to_string();
        assert!(matches!(
            req.into_new_submission(Role::Taker),
            Err(RequestError::Fields(e)) if e.field_errors().contains_key("contact_no")
        ));
    }

    #[test]
    fn test_identity_is_trimmed() {
        let mut req = request();
        req.user_name = "  Ravi ".to_string();
        let submission = req.into_new_submission(Role::Taker).unwrap();
        assert_eq!(submission.user_name, "Ravi");
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let mut req = request();
        req.destination.latitude = 91.0;
        assert!(matches!(
            req.into_new_submission(Role::Taker),
            Err(RequestError::Fields(_))
        ));
    }

    #[test]
    fn test_unknown_vehicle_rejected() {
        let mut req = request();
        req.vehicle_type = "hovercraft".to_string();
        assert!(matches!(
            req.into_new_submission(Role::Taker),
            Err(RequestError::VehicleType(v)) if v == "hovercraft"
        ));
    }

    #[test]
    fn test_missing_field_fails_to_deserialize() {
        let result = serde_json::from_str::<SubmissionRequest>(
            r#"{"userName": "Ravi", "contactNo": "1", "vehicleType": "car"}"#,
        );
        assert!(result.is_err());
    }
}
