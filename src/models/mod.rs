// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Coordinate, Role, VehicleType, NewSubmission, Submission, RouteMetrics, MatchView, MatchPair, MatchOutcome, SUBMISSION_SCHEMA_VERSION};
pub use requests::{CoordinateInput, SubmissionRequest, RequestError};
pub use responses::{FindRideResponse, ProvideServiceResponse, HealthResponse, MessageResponse, ErrorResponse};
