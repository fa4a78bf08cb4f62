// Service exports
pub mod carpool;
pub mod match_cache;
pub mod postgres;
pub mod store;

pub use carpool::{CarpoolError, CarpoolService, RideRequestOutcome};
pub use match_cache::LatestMatchCache;
pub use postgres::PostgresStore;
pub use store::{InMemoryStore, StoreError, SubmissionStore};
