pub mod errors;
pub mod favorites;
pub mod filters;
pub mod geolocation;
pub mod notifications;
pub mod orchestrator;
pub mod search;
pub mod session;

pub use errors::{ServiceError, ServiceResult};
