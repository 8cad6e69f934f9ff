//! Domain values exchanged between the search service and the client components.

pub mod dog;
pub mod location;
pub mod sort;
pub mod types;
