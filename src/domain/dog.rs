use serde::{Deserialize, Serialize};

use crate::domain::types::DogId;

/// A dog record as returned by the bulk-fetch endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dog {
    pub id: DogId,
    pub img: String,
    pub name: String,
    pub age: u32,
    pub zip_code: String,
    pub breed: String,
}

/// Re-orders `dogs` to follow `ids`.
///
/// The bulk-fetch endpoint does not preserve request order, so results are
/// matched back by identifier. Records the service did not return are skipped.
pub fn order_by_ids(ids: &[DogId], dogs: Vec<Dog>) -> Vec<Dog> {
    let mut by_id: std::collections::HashMap<DogId, Dog> =
        dogs.into_iter().map(|dog| (dog.id.clone(), dog)).collect();

    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
