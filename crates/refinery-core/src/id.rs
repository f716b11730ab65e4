use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a listener registered on an [`EventBus`](crate::event::EventBus).
    pub struct SubscriptionId;
}

/// Identifies a resource type (wood, plank, ore...). Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemTypeId(pub u32);

/// A count of resource units. Signed so that negative caller input can be
/// detected and rejected rather than wrapping.
pub type Quantity = i64;
