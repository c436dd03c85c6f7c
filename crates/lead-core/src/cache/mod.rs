//! Cache de transiciones por lead.

mod slot;
mod store;

pub use slot::{CacheLookup, CacheSlot, SlotState};
pub use store::{Claim, TransitionCache};
