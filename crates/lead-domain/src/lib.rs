// lead-domain library entry point
pub mod catalog;
pub mod error;
pub mod lead;
pub mod status;
pub mod transition;
pub use catalog::StatusCatalog;
pub use error::DomainError;
pub use lead::{CommitOutcome, Lead, LeadId};
pub use status::LeadStatus;
pub use transition::{StatusOption, TransitionEdge, MANUAL_CHANGE_DESCRIPTION, MAX_WEIGHT};
