//! Domain types and models

pub mod availability;
pub mod mutation;
pub mod operation;
pub mod resource;
pub mod response;
pub mod vocabulary;

pub use availability::{AvailabilityState, AvailabilityStatus, DegradedNotice};
pub use mutation::{OfflineDeletion, PendingSyntheticMutation};
pub use operation::{HttpMethod, Operation, OperationClass, Payload, ResponseShape};
pub use resource::{EndpointCandidate, ResourceFamily};
pub use response::{GatewayResponse, MutationOutcome, ReplayReport, ResponseOrigin};
pub use vocabulary::{StatusPair, VocabularyDefinition};
