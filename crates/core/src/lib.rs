pub mod config;
pub mod domain;
pub mod errors;
pub mod intent;
pub mod registry;

pub use domain::build::{BuildInfo, Job};
pub use domain::message::ChatMessage;
pub use domain::response::{ChatbotResponse, ResponseKind, ResponsePayload};
pub use errors::{ApplicationError, InterfaceError, ProviderError, ValidationError};
pub use intent::{classify, Intent};
pub use registry::{BuildRegistry, InMemoryJobProvider, JobProvider, ScheduledJob};
