//! Domain layer - Business abstractions
//!
//! Value rules (addresses, field validation), the error taxonomy, and the
//! repository contracts consumed by the API layer.

pub mod address;
pub mod entity_type;
pub mod errors;
pub mod repositories;
pub mod validation;

pub use entity_type::{AttributeType, AttributeValue, EntityType};
pub use errors::{DomainError, DomainResult};
pub use repositories::*;
