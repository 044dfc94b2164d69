pub mod actor;
pub mod error;

pub use actor::{Actor, Role};
pub use error::DomainError;
