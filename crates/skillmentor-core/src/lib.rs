//! Shared domain types, error taxonomy, configuration and corpus loading for
//! the SkillMentor workspace.

pub mod config;
pub mod corpus;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use types::{Category, Document, DocumentId};
