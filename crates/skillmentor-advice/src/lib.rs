//! skillmentor-advice
//!
//! Category routing, rotating rule-based advice, optional generative phrasing
//! and the [`SkillMentor`] request pipeline built on top of them.

pub mod backend;
pub mod catalog;
pub mod classifier;
pub mod generator;
pub mod memory;
pub mod mentor;
pub mod personalize;
pub mod selector;

pub use backend::OllamaBackend;
pub use catalog::AdviceCatalog;
pub use classifier::{CategoryClassifier, CategoryScores, KeywordTables};
pub use generator::{AdviceSource, Generated, Generator};
pub use memory::AdviceMemory;
pub use mentor::{AdviceResponse, Feedback, PerformanceMetrics, SkillMentor};
pub use personalize::Personalizer;
pub use selector::{Advice, AdviceSelector};
