//! # Siteforge Generator
//!
//! Site generation engines for the build workflow.

pub mod generator;
pub mod scripted;
pub mod template;
pub mod timeout;

pub use generator::{Generator, GeneratorConfig};
pub use scripted::ScriptedGenerator;
pub use template::TemplateGenerator;
pub use timeout::TimeoutGenerator;
