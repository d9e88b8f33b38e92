//! Template catalog, parsing and rendering
//!
//! Templates use a small strict subset of the Handlebars syntax: `{{key}}`,
//! `{{#if key}}`/`{{#unless key}}` with an optional `{{else}}`, and `{{#each list}}`.
//! Every referenced key must be bound; `\{{` emits a literal `{{`.

pub mod context;
pub mod engine;
pub mod error;
pub mod parser;
pub mod registry;

pub use context::GenerationContext;
pub use engine::{RenderedFile, TemplateEngine};
pub use error::TemplateError;
pub use parser::{ParsedTemplate, TemplateElement, TemplateParser};
pub use registry::{TemplateDescriptor, TemplateRegistry};
