//! # Tools
//!
//! The fixed catalog of EKS and Helm inspection tools and the machinery that runs
//! them: schemas and validation, the registry, typed arguments, executors, the
//! dispatcher and the response envelope.

pub mod args;
pub mod catalog;
pub mod descriptor;
pub mod dispatcher;
pub mod envelope;
pub mod executors;
pub mod help;
pub mod registry;
pub mod schema;
pub mod summary;

pub use catalog::{Category, ToolName};
pub use descriptor::ToolDescriptor;
pub use dispatcher::{DispatchError, Dispatcher};
pub use envelope::{
    EnvelopeBuilder, ErrorHandling, ErrorKind, ResponseOptions, StructuredResponse, Summary, SummaryFormat,
};
pub use registry::{catalog, ToolRegistry};
pub use schema::{ArgumentSchema, FieldSpec, FieldType, ValidatedArgs, ValidationError};
