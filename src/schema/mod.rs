//! Schema and value model
//!
//! Schemas are plain serializable data: a mapping from field name to an
//! extraction rule, where processor pipelines reference a closed set of named
//! transforms rather than arbitrary callables.

mod processors;
mod types;

pub use processors::{Processor, ProcessorFault};
pub use types::{load_schema, FieldSpec, Record, Schema, StructuredField, Value};
