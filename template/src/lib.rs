//! Data model and merge logic for remote config templates.
//!
//! The merge operation is pure: it combines a previously-fetched server
//! template with a locally-authored parameter document and reports what
//! changed. Fetching and publishing live in the `upstream` crate.

pub mod document;
pub mod merger;
pub mod types;

pub use document::LocalDocument;
pub use merger::{MergeOutcome, merge};
pub use types::{Parameter, ParameterValue, RemoteTemplate, TemplateVersion, ValueType};
