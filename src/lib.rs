#![doc(html_root_url = "https://docs.rs/dirschema/0.1.0")]
//! # dirschema
//!
//! A declarative schema language for validating the *structure* of a
//! directory tree: which paths must exist, what type they must be, what
//! their companion metadata documents must contain, and how paths relate to
//! each other. It lifts JSON-Schema-style validation from single documents
//! to whole trees.
//!
//! ## When to use this crate
//! - Run the **CLI** to check a dataset, archive, or HDF5 file against a
//!   schema as part of a CI pipeline or data-ingestion gate.
//! - Embed the **library** to validate directory structures programmatically,
//!   e.g. before accepting an upload or publishing a dataset.
//!
//! ## Quick start (CLI)
//! ```text
//! dirschema schema.yaml ./my-dataset
//! ```
//!
//! ## Quick start (library)
//! ```no_run
//! use dirschema::{DsValidator, MetaConvention};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let validator = DsValidator::from_path(Path::new("schema.yaml"), MetaConvention::default())?;
//! let report = validator.validate(Path::new("./my-dataset"))?;
//! if !report.is_empty() {
//!     println!("{}", dirschema::format_errors(&report)?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## What gets validated
//! A schema is a recursive tree of rules (see [`rule::Rule`]): primitive
//! constraints (`type`, `valid`, `validMeta`), logical combinators (`allOf`,
//! `anyOf`, `oneOf`, `not`, `if`/`then`/`else`), and path-rewriting
//! combinators (`match`/`matchStart`/`matchStop`/`rewrite`/`next`) that let a
//! rule at one path imply a rule at a derived path (e.g. "every `a_X` file
//! implies a sibling `b_X` must not exist").
//!
//! Three kinds of directory-like sources are supported transparently: real
//! directories, zip archives, and (behind the `hdf5-adapter` feature) HDF5
//! files, where groups/datasets/attributes are projected onto
//! directories/files.
//!
//! ## Exit semantics (CLI)
//! | Code | Meaning |
//! |------|---------|
//! | `0` | The validation report is empty: every path satisfied the schema. |
//! | `1` | At least one path failed; the report is printed as YAML. |

pub mod adapters;
pub mod cli;
pub mod context;
pub mod convention;
pub mod error;
pub mod evaluator;
pub mod json;
pub mod rule;
pub mod schema;
pub mod slice;
pub mod validator;

pub use context::{DsValidationError, ErrMessage, LocationErrors, ValidationReport};
pub use convention::MetaConvention;
pub use error::DsError;
pub use rule::{DSRule, Rule, TypeEnum};
pub use validator::{errors_to_json, format_errors, DsValidator};
