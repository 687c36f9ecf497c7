//! WFF Validator
//!
//! Validates declarative watch face documents against every revision of the
//! versioned watch face format at once, reporting per revision whether the
//! document conforms and, if not, why.
//!
//! ## Architecture
//!
//! ```text
//! Validator (tree walk)
//! └── Constraint tree (per element tag, built with the builder DSL)
//!     └── Conditions (element / value / expression predicates)
//!         └── Expression engine (tokenizer → parser → version registry)
//! ```
//!
//! Validating a node computes the set of format revisions it is valid for;
//! sets intersect and diagnostics merge up through the whole tree. The
//! embedded expression sub-language feeds the same version algebra: every
//! function call and data source reference narrows the range of revisions
//! able to evaluate the expression.
//!
//! ## Example
//!
//! ```
//! use wff_validator::document::{Document, Element};
//! use wff_validator::schema::watch_face_specification;
//! use wff_validator::validator::find_valid_versions;
//!
//! let doc = Document::new(
//!     Element::new("WatchFace")
//!         .attr("width", "450")
//!         .attr("height", "450")
//!         .child(Element::new("Scene").child(
//!             Element::new("PartText")
//!                 .attr("x", "0").attr("y", "0")
//!                 .attr("width", "100").attr("height", "50")
//!                 .child(Element::new("Text").text("[HOUR_0_23]")),
//!         )),
//! );
//! let versions = find_valid_versions(&doc, &watch_face_specification());
//! assert_eq!(versions, wff_validator::version::VersionSet::all());
//! ```

pub mod builder;
pub mod condition;
pub mod constraint;
pub mod context;
pub mod document;
pub mod error;
pub mod expr;
pub mod report;
pub mod result;
pub mod schema;
pub mod validator;
pub mod version;
pub mod xml;

pub use builder::ConstraintBuilder;
pub use constraint::{Constraint, Occurs};
pub use document::{Document, Element};
pub use error::{Result, WffError};
pub use result::{ResultKind, ValidationError, ValidationResult};
pub use validator::{find_valid_versions, validate, Specification};
pub use version::{Version, VersionRange, VersionSet};
