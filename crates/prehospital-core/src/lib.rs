//! prehospital-core
//!
//! Domain types for the Pre-Hospital Care intake system, the validation
//! rules applied to submissions, and the body-diagram annotator. No database
//! or HTTP dependency.

pub mod annotate;
pub mod error;
pub mod form_code;
pub mod limits;
pub mod models;
pub mod validation;
