//! Johnny Decimal filing engine.
//!
//! Recovers areas, categories, and IDs from directory-naming convention,
//! layers a cascading policy system over the tree, and gates mutations
//! behind a declared write scope.

pub mod address;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod ops;
pub mod policy;
pub mod scope;
pub mod tree;
pub mod validate;
pub mod views;
