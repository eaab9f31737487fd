//! Internship Match Library
//!
//! Extracts internship listings from a web page and ranks them for a student
//! by skill overlap.

pub mod config;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod matcher;
pub mod normalize;
pub mod search;
pub mod session;
pub mod storage;
pub mod types;

pub use types::*;
