//! Q&A Types - Pure entity definitions
//!
//! This crate contains only plain data records shared by the repository
//! ports, the storage backends and the HTTP layer. No runtime dependencies.

pub mod answer;
pub mod question;

pub use answer::*;
pub use question::*;
