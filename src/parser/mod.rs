//! Repository reference parsing.
//!
//! Turns user input such as `https://github.com/owner/repo` or
//! `git@github.com:owner/repo.git` into a [`RepositoryRef`]. No network
//! access happens here.
//!
//! # Example
//!
//! ```
//! use repofetch_core::parser::parse_repository_ref;
//!
//! let repo = parse_repository_ref("https://github.com/octo/demo/").unwrap();
//! assert_eq!(repo.to_string(), "octo/demo");
//! ```

mod error;
mod repository;

pub use error::ParseError;
pub use repository::{RepositoryRef, SUPPORTED_HOST, parse_repository_ref};
