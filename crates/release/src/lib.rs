//! Release records and the pure logic around them: classifying assets by
//! filename and deciding which tags are worth looking up.

mod classify;
pub mod error;
mod filter;
mod models;

pub use crate::classify::{Classification, classify};
pub use crate::filter::{TagFilter, matches};
pub use crate::models::*;
