//! Feed fusion: concurrent fetch, normalize, filter, and merge of a set of
//! Atom/RSS sources into a single time-ordered stream.

mod datetime;
mod entry;
mod error;
mod filter;
mod fused_feed;
pub mod prelude;
mod republish;
mod source;
mod spec;


use prelude::internal::*;
pub use prelude::*;
