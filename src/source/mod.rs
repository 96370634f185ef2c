// src/source/mod.rs
pub mod adzuna;
pub mod types;

pub use types::{is_usable_id, FetchError, FetchOutcome, ListingSource, Posting};
