//! Normalization adapters.
//!
//! Each source format gets its own small translation layer that produces
//! the estimator's single input shape. The estimator never sees markup.
//!
//! - `json`: structured game feeds with inconsistent field names
//! - `detail`: text cells scraped from one ticket's detail page
//! - `listing`: scratcher links on a listing page

pub mod detail;
pub mod json;
pub mod listing;
