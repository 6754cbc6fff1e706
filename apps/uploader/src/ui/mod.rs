//! Terminal rendering of the uploader state and catalog listings.

pub mod render;
