//! Version 1 of the Atelier HTTP API.
//!
//! All endpoints live under `/api/v1`.

pub mod project;
