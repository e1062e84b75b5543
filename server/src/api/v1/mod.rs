//! Version 1 of the HTTP API.

pub(crate) mod project;
