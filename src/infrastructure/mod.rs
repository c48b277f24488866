//! Infrastructure layer - External service implementations

pub mod dataset;
pub mod embedding;
pub mod http;
pub mod logging;
pub mod tool;
pub mod vector_store;
