//! JSON HTTP client shared by the vector store backends, embeddings and tools

mod client;

pub use client::{HttpClient, HttpClientTrait, HttpMethod};

#[cfg(test)]
pub use client::mock::{MockHttpClient, RecordedRequest};
