//! Tool domain - third-party API tools and credential validation

mod entity;
mod provider;

pub use entity::{ToolCredentials, ToolInvokeMessage, ToolParameters, ToolRuntime};
pub use provider::{Tool, ToolProviderController};
