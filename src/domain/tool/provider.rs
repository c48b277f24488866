//! Tool and tool provider traits

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{ToolCredentials, ToolInvokeMessage, ToolParameters, ToolRuntime};
use crate::domain::DomainError;

/// An invocable tool backed by a third-party API
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    /// Tool identifier
    fn name(&self) -> &'static str;

    /// Copy of this tool bound to the given runtime (credentials and context)
    fn fork_tool_runtime(&self, runtime: ToolRuntime) -> Self
    where
        Self: Sized;

    /// Run the tool once
    async fn invoke(
        &self,
        user_id: &str,
        tool_parameters: &ToolParameters,
    ) -> Result<Vec<ToolInvokeMessage>, DomainError>;
}

/// A provider grouping one or more tools under a shared credential set
#[async_trait]
pub trait ToolProviderController: Send + Sync + Debug {
    fn provider_name(&self) -> &'static str;

    /// Confirm the credentials are accepted by the provider's API.
    ///
    /// Every failure is reported as [`DomainError::CredentialValidation`].
    async fn validate_credentials(&self, credentials: &ToolCredentials) -> Result<(), DomainError>;
}
