//! Validate-tool command - probes WolframAlpha with the given credentials

use std::collections::HashMap;

use clap::Args;
use serde_json::json;

use super::context;
use crate::domain::{ToolCredentials, ToolProviderController};
use crate::infrastructure::tool::{WolframAlphaProvider, WolframAlphaTool};

/// Arguments for the validate-tool command
#[derive(Args, Clone)]
pub struct ValidateToolArgs {
    /// WolframAlpha application ID
    #[arg(long)]
    pub appid: String,
}

/// Run the validate-tool command
pub async fn run(args: ValidateToolArgs) -> anyhow::Result<()> {
    context::bootstrap()?;

    let provider = WolframAlphaProvider::new(WolframAlphaTool::with_default_client()?);
    let credentials: ToolCredentials = HashMap::from([("appid".to_string(), json!(args.appid))]);

    provider.validate_credentials(&credentials).await?;
    println!("{} credentials are valid", provider.provider_name());

    Ok(())
}
