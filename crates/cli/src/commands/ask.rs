//! Ask command handler.
//!
//! Answers a question from the indexed corpus.

use super::to_json;
use crate::context::AppContext;
use clap::Args;
use fastrag_core::AppResult;

/// Ask a question about the corpus
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Output as JSON ({answer, sources})
    #[arg(long)]
    pub json: bool,

    /// Omit the retrieved sources from text output
    #[arg(long)]
    pub no_sources: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, ctx: &AppContext) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        ctx.start().await?;
        let service = ctx.query_service()?;

        let answer = service.ask(&self.query).await?;

        if self.json {
            println!("{}", to_json(&answer)?);
            return Ok(());
        }

        println!("{}", answer.answer.trim());

        if !self.no_sources {
            println!("\n--- Sources ---\n{}", answer.sources);
        }

        Ok(())
    }
}
