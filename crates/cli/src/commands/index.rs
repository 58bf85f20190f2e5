//! Index command handler.

use super::to_json;
use crate::context::AppContext;
use clap::Args;
use fastrag_core::AppResult;
use fastrag_knowledge::IndexOutcome;

/// Index the corpus into an empty store
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexCommand {
    pub async fn execute(&self, ctx: &AppContext) -> AppResult<()> {
        tracing::info!("Executing index command");

        let outcome = ctx.start().await?;

        if self.json {
            println!("{}", to_json(&outcome)?);
            return Ok(());
        }

        match outcome {
            Some(IndexOutcome::Indexed {
                pages,
                chunks,
                duration_secs,
            }) => {
                println!(
                    "Indexed {} chunks from {} pages in {:.2}s",
                    chunks, pages, duration_secs
                );
            }
            Some(IndexOutcome::Skipped { existing }) => {
                println!("Store already holds {} records; nothing indexed", existing);
            }
            None => println!("Service already started"),
        }

        Ok(())
    }
}
