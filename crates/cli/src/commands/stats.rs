//! Stats command handler.

use super::to_json;
use crate::context::AppContext;
use clap::Args;
use fastrag_core::AppResult;
use fastrag_knowledge::VectorStore;

/// Show vector store statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, ctx: &AppContext) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let stats = ctx.store.stats()?;

        if self.json {
            println!("{}", to_json(&stats)?);
            return Ok(());
        }

        println!("Store:        {}", ctx.config.store_path().display());
        println!("Records:      {}", stats.records);
        match stats.dimensions {
            Some(dimensions) => println!("Dimensions:   {}", dimensions),
            None => println!("Dimensions:   -"),
        }
        match stats.last_indexed_at {
            Some(at) => println!("Last indexed: {}", at.to_rfc3339()),
            None => println!("Last indexed: never"),
        }
        println!(
            "Embedding:    {} ({})",
            ctx.embedder.provider_name(),
            ctx.embedder.model_name()
        );

        Ok(())
    }
}
