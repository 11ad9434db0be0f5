mod orchestrator;
mod qa_cli;

use qa_cli::app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
