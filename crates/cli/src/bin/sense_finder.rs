use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    sense_cli::main_entry().await
}
