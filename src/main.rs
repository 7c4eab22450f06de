use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    ncd_flasher::cli::run().await
}
