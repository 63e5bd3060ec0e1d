#[tokio::main]
async fn main() -> anyhow::Result<()> {
    classgate::cli::run_cli().await
}
