#[tokio::main]
async fn main() -> anyhow::Result<()> {
    edumate_server::start().await
}
