#[tokio::main]
async fn main() -> anyhow::Result<()> {
    blog_server::run().await
}
