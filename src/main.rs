#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = wilfried_edu::run().await {
        eprintln!("wilfried-edu fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
