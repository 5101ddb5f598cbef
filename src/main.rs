//! Basecamp CLI entry point

#[tokio::main]
async fn main() {
    if let Err(e) = basecamp_cli::cli::run().await {
        eprintln!("❌ Error: {:#}", e);
        if let Some(hint) = basecamp_cli::cli::reauth_hint(&e) {
            eprintln!("💡 {}", hint);
        }
        std::process::exit(1);
    }
}
