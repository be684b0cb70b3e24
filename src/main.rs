use std::process::exit;

use specdeck::cli::schema::Registry;
use specdeck::dispatch;
use specdeck::exec::ProductionHost;

#[tokio::main]
async fn main() {
    let raw: Vec<String> = std::env::args().collect();

    // A schema/descriptor mismatch is a packaging defect; it can only
    // surface here, before any user input is parsed.
    let registry = match Registry::new() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("{err}");
            exit(1);
        }
    };

    let code = dispatch::dispatch(&raw, &registry, &ProductionHost).await;
    exit(code);
}
