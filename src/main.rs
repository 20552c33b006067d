use barrage::cli::{run, Cli};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
