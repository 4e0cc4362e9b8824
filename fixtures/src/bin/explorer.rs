use clap::Parser;
use fixtures::{explorer_router, run_server, FixtureArgs, TokenCatalog};

/// Block explorer fixture server
#[derive(Parser, Debug)]
#[clap(name = "explorer-fixture")]
struct Cli {
    #[clap(flatten)]
    common: FixtureArgs,
}

const DEFAULT_TOKENS: &str = include_str!("../../tokens.csv");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Load fixture data if provided
    let catalog = match &args.common.data {
        Some(data_path) => {
            let data = std::fs::read_to_string(data_path)?;
            let catalog = TokenCatalog::from_csv(&data)?;
            eprintln!(
                "Loaded {} tokens from {}",
                catalog.len(),
                data_path.display()
            );
            catalog
        }
        None => TokenCatalog::from_csv(DEFAULT_TOKENS)?,
    };

    run_server(args.common, explorer_router(catalog)).await
}
