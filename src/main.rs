use anyhow::Result;
use eew_buddy::cli::cli;

fn main() -> Result<()> {
    cli()
}
