use tallychain::cli::run_cli;

fn main() -> anyhow::Result<()> {
    // Logging is initialized inside the CLI based on the debug flag
    run_cli()
}
