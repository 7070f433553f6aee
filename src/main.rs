use anyhow::Result;
use schemconv::cli;

fn main() -> Result<()> {
    let args = cli::parse_args();
    if let Err(err) = cli::dispatch(args) {
        // Logging may not be initialised yet (bad config), so go straight to stderr.
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
    Ok(())
}
