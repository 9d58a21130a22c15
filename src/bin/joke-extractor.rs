//! A built-in extractor as a standalone program.
//!
//! Always exits 0; the first stdout line is the status, `"<code> <message>"`.

use clap::Parser;
use clap::error::ErrorKind;
use joke_extract::ExtractorStatus;
use joke_extract::config::ExtractorArgs;
use joke_extract::logging;

fn main() {
    let args = match ExtractorArgs::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return;
        }
        Err(err) => {
            let usage = err.to_string();
            let first = usage.lines().next().unwrap_or("invalid arguments");
            println!("{}", ExtractorStatus::new(ExtractorStatus::USAGE, first.trim()));
            return;
        }
    };
    logging::init_tracing(&args.log_level);

    let status = args.kind.run(&args.email, &args.output_dir);
    println!("{status}");
}
