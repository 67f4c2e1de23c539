//! The main entry point for the `mdtedit` command-line application.
//!
//! This file is responsible for parsing command-line arguments and dispatching
//! to the command handlers in the `mdtedit` library.

use mdtedit::cli;
use mdtedit::commands;
use std::env;
use std::process;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Bare `mdtedit` prints a quick start instead of clap's usage error.
    if env::args().len() == 1 {
        println!("Preview-first regex editing of file contents and file names\n");
        println!("QUICK START EXAMPLES:");
        println!("  mdtedit strip-links -f notes.md                  # Preview link stripping");
        println!("  mdtedit strip-links -f notes.md -i               # ...and save it");
        println!("  mdtedit whitespace -t '  words ,   end .  '      # Try it on literal text");
        println!("  mdtedit replace -f . -m pathname -p '-' -r '_'   # Rename file-name -> file_name");
        println!("  mdtedit search -f docs/ -p 'TODO'                # Count matches\n");
        println!("Run 'mdtedit --help' for full command list");
        println!("Run 'mdtedit <command> --help' for detailed command help");
        process::exit(0);
    }

    let args = cli::parse_args();
    commands::run(args)?;
    Ok(())
}
