use crate::output_formatter::OutputFormat;
use crate::target::TargetKind;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Regex-driven editing of file contents and file names.
///
/// `mdtedit` applies the same pattern operations to two kinds of targets:
/// the text inside files, or the names of the files themselves. Every change
/// is previewed first and only written with `--in-place`.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Preview-first regex editing of file contents and file names",
    long_about = "mdtedit - apply regex search, replace and removal to file contents or file names.

Changes are staged in memory and previewed with the matched spans and their
replacements highlighted. Nothing is written unless --in-place is given.

QUICK EXAMPLES:
  mdtedit strip-links -f notes.md -i               # [label](https://..) -> label
  mdtedit whitespace -f docs/ -x md -i             # Collapse redundant spaces
  mdtedit replace -f . -m pathname -p '-' -r '_'   # file-name.txt -> file_name.txt
  mdtedit search -f docs/ -p 'TODO' -o json        # Count matches per file
  mdtedit edit -f notes.md -l -w -r '\\[\\[\\d+\\]\\] '  # One-shot cleanup

For detailed help on any command, use: mdtedit <command> --help"
)]
pub struct Args {
    /// Path to a YAML configuration file.
    #[arg(short, long, global = true, env = "MDTEDIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// The number of worker threads for per-item transforms.
    #[arg(long, global = true, env = "MDTEDIT_WORKERS")]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the items of a run come from and how they are interpreted.
#[derive(ClapArgs, Debug, Clone)]
pub struct TargetArgs {
    /// File or directory to process.
    #[arg(short = 'f', long = "path", value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Literal input to process instead of files. May be repeated.
    #[arg(short = 't', long = "text", value_name = "TEXT")]
    pub text: Vec<String>,

    /// Transform file contents or file names.
    #[arg(short = 'm', long = "mode", value_enum, default_value = "content")]
    pub mode: TargetKind,

    /// A comma-separated list of file extensions to include.
    #[arg(short = 'x', long = "ext", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// A comma-separated list of path components to exclude.
    #[arg(short = 'e', long = "exclude", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Respect `.gitignore` and `.ignore` files and skip hidden files.
    #[arg(long)]
    pub gitignore: bool,
}

impl TargetArgs {
    /// Literal input, if any was given.
    pub fn literals(&self) -> Option<Vec<String>> {
        if self.text.is_empty() {
            None
        } else {
            Some(self.text.clone())
        }
    }
}

/// Options shared by every command that changes items.
#[derive(ClapArgs, Debug, Clone)]
pub struct WriteArgs {
    /// Save changes to the existing files (overwrite contents or rename).
    #[arg(short = 'i', long = "in-place")]
    pub in_place: bool,

    /// Do not print previews.
    #[arg(short = 's', long = "silence")]
    pub silence: bool,
}

/// The set of available commands for the `mdtedit` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Count matches of a pattern
    ///
    /// EXAMPLES:
    ///   mdtedit search -f docs/ -p 'https?://'
    ///   mdtedit search -f . -m pathname -p '\s' -o csv
    Search {
        #[command(flatten)]
        target: TargetArgs,

        /// The regex pattern to search for.
        #[arg(short, long)]
        pattern: String,

        /// Output format for the match counts.
        #[arg(short = 'o', long = "format", value_enum, default_value = "text")]
        format: OutputFormat,

        /// Do not print highlighted matches.
        #[arg(short = 's', long = "silence")]
        silence: bool,
    },

    /// Replace matches with a literal string or a captured group
    ///
    /// EXAMPLES:
    ///   mdtedit replace -f . -m pathname -p '-' -r '_' -i
    ///   mdtedit replace -f notes.md -p '(\w+)@(\w+)' -r '$2 at $1'
    ///   mdtedit replace -f notes.md -p '<b>(.*?)</b>' -g 1
    ///
    /// Exactly one of --replacement and --group must be given.
    Replace {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        write: WriteArgs,

        /// The regex pattern to search for.
        #[arg(short, long)]
        pattern: String,

        /// Literal replacement; `$1` / `${name}` refer to capture groups.
        #[arg(short, long)]
        replacement: Option<String>,

        /// Replace each match with this capture group (0 when given without a value).
        #[arg(short, long, num_args = 0..=1, default_missing_value = "0")]
        group: Option<usize>,
    },

    /// Remove all matches of a pattern
    Remove {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        write: WriteArgs,

        /// The regex pattern to remove.
        #[arg(short, long)]
        pattern: String,
    },

    /// Replace markdown links with their label
    StripLinks {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        write: WriteArgs,
    },

    /// Remove redundant whitespace (leading, trailing, repeated, before , . and ))
    Whitespace {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        write: WriteArgs,
    },

    /// Run several built-in edits in one go
    ///
    /// Steps run in this order: strip links, remove whitespace, remove regex.
    Edit {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        write: WriteArgs,

        /// Replace markdown links with their label.
        #[arg(short = 'l', long = "remove-md-links")]
        remove_md_links: bool,

        /// Remove redundant whitespace.
        #[arg(short = 'w', long = "remove-whitespaces")]
        remove_whitespaces: bool,

        /// Remove matches of this regex.
        #[arg(short = 'r', long = "remove-regex")]
        remove_regex: Option<String>,
    },
}

/// Parses command-line arguments and returns the populated `Args` struct.
pub fn parse_args() -> Args {
    Args::parse()
}
