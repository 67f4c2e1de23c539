//! Command handlers for the `mdtedit` binary.
//!
//! Each handler builds a [`TargetCollection`] from the command-line target
//! arguments, runs the requested operations, prints their previews and
//! commits when asked to.

use crate::cli::{Args, Commands, TargetArgs, WriteArgs};
use crate::config::{ConfigLoader, Settings};
use crate::errors::Result;
use crate::output_formatter::{OutputFormat, OutputFormatter};
use crate::patterns::{Pattern, PatternEngine, ReplacementSpec};
use crate::persist::CommitMode;
use crate::target::{ItemPreview, TargetCollection, TransformOutcome};
use log::debug;
use std::io::{self, Write};

/// One step of an edit pipeline.
enum Step {
    StripLinks,
    Whitespace,
    Replace(Pattern, ReplacementSpec),
    Remove(Pattern),
}

impl Step {
    fn title(&self) -> String {
        match self {
            Step::StripLinks => "Links found".to_string(),
            Step::Whitespace => "Redundant whitespace".to_string(),
            Step::Replace(pattern, _) => format!("Replacing matches of '{}'", pattern.as_str()),
            Step::Remove(pattern) => format!("Regex matches to be removed: '{}'", pattern.as_str()),
        }
    }

    fn run(&self, collection: &mut TargetCollection, verbose: bool) -> Result<TransformOutcome> {
        match self {
            Step::StripLinks => collection.strip_markdown_links(verbose),
            Step::Whitespace => collection.remove_extra_whitespaces(verbose),
            Step::Replace(pattern, spec) => collection.search_and_replace(pattern, spec, verbose),
            Step::Remove(pattern) => collection.remove(pattern, verbose),
        }
    }
}

/// Dispatches a parsed command line.
pub fn run(args: Args) -> Result<()> {
    let settings = ConfigLoader::resolve(args.config.as_deref())?;
    let workers = args.workers.or(settings.workers).unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });
    let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;

    pool.install(|| match args.command {
        Commands::Search {
            target,
            pattern,
            format,
            silence,
        } => run_search(&settings, &target, &pattern, format, silence),
        Commands::Replace {
            target,
            write,
            pattern,
            replacement,
            group,
        } => {
            let spec = ReplacementSpec::from_parts(replacement, group)?;
            let steps = vec![Step::Replace(Pattern::new(&pattern)?, spec)];
            run_steps(&settings, &target, &write, steps)
        }
        Commands::Remove {
            target,
            write,
            pattern,
        } => run_steps(&settings, &target, &write, vec![Step::Remove(Pattern::new(&pattern)?)]),
        Commands::StripLinks { target, write } => {
            run_steps(&settings, &target, &write, vec![Step::StripLinks])
        }
        Commands::Whitespace { target, write } => {
            run_steps(&settings, &target, &write, vec![Step::Whitespace])
        }
        Commands::Edit {
            target,
            write,
            remove_md_links,
            remove_whitespaces,
            remove_regex,
        } => {
            let mut steps = Vec::new();
            if remove_md_links {
                steps.push(Step::StripLinks);
            }
            if remove_whitespaces {
                steps.push(Step::Whitespace);
            }
            if let Some(regex) = remove_regex {
                steps.push(Step::Remove(Pattern::new(&regex)?));
            }
            if steps.is_empty() {
                return Err("edit needs at least one of -l, -w or -r".into());
            }
            run_steps(&settings, &target, &write, steps)
        }
    })
}

fn load(settings: &Settings, target: &TargetArgs) -> Result<TargetCollection> {
    let walk = settings.walk_options(&target.extensions, &target.exclude, target.gitignore);
    TargetCollection::from_inputs(
        target.mode,
        target.literals(),
        target.path.as_deref(),
        &walk,
        PatternEngine::new(settings.highlight),
    )
}

/// The entry point for the `search` command.
pub fn run_search(
    settings: &Settings,
    target: &TargetArgs,
    pattern: &str,
    format: OutputFormat,
    silence: bool,
) -> Result<()> {
    let pattern = Pattern::new(pattern)?;
    let collection = load(settings, target)?;
    // Previews would corrupt machine-readable output.
    let verbose = settings.verbose && !silence && format == OutputFormat::Text;

    let report = collection.search(&pattern, verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if verbose {
        print_previews(&mut out, "Matches found", &report.previews, false)?;
    }
    OutputFormatter::new(format).write_output(&mut out, &report)?;
    Ok(())
}

fn run_steps(settings: &Settings, target: &TargetArgs, write: &WriteArgs, steps: Vec<Step>) -> Result<()> {
    let mut collection = load(settings, target)?;
    let verbose = settings.verbose && !write.silence;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    for step in &steps {
        let outcome = step.run(&mut collection, verbose)?;
        debug!("{}: {} item(s) changed", step.title(), outcome.changed);
        if verbose {
            print_previews(&mut out, &step.title(), &outcome.previews, true)?;
        }
    }

    if write.in_place {
        let summary = collection.commit(CommitMode::InPlace)?;
        if verbose {
            writeln!(out, "\n{}", "-".repeat(50))?;
            writeln!(out, "Items loaded  : {}", collection.len())?;
            writeln!(out, "Items changed : {}", summary.written)?;
        }
    } else if !collection.is_backed() {
        for value in collection.working_values() {
            writeln!(out, "{value}")?;
        }
    } else if write.silence {
        eprintln!("Warning: Changes have not been saved. Use '-i' to save changes in place.");
    } else {
        writeln!(
            out,
            "\n{} of {} item(s) would change. Use '-i' to save changes in place.",
            collection.changed_count(),
            collection.len()
        )?;
    }
    Ok(())
}

fn print_previews<W: Write>(
    out: &mut W,
    title: &str,
    previews: &[ItemPreview],
    show_changes: bool,
) -> Result<()> {
    writeln!(out, "\n{title}:\n---")?;
    for item in previews.iter().filter(|p| p.matches > 0) {
        writeln!(out, "[{}] {} match(es)", item.label, item.matches)?;
        writeln!(out, "{}", item.preview.matched)?;
        if show_changes {
            writeln!(out, "Changes made:")?;
            writeln!(out, "{}", item.preview.replaced)?;
        }
    }
    Ok(())
}
