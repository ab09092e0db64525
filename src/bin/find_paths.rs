// Copyright (C) Brian G. Milnes 2025

//! Report every expression that builds a path from the codebase root
//!
//! Writes one CSV row per path expression: symbolic path, category, owning
//! component of the target and whether the expression needs review.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use deroot::analyzer::analyzer::{Analyzer, Finding};
use deroot::component_tree::component_tree::ComponentTree;
use deroot::discovery::discovery::find_php_files;
use deroot::logging::logging::ToolLogger;
use deroot::parser::parser::provider_for;
use deroot::report::report::write_path_report;
use deroot::settings::settings::Settings;
use deroot::tool_runner::tool_runner::{run_tool, ToolConfig};

#[derive(Parser)]
#[command(name = "deroot-find-paths")]
#[command(about = "Report codebase-root path expressions as CSV", long_about = None)]
struct Args {
    /// Codebase root
    root: PathBuf,

    /// CSV output file; stdout when omitted
    output: Option<PathBuf>,

    /// JSON settings file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Read pre-generated AST dumps from this directory
    #[arg(long)]
    dump_dir: Option<PathBuf>,
}

fn find_paths(args: &Args, logger: &mut ToolLogger) -> Result<(Vec<Finding>, usize, usize)> {
    let mut settings = Settings::load(args.settings.as_deref())?;
    if let Some(dump_dir) = &args.dump_dir {
        settings.parser.dump_dir = Some(dump_dir.clone());
    }
    let tree =
        ComponentTree::load(&args.root, &settings).context("Failed to build the component tree")?;
    let provider = provider_for(&settings.parser);
    let files = find_php_files(&args.root, &settings.skip_dirs);

    let analyzer = Analyzer {
        tree: &tree,
        settings: &settings,
        provider: provider.as_ref(),
        root: &args.root,
    };
    let analyses = analyzer.analyze_files(&files)?;

    let mut findings = Vec::new();
    let mut failed = 0;
    for analysis in analyses {
        logger.absorb(&analysis.log);
        if analysis.parse_failed {
            failed += 1;
        }
        findings.extend(analysis.findings);
    }
    Ok((findings, files.len(), failed))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let Some(output) = args.output.clone() else {
        // Keep stdout pure CSV: no banner, warnings go to stderr
        let mut logger = ToolLogger::new_disabled();
        let (findings, _, _) = find_paths(&args, &mut logger)?;
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        write_path_report(&mut out, &findings)?;
        out.flush()?;
        return Ok(());
    };

    let config = ToolConfig::new("deroot-find-paths", args.root.clone());
    run_tool(config, |logger| {
        let (findings, files, failed) = find_paths(&args, logger)?;
        let file = fs::File::create(&output)
            .with_context(|| format!("Failed to create {}", output.display()))?;
        let mut out = BufWriter::new(file);
        write_path_report(&mut out, &findings)?;
        out.flush()?;

        let review = findings.iter().filter(|f| f.needs_review()).count();
        logger.log(&format!("Report written to {}", output.display()));
        Ok(format!(
            "Summary: {files} files, {} path expressions, {review} need review, \
             {failed} parse failures",
            findings.len()
        ))
    })
}
