// Copyright (C) Brian G. Milnes 2025

//! Rewrite codebase-root path expressions in place
//!
//! Files on the exclusion list run before the component system exists and
//! are never touched. Each file is written at most once, atomically.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use deroot::analyzer::analyzer::Analyzer;
use deroot::component_tree::component_tree::ComponentTree;
use deroot::discovery::discovery::find_php_files;
use deroot::fixer::fixer::rewrite_analyses;
use deroot::parser::parser::provider_for;
use deroot::report::report::write_audit_report;
use deroot::settings::settings::Settings;
use deroot::tool_runner::tool_runner::{run_tool, ToolConfig};

#[derive(Parser)]
#[command(name = "deroot-rewrite")]
#[command(about = "Rewrite codebase-root paths to component-addressed calls", long_about = None)]
struct Args {
    /// Codebase root
    root: PathBuf,

    /// Write the rewrite audit CSV here
    #[arg(short, long)]
    audit: Option<PathBuf>,

    /// Dry run - decide and report without modifying files
    #[arg(short, long)]
    dry_run: bool,

    /// JSON settings file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Read pre-generated AST dumps from this directory
    #[arg(long)]
    dump_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = ToolConfig::new("deroot-rewrite", args.root.clone());

    run_tool(config, |logger| {
        let mut settings = Settings::load(args.settings.as_deref())?;
        if let Some(dump_dir) = &args.dump_dir {
            settings.parser.dump_dir = Some(dump_dir.clone());
        }
        let tree = ComponentTree::load(&args.root, &settings)
            .context("Failed to build the component tree")?;
        let provider = provider_for(&settings.parser);
        let files: Vec<String> = find_php_files(&args.root, &settings.skip_dirs)
            .into_iter()
            .filter(|f| !settings.is_excluded(f))
            .collect();
        logger.log(&format!("Analyzing {} files...", files.len()));

        let analyzer = Analyzer {
            tree: &tree,
            settings: &settings,
            provider: provider.as_ref(),
            root: &args.root,
        };
        let analyses = analyzer.analyze_files(&files)?;

        let failed = analyses.iter().filter(|a| a.parse_failed).count();
        for analysis in &analyses {
            logger.absorb(&analysis.log);
        }
        let outcome = rewrite_analyses(&args.root, &analyses, args.dry_run)?;
        logger.absorb(&outcome.log);

        if let Some(audit) = &args.audit {
            let file = fs::File::create(audit)
                .with_context(|| format!("Failed to create {}", audit.display()))?;
            let mut out = BufWriter::new(file);
            write_audit_report(&mut out, analyses.iter().flat_map(|a| a.findings.iter()))?;
            out.flush()?;
            logger.log(&format!("Audit written to {}", audit.display()));
        }

        let review = analyses
            .iter()
            .flat_map(|a| a.findings.iter())
            .filter(|f| f.needs_review())
            .count();
        Ok(format!(
            "Summary: {} files, {} edits in {} files, {review} need review, \
             {failed} parse failures, {} write failures, {} warnings",
            files.len(),
            outcome.edits_applied,
            outcome.files_changed,
            outcome.write_failures(),
            logger.warnings()
        ))
    })
}
