// Copyright (C) Brian G. Milnes 2025

//! Copy one component out of the codebase and make it standalone
//!
//! Nested sub-plugin directories stay behind. Outward references in the copy
//! are rewritten to component-addressed calls.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use deroot::analyzer::analyzer::Analyzer;
use deroot::component_tree::component_tree::ComponentTree;
use deroot::extract::extract::extract_component;
use deroot::parser::parser::provider_for;
use deroot::settings::settings::Settings;
use deroot::tool_runner::tool_runner::{run_tool, ToolConfig};

#[derive(Parser)]
#[command(name = "deroot-extract-component")]
#[command(about = "Extract a component into a standalone directory", long_about = None)]
struct Args {
    /// Codebase root
    root: PathBuf,

    /// Component id, e.g. mod_assign
    component: String,

    /// Destination; must not exist
    output: PathBuf,

    /// JSON settings file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Read pre-generated AST dumps from this directory
    #[arg(long)]
    dump_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = ToolConfig::new("deroot-extract-component", args.root.clone());

    run_tool(config, |logger| {
        let mut settings = Settings::load(args.settings.as_deref())?;
        if let Some(dump_dir) = &args.dump_dir {
            settings.parser.dump_dir = Some(dump_dir.clone());
        }
        let tree = ComponentTree::load(&args.root, &settings)
            .context("Failed to build the component tree")?;
        let provider = provider_for(&settings.parser);
        let analyzer = Analyzer {
            tree: &tree,
            settings: &settings,
            provider: provider.as_ref(),
            root: &args.root,
        };

        logger.log(&format!("Extracting {} to {}", args.component, args.output.display()));
        let outcome = extract_component(&analyzer, &args.component, &args.output)
            .with_context(|| format!("Failed to extract {}", args.component))?;
        for analysis in &outcome.analyses {
            logger.absorb(&analysis.log);
        }

        let review = outcome
            .analyses
            .iter()
            .flat_map(|a| a.findings.iter())
            .filter(|f| f.needs_review())
            .count();
        Ok(format!(
            "Summary: {} files copied, {} edits in {} files, {review} need review",
            outcome.files_copied, outcome.edits_applied, outcome.files_rewritten
        ))
    })
}
