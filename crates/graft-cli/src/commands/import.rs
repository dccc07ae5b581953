//! `graft import` command - Import a repository's history into a package directory.

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use graft_core::{ImportObserver, ImportOutcome, ImportPlan, Project, inspect_source};
use graft_git::{Oid, Repository};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use inquire::Confirm;
use serde::Serialize;

use super::ImportArgs;
use crate::output;
use crate::services::{ImportService, effective_options, summary};

/// JSON output for `--json`.
#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    package: &'a str,
    source: &'a Path,
    #[serde(flatten)]
    outcome: &'a ImportOutcome,
}

/// Run the import command.
pub fn run(args: &ImportArgs, project_dir: Option<&Path>) -> Result<()> {
    let source_info = inspect_source(&args.dir)?;
    let source = Repository::open_exact(&source_info.path)
        .with_context(|| format!("No git repository at \"{}\"", source_info.input))?;

    let root = match project_dir {
        Some(dir) => dir.to_path_buf(),
        None => env::current_dir().context("Cannot read current directory")?,
    };
    let host = Repository::open(&root).context("Not inside a git repository")?;
    let project = Project::load(&root)?;

    let options = effective_options(&project.config().import, args.flatten, args.preserve_commit);
    let service = ImportService::new(&source, &host, &project);
    let plan = service.plan(source_info, args.dest.as_deref(), options)?;

    if !args.json {
        output::info(&summary(&plan));
    }

    if !args.yes && !confirm_import()? {
        return Ok(());
    }

    let mut progress = ProgressReporter::new(&plan, !args.json && !output::is_quiet())?;
    let result = service.execute(&plan, &mut progress);
    progress.finish();
    let outcome = result?;

    if args.json {
        let json = JsonOutput {
            package: &plan.source.package_name,
            source: &plan.source.path,
            outcome: &outcome,
        };
        output::essential(&serde_json::to_string_pretty(&json)?);
    } else {
        print_outcome(&plan, &outcome);
    }

    Ok(())
}

fn confirm_import() -> Result<bool> {
    let confirmed =
        Confirm::new("Are you sure you want to import these commits onto the current branch?")
            .with_default(false)
            .prompt()
            .context("Confirmation cancelled")?;

    if !confirmed {
        output::info("Import cancelled");
    }
    Ok(confirmed)
}

fn print_outcome(plan: &ImportPlan, outcome: &ImportOutcome) {
    output::success(&format!(
        "Imported {} from {} into {}",
        output::count(outcome.applied, "commit"),
        plan.source.package_name,
        outcome.target_dir
    ));
    if outcome.skipped > 0 {
        output::detail(&format!(
            "  skipped {}",
            output::count(outcome.skipped, "commit")
        ));
        output::detail("  (empty diff, or already present on this branch)");
    }
    for warning in &outcome.warnings {
        output::warn(warning);
    }
}

/// Renders session progress as a bar on stderr.
struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    fn new(plan: &ImportPlan, visible: bool) -> Result<Self> {
        let bar = ProgressBar::new(plan.commits.len() as u64);
        if !visible {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{wide_bar:.cyan/blue}] {pos}/{len} commits {msg}",
            )?
            .progress_chars("#>-"),
        );
        Ok(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ImportObserver for ProgressReporter {
    fn commit_started(&mut self, _index: usize, commit: &str) {
        self.bar.set_message(commit.to_string());
    }

    fn commit_applied(&mut self, _commit: &str) {
        self.bar.inc(1);
    }

    fn commit_skipped(&mut self, commit: &str) {
        self.bar.inc(1);
        if !self.bar.is_hidden() {
            self.bar
                .println(format!("  skipped commit {}", output::commit_ref(commit)));
        }
    }

    fn rolling_back(&mut self, head: Oid) {
        self.bar.abandon();
        output::warn(&format!("Rolling back to {head}"));
    }
}
