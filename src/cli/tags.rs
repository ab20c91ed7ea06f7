use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tfguard::{AllowList, Directory, storage::TagReport};
use tracing::instrument;

use super::{OutputFormat, terminal::Colorize};

#[derive(Debug, Parser)]
pub struct Tags {
    /// Allow-list of `team:`, `component:` and `service:` lines
    #[arg(long, short, value_name = "FILE", default_value = "tagging_data.txt")]
    tagging_file: PathBuf,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Print violations only
    #[arg(long, short)]
    quiet: bool,
}

impl Tags {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let allow_list = AllowList::load(&self.tagging_file)?;
        let directory = Directory::new(root);
        let report = directory
            .validate(&allow_list)
            .with_context(|| format!("failed to scan {}", directory.root().display()))?;

        match self.output {
            OutputFormat::Table => self.output_table(&report),
            OutputFormat::Json => Self::output_json(&report)?,
            OutputFormat::Summary => println!("violations={}", report.violations.len()),
        }

        if !report.is_clean() {
            std::process::exit(1);
        }

        Ok(())
    }

    fn output_table(&self, report: &TagReport) {
        if !self.quiet {
            println!(
                "{}",
                format!(
                    "Checked {} AWS resources in {} Terraform files",
                    report.resources_checked, report.files_scanned
                )
                .dim()
            );
        }

        for violation in &report.violations {
            println!("{}", format!("✗ {violation}").failure());
        }

        if self.quiet {
            return;
        }

        if report.is_clean() {
            println!("{}", "✓ All resources are correctly tagged".success());
        } else {
            println!(
                "\n{}",
                format!("{} tag violations found", report.violations.len()).warning()
            );
        }
    }

    fn output_json(report: &TagReport) -> anyhow::Result<()> {
        let output = serde_json::json!({
            "status": if report.is_clean() { "valid" } else { "violations_found" },
            "files_scanned": report.files_scanned,
            "resources_checked": report.resources_checked,
            "violations": report.violations,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
