use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tfguard::{AuditConfig, AuditReport, Auditor, Client, NetworkTerms, github::PullRequestReport};
use tracing::instrument;

use super::{OutputFormat, terminal::Colorize};

#[derive(Debug, Parser)]
pub struct AuditPrs {
    /// INI file with a `[github]` section holding `token` and `repo`
    #[arg(long, short, value_name = "FILE", default_value = "config.ini")]
    config: PathBuf,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Print flagged files only
    #[arg(long, short)]
    quiet: bool,
}

impl AuditPrs {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let config = AuditConfig::load(&self.config)?;
        let auditor = Auditor::new(Client::new(&config)?, NetworkTerms::default());

        let report = match self.output {
            OutputFormat::Table => auditor.audit_with(&config.repo, |pr| self.print_pull_request(pr)),
            OutputFormat::Json | OutputFormat::Summary => auditor.audit(&config.repo),
        }
        .with_context(|| format!("failed to audit pull requests of {}", config.repo))?;

        match self.output {
            OutputFormat::Table => self.print_summary(&report),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Summary => println!(
                "pull_requests={} flagged_files={}",
                report.pull_requests.len(),
                report.flagged_files()
            ),
        }

        Ok(())
    }

    fn print_pull_request(&self, pr: &PullRequestReport) {
        if !self.quiet {
            println!("Analyzing PR #{} - {}", pr.number, pr.title);
        }
        if let Some(failure) = &pr.fetch_failure {
            println!("{}", format!("  Failed to fetch PR files: {failure}").warning());
        }
        for file in &pr.flagged {
            println!(
                "{}",
                format!(
                    "  Network-related Terraform change detected in: {} (PR #{})",
                    file.filename, pr.number
                )
                .failure()
            );
        }
    }

    fn print_summary(&self, report: &AuditReport) {
        if self.quiet {
            return;
        }

        let flagged_prs = report
            .pull_requests
            .iter()
            .filter(|pr| !pr.flagged.is_empty())
            .count();
        println!(
            "\n{}",
            format!(
                "Audited {} pull requests: {} with network changes, {} flagged files",
                report.pull_requests.len(),
                flagged_prs,
                report.flagged_files()
            )
            .dim()
        );

        let failures = report.fetch_failures().count();
        if failures > 0 {
            println!(
                "{}",
                format!("{failures} pull requests could not be inspected").warning()
            );
        }
    }
}
