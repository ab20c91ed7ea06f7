use std::path::PathBuf;

mod audit;
mod tags;
mod terminal;

use audit::AuditPrs;
use clap::ArgAction;
use tags::Tags;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The root of the Terraform source tree
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command.run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        // stdout carries the report
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Check that every AWS resource carries allow-listed tags
    ///
    /// Each `resource "aws_*"` block under the root must have a `tags` block
    /// with `team`, `component` and `service` values listed in the tagging
    /// file. Exits with status 1 if any resource fails.
    Tags(Tags),

    /// Flag pull requests whose Terraform changes touch networking
    ///
    /// Walks every pull request of the repository named in the config file
    /// and reports `.tf` patches mentioning VPCs, subnets, security groups
    /// and similar. Flags are informational and do not change the exit
    /// status.
    AuditPrs(AuditPrs),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Tags(command) => command.run(root)?,
            Self::AuditPrs(command) => command.run()?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Summary,
}
