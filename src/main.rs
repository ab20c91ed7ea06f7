//! `tfguard`: tag-compliance linting and pull-request network auditing for
//! Terraform on AWS.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
