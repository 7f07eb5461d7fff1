// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! `topomate`: the command-line front end over the elaboration, emission,
//! and orchestration crates. Per spec.md §1 this crate is explicitly out
//! of scope for the core ("the CLI surface and flag parsing" is an
//! external collaborator) -- it exists only to wire [`cli::Cli`]'s
//! subcommands onto [`commands`]'s handlers.

mod cli;
mod commands;
mod error;

use clap::Parser;
use topomate_spec::Directories;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_new(filter).unwrap())
        .with_target(false)
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let dirs = Directories::resolve(cli.main_dir, cli.project_dir, cli.config_dir)?;

    match cli.command {
        Command::Project { action } => commands::project(&dirs, &action),
        Command::Generate(spec) => commands::generate(&dirs, &spec),
        Command::Start(args) => commands::start(&dirs, &args).await,
        Command::Pause { container } => commands::pause(&dirs, container.as_deref()).await,
        Command::Resume { container, project } => commands::resume(&dirs, container.as_deref(), &project).await,
        Command::Restart { container, project } => commands::restart(&dirs, &container, &project).await,
        Command::Cleanup => commands::cleanup(&dirs).await,
    }
}
