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

//! Flag parsing for spec.md §6's command surface. This crate is the one
//! named out of scope by spec.md §1 ("the CLI surface and flag parsing");
//! it exists only to drive the core crates the rest of the workspace
//! implements, so it stays a thin `clap` front end with no elaboration or
//! emission logic of its own.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "topomate")]
#[command(about = "Inter-domain routing topology emulator compiler and orchestrator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Root directory for persisted state; defaults to `~/topomate`.
    #[arg(long, global = true)]
    pub main_dir: Option<PathBuf>,

    /// Directory project metadata is persisted under; defaults to
    /// `<main-dir>/projects`.
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Directory generated router configuration is written under;
    /// defaults to `<main-dir>/generated`.
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Emit debug-level tracing to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create, list, or delete persisted project metadata.
    Project {
        #[command(subcommand)]
        action: ProjectCommand,
    },
    /// Elaborate a topology and emit routing-daemon configuration files,
    /// without touching any container or fabric state.
    Generate(SpecSource),
    /// Elaborate, emit, and bring up the full container/fabric datapath.
    Start(StartArgs),
    /// Stop a container and remove its ports, leaving bridges intact.
    Pause {
        /// Container to pause; every container in the link inventory if
        /// omitted.
        container: Option<String>,
    },
    /// Start a container and re-attach its ports from the persisted
    /// inventory.
    Resume {
        /// Container to resume; every container in the link inventory if
        /// omitted.
        container: Option<String>,
        #[command(flatten)]
        project: ProjectTarget,
    },
    /// Pause then resume a single container.
    Restart {
        container: String,
        #[command(flatten)]
        project: ProjectTarget,
    },
    /// Stop and remove every container this tool owns and delete every
    /// bridge, regardless of which project created them.
    Cleanup,
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// Parse and persist a topology spec under a project name.
    Create {
        name: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// List every persisted project.
    List,
    /// Remove a project's persisted metadata.
    Delete { name: String },
}

/// Either a persisted project name or a direct path to a topology spec
/// file -- spec.md §6's `[--project <name> | <file>]` alternative.
#[derive(Args)]
pub struct SpecSource {
    /// A project name previously created with `project create`.
    #[arg(long)]
    pub project: Option<String>,

    /// A topology spec file, used directly instead of a persisted
    /// project.
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct StartArgs {
    #[command(flatten)]
    pub spec: SpecSource,

    /// Which bridge categories to wire.
    #[arg(long, value_enum, default_value_t = LinkScopeArg::All)]
    pub links: LinkScopeArg,

    /// Skip elaboration/emission and reuse whatever configuration was
    /// last generated for this project.
    #[arg(long)]
    pub no_generate: bool,

    /// Skip pulling each container's image before creating it.
    #[arg(long)]
    pub no_pull: bool,

    /// Restrict container creation and fabric wiring to this
    /// comma-separated list of ASNs.
    #[arg(long, value_name = "ASN,ASN,...")]
    pub r#as: Option<String>,
}

#[derive(Args)]
pub struct ProjectTarget {
    /// A project name previously created with `project create`, needed to
    /// resolve container images and configuration paths when
    /// re-attaching. Required unless exactly one project is persisted.
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LinkScopeArg {
    All,
    Internal,
    External,
    None,
}

impl From<LinkScopeArg> for topomate_orchestrator::LinkScope {
    fn from(v: LinkScopeArg) -> Self {
        match v {
            LinkScopeArg::All => topomate_orchestrator::LinkScope::All,
            LinkScopeArg::Internal => topomate_orchestrator::LinkScope::Internal,
            LinkScopeArg::External => topomate_orchestrator::LinkScope::External,
            LinkScopeArg::None => topomate_orchestrator::LinkScope::None,
        }
    }
}
