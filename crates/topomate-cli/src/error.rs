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

use std::path::PathBuf;

/// Everything a subcommand handler can fail with, wrapping every
/// lower-crate error into the single diagnostic `main` prints to stderr
/// before exiting 1 (spec.md §6/§7: "0 success, 1 any fatal error;
/// diagnostics on stderr").
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Spec(#[from] topomate_spec::SpecError),

    #[error(transparent)]
    Builder(#[from] topomate_builder::BuilderError),

    #[error(transparent)]
    Config(#[from] topomate_config::ConfigError),

    #[error(transparent)]
    Fabric(#[from] topomate_fabric::FabricError),

    #[error(transparent)]
    Orchestrator(#[from] topomate_orchestrator::OrchestratorError),

    #[error("no such project {0:?}")]
    UnknownProject(String),

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("--as {0:?} is not a valid ASN list (expected comma-separated integers)")]
    InvalidAsList(String),

    #[error("topology spec must be given either as --project <name> or as a file path")]
    NoSpecGiven,
}
