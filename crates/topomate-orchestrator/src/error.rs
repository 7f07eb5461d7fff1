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

use topomate_types::{Asn, RouterId};

/// Errors raised while bringing a [`crate::Orchestrator`] through a
/// lifecycle transition.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// A Docker Engine API call failed.
    #[error("docker error: {0}")]
    Docker(#[from] bollard::errors::Error),

    /// `docker cp` (copying a router's configuration in) failed.
    #[error("docker cp failed copying {src} into {container}:{dest}: {detail}")]
    CopyConfig {
        container: String,
        src: String,
        dest: String,
        detail: String,
    },

    /// A [`topomate_fabric::FabricDriver`] call failed.
    #[error("fabric error: {0}")]
    Fabric(#[from] topomate_fabric::FabricError),

    /// The link inventory (`links.json`) could not be read or written.
    #[error("link inventory error at {path}: {source}")]
    Inventory {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The link inventory's JSON was malformed.
    #[error("link inventory at {path} is not valid JSON: {source}")]
    InventoryFormat {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A well-known directory could not be resolved or created.
    #[error("directory error: {0}")]
    Directory(#[from] topomate_spec::SpecError),

    /// A container has no recorded PID (not running, or Docker hasn't
    /// reported one yet).
    #[error("container {0} has no running PID")]
    NoPid(String),

    /// `Project::as_by_asn` came back empty for an AS the caller expected
    /// to exist -- indicates a project file and a live inventory have
    /// drifted apart.
    #[error("{0} not found in project")]
    UnknownAsn(Asn),

    /// Same as [`OrchestratorError::UnknownAsn`] but for a router within a
    /// known AS.
    #[error("{asn} has no router {router:?}")]
    UnknownRouter { asn: Asn, router: RouterId },

    /// A spawned lifecycle task panicked or was cancelled before
    /// reporting its result.
    #[error("container task for {0} did not complete: {1}")]
    TaskLost(String, String),

    /// The project has no generated configuration file for a container
    /// that `start` is about to copy in (the caller skipped `generate` via
    /// `--no-generate` without having run it before).
    #[error("no generated configuration found for {0} at {1}")]
    MissingConfig(String, std::path::PathBuf),

    /// `pause`/`resume`/`restart` named a container absent from both the
    /// project and the persisted link inventory.
    #[error("no such container: {0}")]
    UnknownContainer(String),
}
