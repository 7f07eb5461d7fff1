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

/// Errors raised by a [`crate::FabricDriver`] implementation.
///
/// Per spec.md §4.4/§7, fabric operations are best-effort at the
/// orchestrator level (a failed port deletion during cleanup is logged and
/// skipped); this type exists so the orchestrator can tell *which* step
/// failed rather than only that "something" did.
#[derive(Debug, thiserror::Error)]
pub enum FabricError {
    /// A shell-out to `ovs-vsctl`/`ovs-ofctl` exited non-zero.
    #[error("{command} failed: {stderr}")]
    Command { command: String, stderr: String },

    /// The external command itself could not be spawned (binary missing).
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A netlink operation (veth/bridge/netns manipulation) failed.
    #[error("netlink operation failed: {0}")]
    Netlink(#[from] rtnetlink::Error),

    /// Entering a container's network namespace failed (`setns`/`unshare`).
    #[error("failed to enter namespace at {path}: {source}")]
    Namespace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker thread used to execute inside a container's namespace
    /// panicked or was dropped before replying.
    #[error("namespace worker thread did not complete: {0}")]
    WorkerLost(String),

    /// An interface name collided with one already present on the same
    /// container, violating the Fabric Driver's uniqueness contract.
    #[error("interface {iface} already exists on container {container}")]
    DuplicateInterface { container: String, iface: String },
}
