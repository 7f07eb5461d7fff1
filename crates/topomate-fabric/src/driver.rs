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

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::FabricError;
use crate::settings::{HostIface, PortSettings};

/// Abstracts "create bridge", "attach a port to a container's namespace",
/// "delete bridge" away from the orchestrator, per spec.md §4.4 -- the
/// raw shell-outs to `ip netns`, `ip link`, `ovs-vsctl`, `ovs-ofctl` the
/// source material makes directly are implementation detail of exactly
/// one impl ([`crate::linux::LinuxFabric`]); a [`crate::null::RecordingFabric`]
/// substitutes for dry runs and tests.
#[async_trait]
pub trait FabricDriver: Send + Sync {
    /// Idempotently create an L2 broadcast domain named `name`.
    async fn create_bridge(&self, name: &str) -> Result<(), FabricError>;

    /// Idempotently remove a bridge. Tolerates a bridge that does not
    /// exist.
    async fn delete_bridge(&self, name: &str) -> Result<(), FabricError>;

    /// Create a veth pair, move one end into `container_pid`'s network
    /// namespace and rename it to `if_name`, bring both ends up, and apply
    /// `settings` (MPLS sysctls, VRF enslavement). If `attach_to_bridge` is
    /// false the host end is created but *not* added to `bridge` yet (the
    /// caller will batch it into a later [`FabricDriver::bulk_add_to_bridge`]
    /// call). Returns the resulting [`HostIface`] record.
    ///
    /// `if_name` must be unique within `container_name`'s interface list;
    /// violating that is a [`FabricError::DuplicateInterface`].
    #[allow(clippy::too_many_arguments)]
    async fn attach_port_to_container(
        &self,
        bridge: &str,
        if_name: &str,
        container_pid: i32,
        container_name: &str,
        settings: PortSettings,
        attach_to_bridge: bool,
    ) -> Result<HostIface, FabricError>;

    /// Add many host-side veth ends to their bridges in one batched
    /// operation, keyed by owning container name -- used after the
    /// per-container `attach_port_to_container(.., attach_to_bridge: false)`
    /// pass so every container exists before any bridge/port wiring
    /// happens (spec.md §5's ordering guarantee).
    async fn bulk_add_to_bridge(
        &self,
        ports: &BTreeMap<String, Vec<HostIface>>,
    ) -> Result<(), FabricError>;

    /// Install bidirectional point-to-point forwarding between two ports
    /// of the same bridge, emulating a dedicated link over a bridge that
    /// may carry many other ports (every internal link in an AS shares one
    /// `int-<asn>` bridge; flow rules are what keep them from behaving
    /// like one flat LAN).
    async fn add_flow(&self, bridge: &str, src_if: &str, dst_if: &str) -> Result<(), FabricError>;

    /// Remove a single host-side port from a bridge (used by `pause`,
    /// which keeps bridges around but tears down ports).
    async fn delete_port(&self, bridge: &str, host_if: &str) -> Result<(), FabricError>;
}
