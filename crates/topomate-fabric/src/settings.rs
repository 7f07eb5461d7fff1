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

use serde::{Deserialize, Serialize};

/// Per-port parameters an [`crate::FabricDriver`] applies when attaching or
/// bulk-attaching a host-side veth end to a bridge.
///
/// Mirrors `ovsdocker.PortSettings` in the source material, extended with
/// `of_port`/`vrf` the way spec.md §4.4/§6 describe the persisted
/// `links.json` `Settings` object (`MTU`, `Speed`, `OFPort`, `VRF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSettings {
    /// Interface MTU in bytes.
    pub mtu: u32,
    /// Nominal link speed in Mbit/s; used to compute an `ovs-vsctl`
    /// ingress-policing rate (`speed * 1000`, matching the source's
    /// kbit/s units).
    pub speed: u32,
    /// Requested OpenFlow port number for this host-side port, if the
    /// caller wants a stable number across bulk-attach/resume cycles.
    /// `None` lets OVS assign one.
    pub of_port: Option<u32>,
    /// VRF device this interface should be enslaved to, if any (PE-CE and
    /// VPN-bound interfaces).
    pub vrf: Option<String>,
    /// Enable MPLS input and bump `platform_labels` inside the container
    /// namespace (spec.md §4.4).
    pub mpls: bool,
}

impl PortSettings {
    /// The defaults an unconfigured link gets (`DefaultParams` in the
    /// source material).
    pub fn default_params() -> Self {
        Self {
            mtu: 1500,
            speed: 10_000,
            of_port: None,
            vrf: None,
            mpls: false,
        }
    }
}

impl Default for PortSettings {
    fn default() -> Self {
        Self::default_params()
    }
}

/// One host-side veth end attached to a bridge, as recorded in the
/// persisted link inventory (spec.md §6's `links.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostIface {
    /// Host-side interface name (`<uuid>_l`).
    pub host_if: String,
    /// Bridge this port is (or should be) attached to.
    pub bridge: String,
    /// Name the interface was renamed to inside the container's
    /// namespace.
    pub container_if: String,
    /// Port parameters applied at attach time.
    pub settings: PortSettings,
}
