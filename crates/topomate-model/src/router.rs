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

//! Routers and the interfaces attached to them.

use std::collections::BTreeMap;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use topomate_types::{AddressFamily, Asn, InterfaceId, IsisLevel, RouterId};

use crate::bgp::BgpNeighbor;
use crate::rpki::RpkiCacheRef;

/// A simulated router: one container in the eventual datapath.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Router {
    /// 1-based position within its AS's router list.
    pub id: RouterId,
    /// Human-readable hostname, also used in generated config filenames.
    pub hostname: String,
    /// Loopback addresses assigned to this router (normally exactly one).
    pub loopbacks: Vec<IpNet>,
    /// Interfaces, in attach order. Index into this vec is not stable
    /// across removals; use [`InterfaceId`] to refer to a specific one.
    pub interfaces: Vec<NetInterface>,
    /// BGP neighbor sessions, keyed by the neighbor's loopback (or, absent
    /// a loopback, interface) address rendered as text. This is the
    /// session's unique identity per (router, remote endpoint) pair.
    pub neighbors: BTreeMap<String, BgpNeighbor>,
    /// Next value [`InterfaceId`] will hand out when a link attaches here.
    /// Monotonic: never reused, even if an interface is later detached.
    pub next_interface: u32,
    /// Container image override; `None` uses the project-wide default.
    pub image: Option<String>,
    /// IS-IS area/level, if this router participates in IS-IS.
    pub isis: Option<RouterIsisConfig>,
    /// Per-VRF BGP parameters for VPN participation (populated for PE
    /// routers that host one or more VRFs).
    pub vrfs: BTreeMap<String, VrfBgpConfig>,
    /// RPKI caches this router validates against, in preference order
    /// (populated from the AS-level `rpki.servers` reference list).
    pub rpki_caches: Vec<RpkiCacheRef>,
}

impl Router {
    /// Start a new, interface-less router.
    pub fn new(id: RouterId, hostname: impl Into<String>) -> Self {
        Self {
            id,
            hostname: hostname.into(),
            loopbacks: Vec::new(),
            interfaces: Vec::new(),
            neighbors: BTreeMap::new(),
            next_interface: 0,
            image: None,
            isis: None,
            vrfs: BTreeMap::new(),
            rpki_caches: Vec::new(),
        }
    }

    /// The container name this router will run under (`AS<asn>-R<id>`).
    pub fn container_name(&self, asn: Asn) -> String {
        format!("AS{}-R{}", asn.0, self.id.0)
    }

    /// Attach a new interface, assigning it the next `eth<k>` name and
    /// advancing the monotonic counter. Returns the new interface's id.
    pub fn attach_interface(&mut self, mut iface: NetInterface) -> InterfaceId {
        let id = InterfaceId(self.next_interface);
        self.next_interface += 1;
        iface.id = id;
        self.interfaces.push(iface);
        id
    }

    /// Look up an interface by id.
    pub fn interface(&self, id: InterfaceId) -> Option<&NetInterface> {
        self.interfaces.iter().find(|i| i.id == id)
    }

    /// Look up an interface by id, mutably.
    pub fn interface_mut(&mut self, id: InterfaceId) -> Option<&mut NetInterface> {
        self.interfaces.iter_mut().find(|i| i.id == id)
    }

    /// The first IPv4 loopback, if any -- used for BGP router-id selection
    /// and IS-IS NET construction.
    pub fn first_ipv4_loopback(&self) -> Option<IpNet> {
        self.loopbacks.iter().copied().find(|l| l.addr().is_ipv4())
    }
}

/// IS-IS participation of a single router.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RouterIsisConfig {
    /// IS-IS area number this router belongs to.
    pub area: u32,
    /// The router's level membership.
    pub level: IsisLevel,
}

/// Per-VRF BGP configuration attached to a PE router (populated by the
/// builder when it attaches a VPN customer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VrfBgpConfig {
    /// Route Distinguisher, `<asn>:<n>`.
    pub rd: String,
    /// Route Targets imported into this VRF.
    pub import_rt: Vec<String>,
    /// Route Targets exported from this VRF.
    pub export_rt: Vec<String>,
}

/// One end of a [`crate::link::Link`] or [`crate::link::ExternalLink`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetInterface {
    /// Stable id within the owning router; also determines the `eth<k>`
    /// name.
    pub id: InterfaceId,
    /// Free-text description, typically naming the link's remote end.
    pub description: Option<String>,
    /// Address assigned to this interface; `None` if auto-addressing was
    /// disabled for the link.
    pub ip: Option<IpNet>,
    /// Nominal link speed in Mbit/s, used for fabric port policers.
    pub speed: u32,
    /// IGP-agnostic interface cost (OSPF `bandwidth` or generic metric).
    pub cost: Option<u32>,
    /// `true` for PE-CE and route-server/peer-facing interfaces: excluded
    /// from the internal IGP and iBGP full-mesh.
    pub external: bool,
    /// VRF this interface belongs to, if any.
    pub vrf: Option<String>,
    /// Protocol-specific interface attributes.
    pub igp: InterfaceIgp,
}

impl NetInterface {
    /// The conventional `eth<k>` name for this interface.
    pub fn name(&self) -> String {
        self.id.as_eth_name()
    }

    /// Build a bare interface with no protocol attributes, no address.
    pub fn bare(speed: u32) -> Self {
        Self {
            id: InterfaceId(0),
            description: None,
            ip: None,
            speed,
            cost: None,
            external: false,
            vrf: None,
            igp: InterfaceIgp::None,
        }
    }
}

/// Tagged variant replacing the source material's runtime type-switch on
/// "is this an OSPF/OSPFv6/ISIS interface config".
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum InterfaceIgp {
    /// Not part of any IGP.
    None,
    /// OSPF (v2 or v3, dispatched by address family at emission time).
    Ospf {
        /// OSPF area, in the numeric (not dotted) form.
        area: u32,
    },
    /// IS-IS.
    Isis {
        /// Circuit type for this link, inferred from the two endpoints.
        circuit: IsisLevel,
        /// `isis passive` -- advertised but no adjacency formed.
        passive: bool,
        /// `isis metric`.
        metric: u32,
    },
}

/// A neighbor's families, convenience re-export so callers of this module
/// don't also need to import `topomate_types` directly for the common
/// case.
pub type Families = AddressFamily;
