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

//! L3VPN overlays.

use std::collections::BTreeSet;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use topomate_types::RouterId;

use crate::router::Router;

/// An L3VPN overlay: a VRF shared by a set of customer sites hanging off
/// PE routers within one AS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vpn {
    /// VRF name, shared verbatim by every participating PE.
    pub vrf: String,
    /// Customer sites.
    pub customers: Vec<VpnCustomer>,
    /// PE loopback-bearing routers that must establish VPNv4/VPNv6
    /// sessions with each other for this VRF's routes to propagate.
    pub neighbors: BTreeSet<RouterId>,
    /// Subnets announced from the hub side down to spokes. Presence
    /// (including an empty list, per the corrected semantics -- see
    /// `is_hub_and_spoke`) means hub-and-spoke mode; absence means a flat
    /// any-to-any VRF.
    pub spoke_subnets: Option<Vec<IpNet>>,
}

impl Vpn {
    /// Whether this VPN is in hub-and-spoke mode.
    ///
    /// The source material's equivalent check reads
    /// `spokeSubnets != nil || len(spokeSubnets) > 0`, which is redundant
    /// (the second clause implies the first). The evident intent --
    /// confirmed by every call site that only ever tests "has the operator
    /// declared spoke subnets at all" -- is simply "the field was set",
    /// which for an `Option` is just `is_some()`.
    pub fn is_hub_and_spoke(&self) -> bool {
        self.spoke_subnets.is_some()
    }

    /// The customers flagged as hubs.
    pub fn hubs(&self) -> impl Iterator<Item = &VpnCustomer> {
        self.customers.iter().filter(|c| c.hub)
    }
}

/// A customer site attached to a VPN: a CE router plus the PE it connects
/// to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VpnCustomer {
    /// The CE router modeling this customer site. Owned here rather than
    /// in the AS's router list: CE routers are outside the AS's internal
    /// IGP/iBGP and are only ever reached through their VPN.
    pub ce: Router,
    /// The PE router (within the AS) this customer attaches to.
    pub parent: RouterId,
    /// Subnet announced by this customer, reachable via the PE's VRF.
    pub subnet: Option<IpNet>,
    /// Subnet the customer receives from the VRF (used for hub-and-spoke
    /// downstream routes).
    pub remote_subnet: Option<IpNet>,
    /// In hub-and-spoke mode, an extra subnet the hub redistributes
    /// downstream to this spoke via the mirrored `<vrf>_down` VRF.
    pub downstream_subnet: Option<IpNet>,
    /// Whether this customer is the hub (only meaningful when the VPN is
    /// hub-and-spoke; at most one customer should set this).
    pub hub: bool,
}
