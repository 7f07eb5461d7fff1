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

//! Identifier and small value types shared across the topomate workspace.
//!
//! Entities that used to form cyclic ownership graphs in the source material
//! (a router pointing at its interfaces, an interface pointing back at its
//! link, a link pointing at both routers) are represented here as stable,
//! arena-local indices instead. Each index is scoped to the arena that
//! allocated it (an [`Asn`] only identifies an `AutonomousSystem` inside a
//! `topomate_model` `Project`, a [`RouterId`] only inside the
//! `AutonomousSystem` that owns it, and so on) -- see the crate-level docs
//! of `topomate-model` for the arenas themselves.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A BGP Autonomous System Number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Asn(pub u32);

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AS{}", self.0)
    }
}

impl From<u32> for Asn {
    fn from(x: u32) -> Self {
        Self(x)
    }
}

impl From<i64> for Asn {
    fn from(x: i64) -> Self {
        Self(x as u32)
    }
}

/// Index of a [`Router`](../topomate_model/struct.Router.html) within the
/// `Vec` of routers owned by its `AutonomousSystem`. 1-based to match the
/// declarative spec's `router_id` field; use [`RouterId::index`] to obtain
/// the 0-based `Vec` position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RouterId(pub u32);

impl RouterId {
    /// Build a `RouterId` from a 1-based router number as it appears in the
    /// declarative spec and in container names (`AS<asn>-R<id>`).
    pub fn from_one_based(id: u32) -> Self {
        Self(id)
    }

    /// The 0-based index into `AutonomousSystem::routers`.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl fmt::Display for RouterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Index of a [`NetInterface`] within the `Vec` of interfaces owned by a
/// single router. Monotonically increasing as interfaces are attached;
/// never reused even if a link is later removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InterfaceId(pub u32);

impl InterfaceId {
    /// The conventional FRR-style interface name for this index (`eth<k>`).
    pub fn as_eth_name(self) -> String {
        format!("eth{}", self.0)
    }
}

/// Index of a [`Link`] within the `Vec` of internal links owned by an AS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkId(pub u32);

/// Index of an [`ExternalLink`] within the project-wide `Vec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExternalLinkId(pub u32);

/// The interior gateway protocol run inside an AS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgpKind {
    /// No IGP: loopbacks and links are configured but never redistributed.
    None,
    /// OSPFv2 (IPv4 networks) or OSPFv3 (IPv6 networks), chosen by the AS's
    /// address family.
    Ospf,
    /// IS-IS with areas and L1/L2 levels.
    Isis,
}

impl Default for IgpKind {
    fn default() -> Self {
        IgpKind::None
    }
}

/// IS-IS level membership of a router or a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IsisLevel {
    /// Level-1 only (intra-area).
    L1,
    /// Level-2 only (inter-area).
    L2,
    /// Level-1-2 (area border).
    L1L2,
}

impl Default for IsisLevel {
    fn default() -> Self {
        IsisLevel::L2
    }
}

impl IsisLevel {
    /// FRR's textual spelling of `is-type`/`isis circuit-type`.
    pub fn as_frr_str(self) -> &'static str {
        match self {
            IsisLevel::L1 => "level-1",
            IsisLevel::L2 => "level-2-only",
            IsisLevel::L1L2 => "level-1-2",
        }
    }
}

/// The AS-relationship of one end of an [`ExternalLink`], as seen from that
/// end (`Provider` means "the other side is my customer").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    /// The remote AS is a customer of the local AS.
    Provider,
    /// The remote AS is a provider of the local AS.
    Customer,
    /// The remote AS is a settlement-free peer.
    Peer,
    /// No commercial relationship is modeled (IXP route-server sessions).
    None,
}

bitflags::bitflags! {
    /// BGP address families a neighbor session can be activated for.
    #[derive(Serialize, Deserialize)]
    pub struct AddressFamily: u8 {
        /// `address-family ipv4 unicast`
        const IPV4 = 0b0001;
        /// `address-family ipv6 unicast`
        const IPV6 = 0b0010;
        /// `address-family ipv4 vpn`
        const VPNV4 = 0b0100;
        /// `address-family ipv6 vpn`
        const VPNV6 = 0b1000;
    }
}

impl AddressFamily {
    /// The address family matching a network's IP version, as used for the
    /// default iBGP full-mesh (`network.Is4()` in the source material).
    pub fn of_is4(is4: bool) -> Self {
        if is4 {
            AddressFamily::IPV4
        } else {
            AddressFamily::IPV6
        }
    }
}

/// Errors shared by more than one crate in the workspace: malformed
/// references that can only be detected once the whole project is visible.
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    /// An AS number referenced in the spec does not exist in the project.
    #[error("unknown AS{0}")]
    UnknownAsn(u32),
    /// A router index referenced in the spec is out of range for its AS.
    #[error("AS{asn} has no router {router} (has 1..={max})")]
    RouterOutOfRange { asn: u32, router: u32, max: u32 },
}
