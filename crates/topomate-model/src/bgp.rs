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

//! BGP neighbor sessions and the process-wide relation-community defaults.

use serde::{Deserialize, Serialize};
use topomate_types::{AddressFamily, Asn, InterfaceId, Relation};

/// Where a session's `update-source` points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateSource {
    /// `update-source lo` -- the default for iBGP.
    Loopback,
    /// `update-source <ifname>` -- used for eBGP and route-server
    /// sessions, where the peer is directly attached.
    Interface(InterfaceId),
}

/// A single BGP neighbor relationship, keyed in the owning [`crate::Router`]
/// by the remote endpoint's address in text form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BgpNeighbor {
    /// The neighbor's AS number.
    pub remote_asn: Asn,
    /// Where this session's updates are sourced from.
    pub update_source: UpdateSource,
    /// `disable-connected-check`, needed for multi-hop eBGP over
    /// loopbacks.
    pub disable_connected_check: bool,
    /// `next-hop-self`, typically set on RR and PE sessions.
    pub next_hop_self: bool,
    /// Inbound route-map name, if any.
    pub route_map_in: Option<String>,
    /// Outbound route-map name, if any.
    pub route_map_out: Option<String>,
    /// Address families activated for this neighbor.
    pub families: AddressFamily,
    /// `route-reflector-client`.
    pub rr_client: bool,
    /// `route-server-client`.
    pub rs_client: bool,
    /// The local interface facing this neighbor, when the session is
    /// directly attached rather than multi-hop (eBGP, IXP route-server).
    pub peer_interface: Option<InterfaceId>,
    /// Mask length of the peer's address, used for the static host route
    /// emitted for external neighbors.
    pub prefix_len: u8,
}

impl BgpNeighbor {
    /// A default iBGP full-mesh neighbor: loopback-sourced, no policy.
    pub fn ibgp_default(remote_asn: Asn, families: AddressFamily, prefix_len: u8) -> Self {
        Self {
            remote_asn,
            update_source: UpdateSource::Loopback,
            disable_connected_check: false,
            next_hop_self: false,
            route_map_in: None,
            route_map_out: None,
            families,
            rr_client: false,
            rs_client: false,
            peer_interface: None,
            prefix_len,
        }
    }
}

/// Community value + local-preference pair the emitter assigns to routes
/// learned from a given relation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RelationDefault {
    /// The `<asn>:<community>` suffix attached to routes from this
    /// relation.
    pub community: u32,
    /// The local-preference assigned to routes from this relation.
    pub local_pref: u32,
}

/// Process-wide settings mapping a relation to its community/local-pref
/// pair, seeded with the source material's defaults and overridable by the
/// spec's `global_settings.bgp` block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GlobalBgpDefaults {
    /// Applied to routes learned from a customer.
    pub customer: RelationDefault,
    /// Applied to routes learned from a provider.
    pub provider: RelationDefault,
    /// Applied to routes learned from a settlement-free peer.
    pub peer: RelationDefault,
}

impl Default for GlobalBgpDefaults {
    fn default() -> Self {
        Self {
            customer: RelationDefault {
                community: 10,
                local_pref: 300,
            },
            provider: RelationDefault {
                community: 20,
                local_pref: 100,
            },
            peer: RelationDefault {
                community: 30,
                local_pref: 200,
            },
        }
    }
}

impl GlobalBgpDefaults {
    /// The default for a given relation, as seen from the route recipient
    /// (`Provider` means "I learned this from my provider").
    pub fn for_relation(&self, relation: Relation) -> Option<RelationDefault> {
        match relation {
            Relation::Customer => Some(self.customer),
            Relation::Provider => Some(self.provider),
            Relation::Peer => Some(self.peer),
            Relation::None => None,
        }
    }
}

/// Manual iBGP structure: route reflectors plus any additional full-mesh
/// cliques, as an alternative to the default all-pairs full-mesh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualIbgp {
    /// Route-reflector assignments.
    pub route_reflectors: Vec<RouteReflector>,
    /// Additional groups of routers that should full-mesh among
    /// themselves (on top of any RR relationships).
    pub cliques: Vec<Vec<topomate_types::RouterId>>,
}

/// One route reflector and the clients it serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteReflector {
    /// The reflector router.
    pub router: topomate_types::RouterId,
    /// Its clients.
    pub clients: Vec<topomate_types::RouterId>,
}

/// How an AS's iBGP full-mesh is structured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IbgpStructure {
    /// Every pair of routers peers directly (the default).
    FullMesh,
    /// Route reflectors plus declared cliques.
    Manual(ManualIbgp),
}

impl Default for IbgpStructure {
    fn default() -> Self {
        IbgpStructure::FullMesh
    }
}

/// AS-level BGP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsBgpConfig {
    /// If set, no BGP block is emitted for this AS at all.
    pub disabled: bool,
    /// Whether IGP routes are redistributed into BGP.
    pub redistribute_igp: bool,
    /// iBGP topology.
    pub ibgp: IbgpStructure,
}

impl Default for AsBgpConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            redistribute_igp: false,
            ibgp: IbgpStructure::default(),
        }
    }
}
