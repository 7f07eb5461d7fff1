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

//! Serde types mirroring the declarative YAML topology input. These are
//! deliberately permissive (almost everything is `Option`) since the
//! builder crate is responsible for applying defaults and reporting spec
//! errors with a diagnostic naming the offending entry -- this crate only
//! has to get the bytes off disk and into a typed shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level declarative topology spec, as read from the input YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologySpec {
    /// Project name.
    pub name: String,
    /// Process-wide BGP relation-community overrides.
    #[serde(default)]
    pub global_settings: Option<GlobalSettings>,
    /// Autonomous systems.
    pub autonomous_systems: Vec<AsSpec>,
    /// Cross-AS links, given inline.
    #[serde(default)]
    pub external_links: Option<Vec<ExternalLinkSpec>>,
    /// Cross-AS links, given as a path to a file instead of inline.
    #[serde(default)]
    pub external_links_file: Option<String>,
    /// Internet Exchange Points.
    #[serde(default)]
    pub ixps: Option<Vec<IxpSpec>>,
    /// RPKI validators, keyed by hostname.
    #[serde(default)]
    pub rpki: Option<BTreeMap<String, RpkiHostSpec>>,
}

/// `global_settings` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// BGP relation-community overrides.
    #[serde(default)]
    pub bgp: Option<GlobalBgpSettings>,
}

/// `global_settings.bgp` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalBgpSettings {
    /// Override for routes learned from a customer.
    #[serde(default)]
    pub customer: Option<RelationSetting>,
    /// Override for routes learned from a provider.
    #[serde(default)]
    pub provider: Option<RelationSetting>,
    /// Override for routes learned from a settlement-free peer.
    #[serde(default)]
    pub peer: Option<RelationSetting>,
}

/// One relation's community/local-preference override.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RelationSetting {
    /// The `<asn>:<community>` suffix.
    pub community: u32,
    /// The local-preference value.
    pub local_pref: u32,
}

/// One `autonomous_systems` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsSpec {
    /// AS number.
    pub asn: u32,
    /// Number of routers to instantiate (1..=routers).
    pub routers: u32,
    /// `"ospf"`, `"isis"`, or empty/absent for no IGP.
    #[serde(default)]
    pub igp: Option<String>,
    /// CIDR this AS sub-allocates internal link subnets from.
    pub prefix: String,
    /// Starting loopback CIDR (`/32` for IPv4, `/128` for IPv6).
    #[serde(default)]
    pub loopback_start: Option<String>,
    /// AS-level BGP settings.
    #[serde(default)]
    pub bgp: Option<AsBgpSpec>,
    /// Internal-link topology.
    #[serde(default)]
    pub links: Option<LinksSpec>,
    /// IS-IS level/area assignment.
    #[serde(default)]
    pub isis: Option<IsisSpec>,
    /// OSPF network/area/stub assignment.
    #[serde(default)]
    pub ospf: Option<OspfSpec>,
    /// Enable MPLS/LDP.
    #[serde(default)]
    pub mpls: Option<bool>,
    /// L3VPNs hosted by this AS's PEs.
    #[serde(default)]
    pub vpn: Option<Vec<VpnSpec>>,
    /// RPKI servers this AS's routers should validate against.
    #[serde(default)]
    pub rpki: Option<RpkiRefsSpec>,
}

/// `autonomous_systems[].bgp` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsBgpSpec {
    /// Suppress BGP entirely for this AS.
    #[serde(default)]
    pub disabled: Option<bool>,
    /// Redistribute IGP routes into BGP.
    #[serde(default)]
    pub redistribute_igp: Option<bool>,
    /// iBGP structure override.
    #[serde(default)]
    pub ibgp: Option<IbgpSpec>,
}

/// `autonomous_systems[].bgp.ibgp` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbgpSpec {
    /// If true, `route_reflectors`/`cliques` replace the default
    /// full-mesh; if false or absent, the default full-mesh applies.
    #[serde(default)]
    pub manual: Option<bool>,
    /// Route reflector assignments.
    #[serde(default)]
    pub route_reflectors: Option<Vec<RouteReflectorSpec>>,
    /// Additional full-mesh cliques.
    #[serde(default)]
    pub cliques: Option<Vec<Vec<u32>>>,
}

/// One `route_reflectors` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteReflectorSpec {
    /// The reflector's router index.
    pub router: u32,
    /// Its clients' router indices.
    pub clients: Vec<u32>,
}

/// `autonomous_systems[].links` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksSpec {
    /// `"manual"`, `"ring"`, or `"full-mesh"`.
    #[serde(default)]
    pub kind: Option<String>,
    /// Prefix length for each sub-allocated point-to-point subnet.
    #[serde(default)]
    pub subnet_length: Option<u8>,
    /// Inline manual link specs (used when `kind == "manual"` and no
    /// `file` is given).
    #[serde(default)]
    pub specs: Option<Vec<ManualLinkSpec>>,
    /// Path to a manual-link file (`FROM TO SPEED [COST_A [COST_B]]` per
    /// line, `#`-prefixed lines ignored).
    #[serde(default)]
    pub file: Option<String>,
    /// Alternate spelling of `kind` seen in some inputs (`"preset"`);
    /// `kind` takes precedence when both are given.
    #[serde(default)]
    pub preset: Option<String>,
}

/// One inline manual link spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualLinkSpec {
    /// First endpoint's router index.
    pub first: u32,
    /// Second endpoint's router index.
    pub second: u32,
    /// Nominal speed in Mbit/s; defaults to 1000 if absent.
    #[serde(default)]
    pub speed: Option<u32>,
    /// IGP cost on the first endpoint's side.
    #[serde(default)]
    pub cost_a: Option<u32>,
    /// IGP cost on the second endpoint's side; defaults to `cost_a` if
    /// absent.
    #[serde(default)]
    pub cost_b: Option<u32>,
}

/// `autonomous_systems[].isis` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsisSpec {
    /// Routers forced to level-1-only.
    #[serde(default, rename = "level-1")]
    pub level_1: Option<Vec<u32>>,
    /// Routers forced to level-2-only.
    #[serde(default, rename = "level-2")]
    pub level_2: Option<Vec<u32>>,
    /// Routers forced to level-1-2.
    #[serde(default, rename = "level-1-2")]
    pub level_1_2: Option<Vec<u32>>,
    /// Area assignment: area number to the router indices within it.
    #[serde(default)]
    pub areas: Option<BTreeMap<u32, Vec<u32>>>,
}

/// `autonomous_systems[].ospf` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OspfSpec {
    /// Explicit network-to-area assignments.
    #[serde(default)]
    pub networks: Option<Vec<OspfNetworkSpec>>,
    /// Areas configured as stub.
    #[serde(default)]
    pub stubs: Option<Vec<u32>>,
}

/// One `ospf.networks` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OspfNetworkSpec {
    /// Network prefix.
    pub prefix: String,
    /// OSPF area.
    pub area: u32,
    /// Router indices this network statement applies to.
    pub routers: Vec<u32>,
}

/// One `vpn` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VpnSpec {
    /// VRF name.
    pub vrf: String,
    /// Enables hub-and-spoke mode.
    #[serde(default)]
    pub hub_and_spoke: Option<bool>,
    /// Customer sites.
    pub customers: Vec<VpnCustomerSpec>,
}

/// One `vpn[].customers` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VpnCustomerSpec {
    /// CE hostname.
    pub hostname: String,
    /// CE loopback CIDR.
    #[serde(default)]
    pub loopback: Option<String>,
    /// Subnet announced by this customer.
    #[serde(default)]
    pub subnet: Option<String>,
    /// Subnet the customer is reachable over from the PE side.
    #[serde(default)]
    pub remote_subnet: Option<String>,
    /// Hub-and-spoke downstream subnet.
    #[serde(default)]
    pub downstream_subnet: Option<String>,
    /// PE router index this customer attaches to.
    pub parent: u32,
    /// Whether this customer is the hub.
    #[serde(default)]
    pub hub: Option<bool>,
}

/// `autonomous_systems[].rpki` block: references into the top-level `rpki`
/// map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpkiRefsSpec {
    /// Hostnames of `rpki` entries this AS's routers should trust.
    pub servers: Vec<String>,
}

/// `(asn, router index)` pair, used throughout the schema to reference a
/// specific router.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AsRouterRef {
    /// AS number.
    pub asn: u32,
    /// Router index within that AS.
    pub router_id: u32,
}

/// One `external_links` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalLinkSpec {
    /// Initiating side.
    pub from: AsRouterRef,
    /// Responding side.
    pub to: AsRouterRef,
    /// Relation as seen from `from`: `"p2c"`, `"c2p"`, or `"p2p"`.
    pub rel: String,
}

/// One `ixps` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IxpSpec {
    /// The IXP's synthetic AS number.
    pub asn: u32,
    /// Fabric address prefix.
    pub prefix: String,
    /// Route-server loopback CIDR.
    #[serde(default)]
    pub loopback: Option<String>,
    /// Peers, each `"<asn>.<router_id>[ speed]"` (e.g. `"65001.1 1000"`).
    pub peers: Vec<String>,
}

/// One `rpki` map entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpkiHostSpec {
    /// Address the validator listens on.
    pub server_address: String,
    /// Router this validator is linked to.
    pub linked_to: AsRouterRef,
    /// Path to a ROA table file loaded into the validator, if any.
    #[serde(default)]
    pub cache_file: Option<String>,
}
