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

//! The root aggregate: a project, its autonomous systems, and everything
//! that crosses AS boundaries.

use std::collections::BTreeMap;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use topomate_types::{Asn, IgpKind, LinkId, RouterId};

use crate::bgp::{AsBgpConfig, GlobalBgpDefaults};
use crate::error::ModelError;
use crate::host::Host;
use crate::ixp::Ixp;
use crate::link::{ExternalLink, Link};
use crate::router::Router;
use crate::rpki::RpkiServer;
use crate::vpn::Vpn;

/// The fully elaborated topology: the output of the builder crate and the
/// input to the config emitter and orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Human-readable project name, as given to `project create`.
    pub name: String,
    /// Autonomous systems, including IXP route-server ASes.
    pub autonomous_systems: Vec<AutonomousSystem>,
    /// Cross-AS links (eBGP-bearing).
    pub external_links: Vec<ExternalLink>,
    /// Internet Exchange Points.
    pub ixps: Vec<Ixp>,
    /// RPKI validators, independent of which AS/router they're linked to.
    pub rpki_servers: Vec<RpkiServer>,
    /// Process-wide BGP relation defaults, read by the emitter when
    /// producing relation route-maps.
    pub global_bgp: GlobalBgpDefaults,
}

impl Project {
    /// Start an empty project.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            autonomous_systems: Vec::new(),
            external_links: Vec::new(),
            ixps: Vec::new(),
            rpki_servers: Vec::new(),
            global_bgp: GlobalBgpDefaults::default(),
        }
    }

    /// Look up an AS by number.
    pub fn as_by_asn(&self, asn: Asn) -> Option<&AutonomousSystem> {
        self.autonomous_systems.iter().find(|a| a.asn == asn)
    }

    /// Look up an AS by number, mutably.
    pub fn as_by_asn_mut(&mut self, asn: Asn) -> Option<&mut AutonomousSystem> {
        self.autonomous_systems.iter_mut().find(|a| a.asn == asn)
    }

    /// Check the project-wide invariants from the data model: unique AS
    /// numbers, every AS has at least one router, every external link and
    /// IXP peer references an AS and router that actually exist, and no
    /// AS has overlapping internal-link subnets.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut seen = BTreeMap::new();
        for a in &self.autonomous_systems {
            if seen.insert(a.asn, ()).is_some() {
                return Err(ModelError::DuplicateAsn(a.asn.0));
            }
            a.validate()?;
        }

        for link in &self.external_links {
            self.check_ref(link.from.asn, link.from.router)?;
            self.check_ref(link.to.asn, link.to.router)?;
        }

        for ixp in &self.ixps {
            for peer in &ixp.peers {
                self.check_ref(peer.asn, peer.router)?;
            }
        }

        Ok(())
    }

    fn check_ref(&self, asn: Asn, router: RouterId) -> Result<(), ModelError> {
        let a = self
            .as_by_asn(asn)
            .ok_or(ModelError::UnknownAsn(asn.0))?;
        if !a.routers.iter().any(|r| r.id == router) {
            return Err(ModelError::UnknownRouter { asn: asn.0, router });
        }
        Ok(())
    }
}

/// One route-reflector relationship; re-exported here for convenience of
/// callers that only import `project`.
pub use crate::bgp::{IbgpStructure, ManualIbgp, RouteReflector};

/// An autonomous system: a set of routers, the links between them, and
/// everything configured at AS scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutonomousSystem {
    /// This AS's number.
    pub asn: Asn,
    /// Interior gateway protocol, if any.
    pub igp: IgpKind,
    /// Whether MPLS/LDP is enabled for this AS.
    pub mpls: bool,
    /// Address space this AS sub-allocates internal link subnets from.
    pub network: IpNet,
    /// Starting point for per-router loopback assignment, incremented once
    /// per router.
    pub loopback_start: Option<IpNet>,
    /// AS-level BGP configuration.
    pub bgp: AsBgpConfig,
    /// OSPF area numbers configured as stub areas.
    pub ospf_stub_areas: Vec<u32>,
    /// Routers belonging to this AS (1..=routers.len(), in order).
    pub routers: Vec<Router>,
    /// Internal links between this AS's routers.
    pub links: Vec<Link>,
    /// Auxiliary non-routing hosts (RPKI daemons and similar).
    pub hosts: Vec<Host>,
    /// VPNs whose PEs live in this AS.
    pub vpns: Vec<Vpn>,
    /// Next [`LinkId`] to hand out.
    pub next_link: u32,
}

impl AutonomousSystem {
    /// Start an AS with `n` freshly created, interface-less routers.
    pub fn new(asn: Asn, network: IpNet, n: u32) -> Self {
        let routers = (1..=n)
            .map(|i| {
                let id = RouterId::from_one_based(i);
                Router::new(id, format!("R{i}"))
            })
            .collect();
        Self {
            asn,
            igp: IgpKind::None,
            mpls: false,
            network,
            loopback_start: None,
            bgp: AsBgpConfig::default(),
            ospf_stub_areas: Vec::new(),
            routers,
            links: Vec::new(),
            hosts: Vec::new(),
            vpns: Vec::new(),
            next_link: 0,
        }
    }

    /// Look up a router by id.
    pub fn router(&self, id: RouterId) -> Option<&Router> {
        self.routers.get(id.index())
    }

    /// Look up a router by id, mutably.
    pub fn router_mut(&mut self, id: RouterId) -> Option<&mut Router> {
        self.routers.get_mut(id.index())
    }

    /// Allocate the next link id.
    pub fn alloc_link_id(&mut self) -> LinkId {
        let id = LinkId(self.next_link);
        self.next_link += 1;
        id
    }

    /// Check this AS's own invariants: `NumRouters >= 1`, link endpoints
    /// reference real routers and interfaces, and link subnets are
    /// pairwise disjoint.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.routers.is_empty() {
            return Err(ModelError::EmptyAs(self.asn.0));
        }

        for link in &self.links {
            for end in [link.a, link.b] {
                let router = self.router(end.router).ok_or(ModelError::UnknownRouter {
                    asn: self.asn.0,
                    router: end.router,
                })?;
                if router.interface(end.interface).is_none() {
                    return Err(ModelError::UnknownInterface {
                        asn: self.asn.0,
                        router: end.router,
                        interface: end.interface,
                    });
                }
            }
        }

        let mut subnets: Vec<IpNet> = self.links.iter().filter_map(|l| l.subnet).collect();
        subnets.sort_by_key(|n| (n.network(), n.prefix_len()));
        for pair in subnets.windows(2) {
            if pair[0].contains(&pair[1]) || pair[0] == pair[1] {
                return Err(ModelError::OverlappingSubnets {
                    asn: self.asn.0,
                    a: pair[0].to_string(),
                    b: pair[1].to_string(),
                });
            }
        }

        Ok(())
    }
}
