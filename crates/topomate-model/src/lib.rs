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

//! The elaborated topology data model.
//!
//! A [`Project`] is the root aggregate: it owns a list of
//! [`AutonomousSystem`]s, plus everything that crosses AS boundaries
//! (external links, IXPs, RPKI validators, and the process-wide BGP
//! relation defaults). Entities are created during topology elaboration
//! (see the `topomate-builder` crate) and are treated as immutable once
//! handed to the config emitter or orchestrator.
//!
//! Ownership that used to be cyclic in the source material -- a router
//! pointing at its interfaces, an interface pointing back at its link, a
//! link pointing at both routers -- is flattened here into plain `Vec`
//! storage plus stable, AS-scoped indices from `topomate_types`
//! ([`topomate_types::RouterId`], [`topomate_types::InterfaceId`],
//! [`topomate_types::LinkId`]). Dereferencing an index always goes through
//! the owning [`AutonomousSystem`] or [`crate::router::Router`]; nothing
//! stores a back-pointer.

pub mod bgp;
pub mod error;
pub mod host;
pub mod ixp;
pub mod link;
pub mod project;
pub mod router;
pub mod rpki;
pub mod vpn;

pub use bgp::{AsBgpConfig, BgpNeighbor, GlobalBgpDefaults, IbgpStructure, UpdateSource};
pub use error::ModelError;
pub use host::Host;
pub use ixp::{Ixp, IxpPeer};
pub use link::{ExtLinkItem, ExternalLink, Link, LinkItem};
pub use project::{AutonomousSystem, Project};
pub use router::{InterfaceIgp, NetInterface, Router, RouterIsisConfig, VrfBgpConfig};
pub use rpki::{RpkiCacheRef, RpkiServer};
pub use vpn::{Vpn, VpnCustomer};

#[cfg(test)]
mod test {
    use topomate_types::{Asn, InterfaceId, LinkId, RouterId};

    use super::*;
    use crate::link::{Link, LinkItem};
    use crate::router::NetInterface;

    fn iface(id: u32, ip: &str) -> NetInterface {
        let mut i = NetInterface::bare(1000);
        i.id = InterfaceId(id);
        i.ip = Some(ip.parse().unwrap());
        i
    }

    #[test]
    fn ring_of_three_passes_validation() {
        let mut as_ = AutonomousSystem::new(Asn(65000), "10.0.0.0/24".parse().unwrap(), 3);

        let subnets = [
            ("10.0.0.1/30", "10.0.0.2/30"),
            ("10.0.0.5/30", "10.0.0.6/30"),
            ("10.0.0.9/30", "10.0.0.10/30"),
        ];
        let pairs = [(1u32, 2u32), (2, 3), (3, 1)];

        for (i, ((a_ip, b_ip), (a, b))) in subnets.iter().zip(pairs.iter()).enumerate() {
            let a_if = as_
                .router_mut(RouterId::from_one_based(*a))
                .unwrap()
                .attach_interface(iface(0, a_ip));
            let b_if = as_
                .router_mut(RouterId::from_one_based(*b))
                .unwrap()
                .attach_interface(iface(0, b_ip));
            as_.links.push(Link {
                id: LinkId(i as u32),
                a: LinkItem {
                    router: RouterId::from_one_based(*a),
                    interface: a_if,
                },
                b: LinkItem {
                    router: RouterId::from_one_based(*b),
                    interface: b_if,
                },
                subnet: Some(format!("10.0.0.{}/30", i * 4).parse().unwrap()),
            });
        }

        as_.validate().unwrap();
        assert_eq!(as_.routers.len(), 3);
        assert_eq!(as_.links.len(), 3);
    }

    #[test]
    fn duplicate_asn_is_rejected() {
        let mut p = Project::new("dup");
        p.autonomous_systems
            .push(AutonomousSystem::new(Asn(1), "10.0.0.0/24".parse().unwrap(), 1));
        p.autonomous_systems
            .push(AutonomousSystem::new(Asn(1), "10.0.1.0/24".parse().unwrap(), 1));
        assert!(matches!(p.validate(), Err(ModelError::DuplicateAsn(1))));
    }

    #[test]
    fn external_link_to_unknown_as_is_rejected() {
        let mut p = Project::new("x");
        p.autonomous_systems
            .push(AutonomousSystem::new(Asn(1), "10.0.0.0/24".parse().unwrap(), 1));
        p.external_links.push(ExternalLink {
            from: ExtLinkItem {
                asn: Asn(1),
                router: RouterId::from_one_based(1),
                interface: InterfaceId(0),
                relation: topomate_types::Relation::Customer,
            },
            to: ExtLinkItem {
                asn: Asn(2),
                router: RouterId::from_one_based(1),
                interface: InterfaceId(0),
                relation: topomate_types::Relation::Provider,
            },
        });
        assert!(matches!(p.validate(), Err(ModelError::UnknownAsn(2))));
    }

    #[test]
    fn vpn_hub_and_spoke_flag_matches_declared_subnets() {
        use crate::router::Router;
        use crate::vpn::{Vpn, VpnCustomer};

        let flat = Vpn {
            vrf: "A".into(),
            customers: Vec::new(),
            neighbors: Default::default(),
            spoke_subnets: None,
        };
        assert!(!flat.is_hub_and_spoke());

        let hub_and_spoke = Vpn {
            vrf: "A".into(),
            customers: vec![VpnCustomer {
                ce: Router::new(RouterId::from_one_based(1), "ce1"),
                parent: RouterId::from_one_based(1),
                subnet: None,
                remote_subnet: None,
                downstream_subnet: None,
                hub: true,
            }],
            neighbors: Default::default(),
            spoke_subnets: Some(Vec::new()),
        };
        assert!(hub_and_spoke.is_hub_and_spoke());
    }
}
