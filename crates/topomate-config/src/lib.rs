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

//! Deterministic FRR-style configuration text, one artifact per router.
//!
//! [`emit_project`] walks an elaborated [`topomate_model::Project`] and
//! returns a map from the filename spec.md §6 names
//! (`conf_<ASN>_<hostname>`, or `conf_cust_<hostname>` for VPN customer
//! routers) to the config text. Emission never fails on a missing field --
//! an absent value simply yields an empty section -- so the only error
//! this crate raises is a reference the builder should have guaranteed but
//! didn't (see [`error::ConfigError`]).

mod bgp;
mod ce;
pub mod context;
pub mod error;
mod header;
mod igp;
mod interfaces;
pub mod net;
mod mpls;
mod rpki;
mod static_routes;
mod utilities;

use std::collections::BTreeMap;
use std::fmt::Write as _;

pub use context::EmitContext;
pub use error::ConfigError;

use topomate_model::{AutonomousSystem, Project, Router};

/// Emit every router's (and every VPN customer's) configuration text for
/// `project`, keyed by the filename it should be written under.
pub fn emit_project(project: &Project) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut files = BTreeMap::new();

    for as_ in &project.autonomous_systems {
        let mut ctx = EmitContext::new();
        for router in &as_.routers {
            let text = emit_router(as_, router, &project.global_bgp, &mut ctx)?;
            files.insert(router_config_filename(as_.asn.0, &router.hostname), text);
        }
        for vpn in &as_.vpns {
            for customer in &vpn.customers {
                let text = ce::emit_ce_router(as_, vpn, customer)?;
                files.insert(ce_config_filename(&customer.ce.hostname), text);
            }
        }
    }

    Ok(files)
}

/// Emit one router's full configuration text: spec.md §4.3's eight-item
/// structure, `!`-separated between blocks.
pub fn emit_router(
    as_: &AutonomousSystem,
    router: &Router,
    global_bgp: &topomate_model::GlobalBgpDefaults,
    ctx: &mut EmitContext,
) -> Result<String, ConfigError> {
    let mut out = String::new();

    header::write_header(&mut out, &router.hostname);
    interfaces::write_interfaces(&mut out, router);
    static_routes::write_external_statics(&mut out, as_.asn, router);
    static_routes::write_hub_spoke_statics(&mut out, as_, router);
    rpki::write_rpki(&mut out, router);
    bgp::write_bgp(&mut out, as_, router, ctx);

    let redist = igp::RouteRedistribution::default_for_as();
    igp::write_ospfv2(&mut out, router, redist);
    igp::write_ospfv3(&mut out, router, redist);
    igp::write_isis(&mut out, router, redist);

    mpls::write_mpls(&mut out, as_, router);
    utilities::write_utilities(&mut out, as_, router, global_bgp);

    let _ = writeln!(out, "end");
    Ok(out)
}

/// `conf_<ASN>_<hostname>`, per spec.md §6.
pub fn router_config_filename(asn: u32, hostname: &str) -> String {
    format!("conf_{asn}_{hostname}")
}

/// `conf_cust_<hostname>`, per spec.md §6.
pub fn ce_config_filename(hostname: &str) -> String {
    format!("conf_cust_{hostname}")
}

#[cfg(test)]
mod test {
    use ipnet::IpNet;
    use topomate_model::{AutonomousSystem, BgpNeighbor, NetInterface, Project};
    use topomate_types::{AddressFamily, Asn, RouterId};

    use super::*;

    #[test]
    fn ring_of_three_emits_ospf_network_lines() {
        let mut as_ = AutonomousSystem::new(Asn(65000), "10.0.0.0/24".parse().unwrap(), 3);
        as_.igp = topomate_types::IgpKind::Ospf;

        let mut iface = NetInterface::bare(1000);
        iface.ip = Some("10.0.0.1/30".parse::<IpNet>().unwrap());
        iface.igp = topomate_model::InterfaceIgp::Ospf { area: 0 };
        as_.router_mut(RouterId::from_one_based(1))
            .unwrap()
            .attach_interface(iface);
        as_.router_mut(RouterId::from_one_based(1))
            .unwrap()
            .loopbacks
            .push("10.255.0.1/32".parse().unwrap());

        let mut ctx = EmitContext::new();
        let router = as_.router(RouterId::from_one_based(1)).unwrap();
        let text = emit_router(&as_, router, &Default::default(), &mut ctx).unwrap();

        assert!(text.contains("network 10.0.0.1/30 area 0"));
        assert!(text.contains("bgp router-id 10.255.0.1"));
    }

    #[test]
    fn p2c_neighbor_gets_customer_route_maps() {
        let mut as_ = AutonomousSystem::new(Asn(65001), "10.0.0.0/24".parse().unwrap(), 1);
        let router = as_.router_mut(RouterId::from_one_based(1)).unwrap();
        router.loopbacks.push("10.255.0.1/32".parse().unwrap());
        let mut iface = NetInterface::bare(1000);
        iface.ip = Some("192.0.2.1/30".parse().unwrap());
        iface.external = true;
        let iface_id = router.attach_interface(iface);

        let mut nbr = BgpNeighbor::ibgp_default(Asn(65002), AddressFamily::IPV4, 30);
        nbr.update_source = topomate_model::UpdateSource::Interface(iface_id);
        nbr.peer_interface = Some(iface_id);
        nbr.route_map_in = Some("CUSTOMER_IN".to_string());
        nbr.route_map_out = Some("CUSTOMER_OUT".to_string());
        router.neighbors.insert("192.0.2.2".to_string(), nbr);

        let mut ctx = EmitContext::new();
        let router = as_.router(RouterId::from_one_based(1)).unwrap();
        let text = emit_router(&as_, router, &Default::default(), &mut ctx).unwrap();

        assert!(text.contains("route-map CUSTOMER_IN in"));
        assert!(text.contains("route-map CUSTOMER_OUT out"));
        assert!(text.contains("ip route 192.0.2.2/30 eth0"));
    }

    #[test]
    fn project_emission_is_deterministic() {
        let project = Project::new("p");
        let a = emit_project(&project).unwrap();
        let b = emit_project(&project).unwrap();
        assert_eq!(a, b);
    }
}
