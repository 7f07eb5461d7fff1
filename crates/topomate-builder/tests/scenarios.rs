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

//! End-to-end elaboration scenarios, one per concrete example in the
//! testable-properties list: a ring of three routers, a provider/customer
//! external link, IS-IS level inference across areas, a hub-and-spoke VPN,
//! and an IXP route-server fabric.

use std::path::Path;

use pretty_assertions::assert_eq;
use topomate_model::bgp::UpdateSource;
use topomate_model::InterfaceIgp;
use topomate_spec::{FsSpecLoader, TopologySpec};
use topomate_types::{Asn, IsisLevel, RouterId};

fn build(yaml: &str) -> topomate_model::Project {
    let spec: TopologySpec = serde_yaml_ng::from_str(yaml).expect("valid yaml");
    topomate_builder::build_project(&spec, &FsSpecLoader, Path::new("/dev/null"))
        .expect("elaboration succeeds")
}

#[test]
fn ring_of_three_addresses_and_ibgp_full_mesh() {
    let project = build(
        r#"
name: ring-of-three
autonomous_systems:
  - asn: 65000
    routers: 3
    igp: "ospf"
    prefix: "10.0.0.0/24"
    loopback_start: "10.255.0.1/32"
    links:
      kind: "ring"
      subnet_length: 30
"#,
    );

    let as_ = project.as_by_asn(Asn(65000)).unwrap();
    assert_eq!(as_.links.len(), 3);

    let r1 = as_.router(RouterId::from_one_based(1)).unwrap();
    let r2 = as_.router(RouterId::from_one_based(2)).unwrap();
    let r3 = as_.router(RouterId::from_one_based(3)).unwrap();

    assert_eq!(r1.loopbacks[0].addr().to_string(), "10.255.0.1");
    assert_eq!(r2.loopbacks[0].addr().to_string(), "10.255.0.2");
    assert_eq!(r3.loopbacks[0].addr().to_string(), "10.255.0.3");

    // R1-R2 draws the first /30 (10.0.0.0/30): R1=.1, R2=.2.
    let r1_to_r2 = r1.interfaces.iter().find(|i| i.ip.unwrap().addr().to_string() == "10.0.0.1").unwrap();
    assert_eq!(r1_to_r2.ip.unwrap().prefix_len(), 30);
    let r2_from_r1 = r2.interfaces.iter().find(|i| i.ip.unwrap().addr().to_string() == "10.0.0.2").unwrap();
    assert_eq!(r2_from_r1.ip.unwrap().prefix_len(), 30);

    // R2-R3 draws the second /30 (10.0.0.4/30): R2=.5, R3=.6.
    assert!(r2.interfaces.iter().any(|i| i.ip.unwrap().addr().to_string() == "10.0.0.5"));
    assert!(r3.interfaces.iter().any(|i| i.ip.unwrap().addr().to_string() == "10.0.0.6"));

    // R3-R1 draws the third /30 (10.0.0.8/30): R3=.9, R1=.10.
    assert!(r3.interfaces.iter().any(|i| i.ip.unwrap().addr().to_string() == "10.0.0.9"));
    assert!(r1.interfaces.iter().any(|i| i.ip.unwrap().addr().to_string() == "10.0.0.10"));

    // Default iBGP: every pair of the three routers peers over loopbacks.
    for r in [r1, r2, r3] {
        assert_eq!(r.neighbors.len(), 2, "{} should have 2 iBGP neighbors", r.hostname);
        for nbr in r.neighbors.values() {
            assert_eq!(nbr.update_source, UpdateSource::Loopback);
            assert_eq!(nbr.remote_asn, Asn(65000));
        }
    }
    assert!(r1.neighbors.contains_key("10.255.0.2"));
    assert!(r1.neighbors.contains_key("10.255.0.3"));

    // OSPF areas default to 0 on every ring interface.
    for r in [r1, r2, r3] {
        for iface in &r.interfaces {
            assert!(matches!(iface.igp, InterfaceIgp::Ospf { area: 0 }));
        }
    }
}

#[test]
fn p2c_external_link_maps_relation_route_maps_and_communities() {
    let project = build(
        r#"
name: p2c
autonomous_systems:
  - asn: 65001
    routers: 1
    prefix: "10.1.0.0/24"
  - asn: 65002
    routers: 1
    prefix: "10.2.0.0/24"
external_links:
  - from: { asn: 65001, router_id: 1 }
    to: { asn: 65002, router_id: 1 }
    rel: "p2c"
"#,
    );

    let provider = project.as_by_asn(Asn(65001)).unwrap();
    let provider_r1 = provider.router(RouterId::from_one_based(1)).unwrap();
    let (_, nbr) = provider_r1.neighbors.iter().next().unwrap();
    assert_eq!(nbr.route_map_in.as_deref(), Some("CUSTOMER_IN"));
    assert_eq!(nbr.route_map_out.as_deref(), Some("CUSTOMER_OUT"));

    let customer = project.as_by_asn(Asn(65002)).unwrap();
    let customer_r1 = customer.router(RouterId::from_one_based(1)).unwrap();
    let (_, nbr) = customer_r1.neighbors.iter().next().unwrap();
    assert_eq!(nbr.route_map_in.as_deref(), Some("PROVIDER_IN"));
    assert_eq!(nbr.route_map_out.as_deref(), Some("PROVIDER_OUT"));

    // Defaults: 65001:10/20/30 communities, 300/100/200 local-prefs.
    assert_eq!(project.global_bgp.customer.community, 10);
    assert_eq!(project.global_bgp.customer.local_pref, 300);
    assert_eq!(project.global_bgp.provider.community, 20);
    assert_eq!(project.global_bgp.provider.local_pref, 100);
    assert_eq!(project.global_bgp.peer.community, 30);
    assert_eq!(project.global_bgp.peer.local_pref, 200);
}

#[test]
fn isis_levels_infer_circuit_type_across_and_within_areas() {
    let project = build(
        r#"
name: isis
autonomous_systems:
  - asn: 65000
    routers: 4
    igp: "isis"
    prefix: "10.0.0.0/16"
    links:
      kind: "manual"
      subnet_length: 30
      specs:
        - { first: 2, second: 3 }
        - { first: 1, second: 2 }
        - { first: 3, second: 4 }
    isis:
      level-1: [1]
      level-2: [4]
      level-1-2: [2, 3]
      areas:
        1: [1, 2]
        2: [3, 4]
"#,
    );

    let as_ = project.as_by_asn(Asn(65000)).unwrap();
    let r1 = as_.router(RouterId::from_one_based(1)).unwrap();
    assert_eq!(r1.isis.unwrap().level, IsisLevel::L1);
    let r2 = as_.router(RouterId::from_one_based(2)).unwrap();
    assert_eq!(r2.isis.unwrap().level, IsisLevel::L1L2);
    let r3 = as_.router(RouterId::from_one_based(3)).unwrap();
    assert_eq!(r3.isis.unwrap().level, IsisLevel::L1L2);
    let r4 = as_.router(RouterId::from_one_based(4)).unwrap();
    assert_eq!(r4.isis.unwrap().level, IsisLevel::L2);

    let circuit_of = |router: &topomate_model::Router| {
        router
            .interfaces
            .iter()
            .map(|i| match i.igp {
                InterfaceIgp::Isis { circuit, .. } => circuit,
                _ => panic!("expected an isis interface"),
            })
            .collect::<Vec<_>>()
    };

    // 2-3 crosses areas: L2 on both ends.
    assert!(circuit_of(r2).contains(&IsisLevel::L2));
    assert!(circuit_of(r3).contains(&IsisLevel::L2));
    // 1-2 shares area 1; R1 is L1, so the circuit follows R1's level.
    assert!(circuit_of(r1).contains(&IsisLevel::L1));
    // 3-4 crosses areas: L2 on both ends.
    assert!(circuit_of(r4).contains(&IsisLevel::L2));
}

#[test]
fn vpn_hub_and_spoke_mirrors_route_targets() {
    let project = build(
        r#"
name: vpn-hub-spoke
autonomous_systems:
  - asn: 65000
    routers: 3
    prefix: "10.0.0.0/16"
    links:
      kind: "full-mesh"
      subnet_length: 30
    vpn:
      - vrf: "A"
        hub_and_spoke: true
        customers:
          - { hostname: "hub-ce", parent: 1, hub: true, subnet: "192.168.1.0/24" }
          - { hostname: "spoke2-ce", parent: 2, subnet: "192.168.2.0/24" }
          - { hostname: "spoke3-ce", parent: 3, subnet: "192.168.3.0/24" }
"#,
    );

    let as_ = project.as_by_asn(Asn(65000)).unwrap();
    let vpn = as_.vpns.iter().find(|v| v.vrf == "A").unwrap();
    assert!(vpn.is_hub_and_spoke());
    assert_eq!(vpn.spoke_subnets.as_ref().unwrap().len(), 2);

    let hub_pe = as_.router(RouterId::from_one_based(1)).unwrap();
    let vrf_a = &hub_pe.vrfs["A"];
    let vrf_a_down = &hub_pe.vrfs["A_down"];

    // The hub's primary VRF exports the "up" RT that spokes import, and its
    // mirror VRF inverts the direction: import "up", export a fresh "down".
    assert_eq!(vrf_a.export_rt, vrf_a_down.import_rt);
    assert_ne!(vrf_a_down.export_rt, vrf_a.export_rt);
    assert_eq!(vrf_a.rd, vrf_a_down.rd);

    let spoke2_pe = as_.router(RouterId::from_one_based(2)).unwrap();
    let spoke_vrf = &spoke2_pe.vrfs["A"];
    assert_eq!(spoke_vrf.import_rt, spoke_vrf.export_rt);
    assert_eq!(spoke_vrf.import_rt, vrf_a.export_rt);

    // All three PEs must exchange VPNv4 with each other.
    assert_eq!(vpn.neighbors.len(), 3);
}

#[test]
fn ixp_route_server_peers_only_with_each_attached_router() {
    let project = build(
        r#"
name: ixp
autonomous_systems:
  - asn: 65001
    routers: 1
    prefix: "10.1.0.0/24"
  - asn: 65002
    routers: 1
    prefix: "10.2.0.0/24"
ixps:
  - asn: 100
    prefix: "192.0.2.0/24"
    peers:
      - "65001.1 1000"
      - "65002.1"
"#,
    );

    let rs_as = project.as_by_asn(Asn(100)).unwrap();
    assert_eq!(rs_as.routers.len(), 1);
    let rs = &rs_as.routers[0];
    assert_eq!(rs.neighbors.len(), 2, "route server should have one session per peer");
    for nbr in rs.neighbors.values() {
        assert!(nbr.rs_client);
    }

    let peer1 = project.as_by_asn(Asn(65001)).unwrap().router(RouterId::from_one_based(1)).unwrap();
    assert_eq!(peer1.neighbors.len(), 1, "peer should only see the route server");
    let (_, nbr) = peer1.neighbors.iter().next().unwrap();
    assert_eq!(nbr.remote_asn, Asn(100));
    assert!(!nbr.rs_client);

    let peer2 = project.as_by_asn(Asn(65002)).unwrap().router(RouterId::from_one_based(1)).unwrap();
    assert_eq!(peer2.neighbors.len(), 1);

    let ixp = &project.ixps[0];
    assert_eq!(ixp.bridge_name(), "ixp-100");
    assert_eq!(ixp.peers.len(), 2);
}

#[test]
fn elaboration_is_deterministic_across_repeated_runs() {
    let yaml = r#"
name: repeatable
autonomous_systems:
  - asn: 65000
    routers: 3
    igp: "ospf"
    prefix: "10.0.0.0/24"
    loopback_start: "10.255.0.1/32"
    links:
      kind: "ring"
      subnet_length: 30
"#;
    let a = build(yaml);
    let b = build(yaml);
    let a_json = serde_json::to_string(&a).unwrap();
    let b_json = serde_json::to_string(&b).unwrap();
    assert_eq!(a_json, b_json);
}
