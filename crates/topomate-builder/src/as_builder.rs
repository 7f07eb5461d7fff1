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

//! Per-AS elaboration: spec.md §4.2 step 1. Instantiates routers, assigns
//! loopbacks, expands the internal-link preset and allocates its
//! addresses, infers IS-IS circuit types and OSPF areas, installs the
//! default or manual iBGP structure, attaches VPN customers, and attaches
//! any RPKI validators linked to one of this AS's routers.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;

use ipnet::IpNet;
use topomate_addr::LinkAddressCursor;
use topomate_model::bgp::ManualIbgp;
use topomate_model::{
    AsBgpConfig, AutonomousSystem, BgpNeighbor, IbgpStructure, InterfaceIgp, NetInterface, Router,
    RouterIsisConfig, RpkiCacheRef, RpkiServer,
};
use topomate_spec::schema::{AsSpec, OspfSpec, RpkiHostSpec};
use topomate_spec::SpecLoader;
use topomate_types::{AddressFamily, Asn, IgpKind, IsisLevel, RouterId};

use crate::context::ElaborationContext;
use crate::error::BuilderError;
use crate::links::{self, PendingLink};
use crate::vpn;

/// Everything `build_as` hands back to the caller: the elaborated AS, the
/// link-address cursor it was using (so external-link resolution can keep
/// drawing from the same pool, per spec.md §4.2 step 2's "addresses are
/// drawn from the From-AS's address pool"), and any RPKI validators it
/// attached (bubbled up to [`topomate_model::Project::rpki_servers`]).
pub struct AsBuildResult {
    pub autonomous_system: AutonomousSystem,
    pub link_cursor: LinkAddressCursor,
    pub rpki_servers: Vec<RpkiServer>,
}

/// Elaborate one `autonomous_systems[]` entry.
pub fn build_as(
    as_spec: &AsSpec,
    spec_path: &Path,
    loader: &dyn SpecLoader,
    rpki_defs: &BTreeMap<String, RpkiHostSpec>,
) -> Result<AsBuildResult, BuilderError> {
    let asn = Asn(as_spec.asn);
    let network = parse_cidr(asn.0, "prefix", &as_spec.prefix)?;
    let mut as_ = AutonomousSystem::new(asn, network, as_spec.routers);

    if let Some(lb) = &as_spec.loopback_start {
        let start = parse_cidr(asn.0, "loopback_start", lb)?;
        let mut cursor = topomate_addr::LoopbackCursor::new(start);
        for r in as_.routers.iter_mut() {
            r.loopbacks.push(cursor.next_loopback());
        }
    }

    as_.igp = match as_spec.igp.as_deref() {
        Some("ospf") => IgpKind::Ospf,
        Some("isis") => IgpKind::Isis,
        _ => IgpKind::None,
    };
    as_.mpls = as_spec.mpls.unwrap_or(false);

    if let Some(bgp) = &as_spec.bgp {
        as_.bgp = AsBgpConfig {
            disabled: bgp.disabled.unwrap_or(false),
            redistribute_igp: bgp.redistribute_igp.unwrap_or(false),
            ibgp: match &bgp.ibgp {
                Some(ibgp) if ibgp.manual.unwrap_or(false) => {
                    IbgpStructure::Manual(ManualIbgp {
                        route_reflectors: ibgp
                            .route_reflectors
                            .iter()
                            .flatten()
                            .map(|rr| topomate_model::project::RouteReflector {
                                router: RouterId::from_one_based(rr.router),
                                clients: rr
                                    .clients
                                    .iter()
                                    .copied()
                                    .map(RouterId::from_one_based)
                                    .collect(),
                            })
                            .collect(),
                        cliques: ibgp
                            .cliques
                            .iter()
                            .flatten()
                            .map(|clique| {
                                clique.iter().copied().map(RouterId::from_one_based).collect()
                            })
                            .collect(),
                    })
                }
                _ => IbgpStructure::FullMesh,
            },
        };
    }

    if let Some(ospf) = &as_spec.ospf {
        as_.ospf_stub_areas = ospf.stubs.clone().unwrap_or_default();
    }

    let (level_of, area_of) = isis_assignments(as_spec);
    if as_.igp == IgpKind::Isis {
        for r in as_.routers.iter_mut() {
            let idx = r.id.0;
            r.isis = Some(RouterIsisConfig {
                area: area_of.get(&idx).copied().unwrap_or(0),
                level: level_of.get(&idx).copied().unwrap_or(IsisLevel::L2),
            });
        }
    }

    let pending = expand_link_preset(&as_, as_spec, spec_path, loader)?;
    let subnet_length = as_spec
        .links
        .as_ref()
        .and_then(|l| l.subnet_length)
        .unwrap_or(if topomate_addr::is4(network) { 30 } else { 127 });
    let mut cursor = LinkAddressCursor::new(network, subnet_length)?;

    for p in pending {
        materialize_link(&mut as_, &mut cursor, p, &level_of, &area_of, as_spec.ospf.as_ref())?;
    }

    install_ibgp(&mut as_);

    if let Some(vpns) = &as_spec.vpn {
        vpn::attach_vpns(&mut as_, &mut cursor, vpns, &mut ElaborationContext::new(asn))?;
    }

    let mut rpki_servers = Vec::new();
    for (hostname, def) in rpki_defs.iter().filter(|(_, d)| d.linked_to.asn == asn.0) {
        let (address, port) = parse_server_address(&def.server_address)?;
        let router = RouterId::from_one_based(def.linked_to.router_id);
        let mut iface = NetInterface::bare(1000);
        let (router_ip, _host_ip) = cursor.next_link_ips()?;
        iface.ip = Some(router_ip);
        iface.description = Some(format!("rpki:{hostname}"));
        let router_mut = as_.router_mut(router).ok_or(BuilderError::RouterOutOfRange {
            asn: asn.0,
            router: def.linked_to.router_id,
            max: as_spec.routers,
        })?;
        router_mut.attach_interface(iface);
        let link_id = as_.alloc_link_id();
        as_.hosts.push(topomate_model::Host {
            hostname: hostname.clone(),
            image: "rpki-validator".into(),
            linked_router: router,
            link: link_id,
        });
        rpki_servers.push(RpkiServer {
            hostname: hostname.clone(),
            address,
            port,
            preference: 1,
            roa_table: def.cache_file.clone(),
            asn,
            linked_router: router,
        });
    }

    if let Some(refs) = &as_spec.rpki {
        let mut caches = Vec::new();
        for name in &refs.servers {
            if let Some(def) = rpki_defs.get(name) {
                let (address, port) = parse_server_address(&def.server_address)?;
                caches.push(RpkiCacheRef { address, port });
            }
        }
        for r in as_.routers.iter_mut() {
            r.rpki_caches = caches.clone();
        }
    }

    Ok(AsBuildResult {
        autonomous_system: as_,
        link_cursor: cursor,
        rpki_servers,
    })
}

fn parse_cidr(asn: u32, field: &'static str, value: &str) -> Result<IpNet, BuilderError> {
    value.parse().map_err(|_| BuilderError::InvalidCidr {
        asn,
        field,
        value: value.to_string(),
    })
}

fn parse_server_address(s: &str) -> Result<(IpAddr, u16), BuilderError> {
    if let Ok(addr) = s.parse::<IpAddr>() {
        return Ok((addr, 323));
    }
    if let Some((host, port)) = s.rsplit_once(':') {
        if let (Ok(addr), Ok(port)) = (host.parse(), port.parse()) {
            return Ok((addr, port));
        }
    }
    Err(BuilderError::InvalidServerAddress(s.to_string()))
}

fn expand_link_preset(
    as_: &AutonomousSystem,
    as_spec: &AsSpec,
    spec_path: &Path,
    loader: &dyn SpecLoader,
) -> Result<Vec<PendingLink>, BuilderError> {
    let links_spec = as_spec.links.as_ref();
    let kind = links_spec
        .and_then(|l| l.kind.clone().or_else(|| l.preset.clone()))
        .unwrap_or_else(|| "manual".to_string());

    match kind.as_str() {
        "ring" => links::ring(as_.asn.0, as_spec.routers),
        "full-mesh" | "full_mesh" | "fullmesh" => Ok(links::full_mesh(as_spec.routers)),
        "manual" => {
            if let Some(specs) = links_spec.and_then(|l| l.specs.as_ref()) {
                Ok(links::manual(specs))
            } else if let Some(file) = links_spec.and_then(|l| l.file.as_ref()) {
                let path = topomate_spec::resolve_relative(spec_path, file);
                let entries = loader.load_link_file(&path)?;
                Ok(links::from_file(&entries))
            } else {
                Ok(Vec::new())
            }
        }
        other => Err(BuilderError::UnknownLinkPreset {
            asn: as_.asn.0,
            preset: other.to_string(),
        }),
    }
}

/// Collect each router's declared IS-IS level and area membership from the
/// `isis` block. Routers absent from both maps get the defaults noted in
/// spec.md §4.2 ("The default router level is 2").
fn isis_assignments(as_spec: &AsSpec) -> (BTreeMap<u32, IsisLevel>, BTreeMap<u32, u32>) {
    let mut level_of = BTreeMap::new();
    let mut area_of = BTreeMap::new();
    if let Some(isis) = &as_spec.isis {
        for &r in isis.level_1.iter().flatten() {
            level_of.insert(r, IsisLevel::L1);
        }
        for &r in isis.level_2.iter().flatten() {
            level_of.insert(r, IsisLevel::L2);
        }
        for &r in isis.level_1_2.iter().flatten() {
            level_of.insert(r, IsisLevel::L1L2);
        }
        if let Some(areas) = &isis.areas {
            for (&area, routers) in areas {
                for &r in routers {
                    area_of.insert(r, area);
                }
            }
        }
    }
    (level_of, area_of)
}

/// Circuit-type inference for one link from its two endpoints' configured
/// area/level, per spec.md §4.2: crossing areas forces L2; sharing an area
/// with at least one endpoint at L1-L2 takes the other endpoint's level;
/// otherwise the (necessarily equal) shared level applies.
fn circuit_type(area_a: u32, area_b: u32, level_a: IsisLevel, level_b: IsisLevel) -> IsisLevel {
    if area_a != area_b {
        return IsisLevel::L2;
    }
    match (level_a, level_b) {
        (IsisLevel::L1L2, other) | (other, IsisLevel::L1L2) if other != IsisLevel::L1L2 => other,
        (IsisLevel::L1L2, IsisLevel::L1L2) => IsisLevel::L2,
        (a, b) if a == b => a,
        _ => IsisLevel::L1,
    }
}

fn ospf_area_for(ospf: Option<&OspfSpec>, router_idx: u32, ip: IpNet) -> u32 {
    let Some(ospf) = ospf else { return 0 };
    let Some(networks) = &ospf.networks else { return 0 };
    networks
        .iter()
        .find(|n| {
            n.routers.contains(&router_idx)
                && n.prefix
                    .parse::<IpNet>()
                    .map(|net| net.contains(&ip.addr()))
                    .unwrap_or(false)
        })
        .map(|n| n.area)
        .unwrap_or(0)
}

#[allow(clippy::too_many_arguments)]
fn materialize_link(
    as_: &mut AutonomousSystem,
    cursor: &mut LinkAddressCursor,
    pending: PendingLink,
    level_of: &BTreeMap<u32, IsisLevel>,
    area_of: &BTreeMap<u32, u32>,
    ospf: Option<&OspfSpec>,
) -> Result<(), BuilderError> {
    let (ip_a, ip_b) = cursor.next_link_ips()?;
    let a_id = RouterId::from_one_based(pending.first);
    let b_id = RouterId::from_one_based(pending.second);
    let asn = as_.asn.0;
    let max = as_.routers.len() as u32;

    let mut a_iface = NetInterface::bare(pending.speed);
    a_iface.ip = Some(ip_a);
    a_iface.cost = pending.cost_a;
    let mut b_iface = NetInterface::bare(pending.speed);
    b_iface.ip = Some(ip_b);
    b_iface.cost = pending.cost_b;

    match as_.igp {
        IgpKind::Isis => {
            let area_a = area_of.get(&pending.first).copied().unwrap_or(0);
            let area_b = area_of.get(&pending.second).copied().unwrap_or(0);
            let level_a = level_of.get(&pending.first).copied().unwrap_or(IsisLevel::L2);
            let level_b = level_of.get(&pending.second).copied().unwrap_or(IsisLevel::L2);
            let circuit = circuit_type(area_a, area_b, level_a, level_b);
            a_iface.igp = InterfaceIgp::Isis {
                circuit,
                passive: false,
                metric: pending.cost_a.unwrap_or(10),
            };
            b_iface.igp = InterfaceIgp::Isis {
                circuit,
                passive: false,
                metric: pending.cost_b.unwrap_or(10),
            };
        }
        IgpKind::Ospf => {
            a_iface.igp = InterfaceIgp::Ospf {
                area: ospf_area_for(ospf, pending.first, ip_a),
            };
            b_iface.igp = InterfaceIgp::Ospf {
                area: ospf_area_for(ospf, pending.second, ip_b),
            };
        }
        IgpKind::None => {}
    }

    let a_if_id = as_
        .router_mut(a_id)
        .ok_or(BuilderError::RouterOutOfRange {
            asn,
            router: pending.first,
            max,
        })?
        .attach_interface(a_iface);
    let b_if_id = as_
        .router_mut(b_id)
        .ok_or(BuilderError::RouterOutOfRange {
            asn,
            router: pending.second,
            max,
        })?
        .attach_interface(b_iface);

    let link_id = as_.alloc_link_id();
    let subnet = IpNet::new(ip_a.network(), ip_a.prefix_len()).ok();
    as_.links.push(topomate_model::Link {
        id: link_id,
        a: topomate_model::LinkItem {
            router: a_id,
            interface: a_if_id,
        },
        b: topomate_model::LinkItem {
            router: b_id,
            interface: b_if_id,
        },
        subnet,
    });

    Ok(())
}

/// Install this AS's iBGP structure: the default all-pairs full-mesh, or a
/// declared route-reflector hierarchy plus any additional cliques.
fn install_ibgp(as_: &mut AutonomousSystem) {
    match as_.bgp.ibgp.clone() {
        IbgpStructure::FullMesh => {
            let ids: Vec<RouterId> = as_.routers.iter().map(|r| r.id).collect();
            for i in 0..ids.len() {
                for j in (i + 1)..ids.len() {
                    add_ibgp_pair(as_, ids[i], ids[j], false, false);
                }
            }
        }
        IbgpStructure::Manual(manual) => {
            for rr in &manual.route_reflectors {
                for &client in &rr.clients {
                    add_ibgp_pair(as_, rr.router, client, true, false);
                }
            }
            for clique in &manual.cliques {
                for i in 0..clique.len() {
                    for j in (i + 1)..clique.len() {
                        add_ibgp_pair(as_, clique[i], clique[j], false, false);
                    }
                }
            }
        }
    }
}

fn add_ibgp_pair(as_: &mut AutonomousSystem, a: RouterId, b: RouterId, a_rr_client: bool, b_rr_client: bool) {
    let asn = as_.asn;
    let is4 = topomate_addr::is4(as_.network);
    let families = AddressFamily::of_is4(is4);
    let prefix_len = if is4 { 32 } else { 128 };

    let a_key = as_.router(a).and_then(neighbor_key);
    let b_key = as_.router(b).and_then(neighbor_key);
    let (Some(a_key), Some(b_key)) = (a_key, b_key) else {
        return;
    };

    if let Some(r) = as_.router_mut(a) {
        let mut nbr = BgpNeighbor::ibgp_default(asn, families, prefix_len);
        nbr.rr_client = a_rr_client;
        r.neighbors.insert(b_key, nbr);
    }
    if let Some(r) = as_.router_mut(b) {
        let mut nbr = BgpNeighbor::ibgp_default(asn, families, prefix_len);
        nbr.rr_client = b_rr_client;
        r.neighbors.insert(a_key, nbr);
    }
}

/// The neighbor-map key for `router`: its first loopback, or (absent any
/// loopback) its first addressed interface, per spec.md §4.2's "All
/// neighbor-map keys are the other side's loopback address (or the
/// interface address if no loopback), in text form."
pub(crate) fn neighbor_key(router: &Router) -> Option<String> {
    if let Some(lb) = router.first_ipv4_loopback() {
        return Some(lb.addr().to_string());
    }
    if let Some(lb) = router.loopbacks.first() {
        return Some(lb.addr().to_string());
    }
    router.interfaces.iter().find_map(|i| i.ip.map(|ip| ip.addr().to_string()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn circuit_type_crossing_areas_is_l2() {
        assert_eq!(circuit_type(1, 2, IsisLevel::L1, IsisLevel::L1), IsisLevel::L2);
    }

    #[test]
    fn circuit_type_defers_to_non_flexible_side() {
        assert_eq!(circuit_type(1, 1, IsisLevel::L1, IsisLevel::L1L2), IsisLevel::L1);
        assert_eq!(circuit_type(2, 2, IsisLevel::L1L2, IsisLevel::L2), IsisLevel::L2);
    }

    #[test]
    fn circuit_type_same_area_same_level() {
        assert_eq!(circuit_type(1, 1, IsisLevel::L1, IsisLevel::L1), IsisLevel::L1);
    }
}
