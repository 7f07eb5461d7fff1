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

//! Internet Exchange Point construction: spec.md §4.2 step 4.
//!
//! An IXP is realized as a synthetic one-router `AutonomousSystem` (the
//! route server) plus a shared fabric subnet. The route server gets a
//! single interface onto that fabric; every peer gets one new interface of
//! its own, drawn from the same [`BroadcastCursor`] so every fabric member
//! shares one broadcast domain. The route server's side of each session is
//! `rs_client`; the peer's side carries the ordinary settlement-free-peer
//! route-maps, since an IXP route server is itself not a commercial party.

use topomate_addr::BroadcastCursor;
use topomate_model::bgp::UpdateSource;
use topomate_model::{BgpNeighbor, Ixp, IxpPeer, NetInterface, Project};
use topomate_spec::schema::IxpSpec;
use topomate_types::{AddressFamily, Asn, RouterId};

use crate::error::BuilderError;

/// Build one `ixps[]` entry: the route-server AS, the fabric, and every
/// peer attachment. Appends the synthetic AS to `project.autonomous_systems`
/// and the resulting [`Ixp`] to `project.ixps`.
pub fn build_ixp(project: &mut Project, spec: &IxpSpec) -> Result<(), BuilderError> {
    let ixp_asn = Asn(spec.asn);
    let prefix = spec.prefix.parse().map_err(|_| BuilderError::InvalidCidr {
        asn: spec.asn,
        field: "prefix",
        value: spec.prefix.clone(),
    })?;
    let loopback = spec
        .loopback
        .as_deref()
        .map(|lb| {
            lb.parse().map_err(|_| BuilderError::InvalidCidr {
                asn: spec.asn,
                field: "loopback",
                value: lb.to_string(),
            })
        })
        .transpose()?;

    let mut rs_as = topomate_model::AutonomousSystem::new(ixp_asn, prefix, 1);
    rs_as.routers[0].hostname = "rs".to_string();
    if let Some(lb) = loopback {
        rs_as.routers[0].loopbacks.push(lb);
    }

    let mut cursor = BroadcastCursor::new(prefix);
    let rs_ip = cursor.next_ip()?;
    let is4 = topomate_addr::is4(rs_ip);
    let families = AddressFamily::of_is4(is4);
    let prefix_len = if is4 { 32 } else { 128 };

    let mut rs_iface = NetInterface::bare(1000);
    rs_iface.ip = Some(rs_ip);
    rs_iface.external = true;
    rs_iface.description = Some("ixp fabric".to_string());
    let rs_router = RouterId::from_one_based(1);
    let rs_if_id = rs_as
        .router_mut(rs_router)
        .expect("just created with exactly one router")
        .attach_interface(rs_iface);

    let mut peers = Vec::new();

    for peer in &spec.peers {
        let (peer_asn, peer_router_idx, speed) = parse_peer(spec.asn, peer)?;
        let as_idx = project
            .autonomous_systems
            .iter()
            .position(|a| a.asn == peer_asn)
            .ok_or(BuilderError::UnknownAsn(peer_asn.0))?;
        let as_ = &mut project.autonomous_systems[as_idx];
        let max = as_.routers.len() as u32;
        let peer_router = RouterId::from_one_based(peer_router_idx);

        let peer_ip = cursor.next_ip()?;
        let mut peer_iface = NetInterface::bare(speed);
        peer_iface.ip = Some(peer_ip);
        peer_iface.external = true;
        peer_iface.description = Some(format!("ixp:AS{}", spec.asn));
        let peer_if_id = as_
            .router_mut(peer_router)
            .ok_or(BuilderError::RouterOutOfRange {
                asn: peer_asn.0,
                router: peer_router_idx,
                max,
            })?
            .attach_interface(peer_iface);

        if let Some(r) = as_.router_mut(peer_router) {
            r.neighbors.insert(
                rs_ip.addr().to_string(),
                BgpNeighbor {
                    remote_asn: ixp_asn,
                    update_source: UpdateSource::Interface(peer_if_id),
                    disable_connected_check: false,
                    next_hop_self: false,
                    route_map_in: Some("PEER_IN".to_string()),
                    route_map_out: Some("PEER_OUT".to_string()),
                    families,
                    rr_client: false,
                    rs_client: false,
                    peer_interface: Some(peer_if_id),
                    prefix_len,
                },
            );
        }

        if let Some(r) = rs_as.router_mut(rs_router) {
            r.neighbors.insert(
                peer_ip.addr().to_string(),
                BgpNeighbor {
                    remote_asn: peer_asn,
                    update_source: UpdateSource::Interface(rs_if_id),
                    disable_connected_check: false,
                    next_hop_self: false,
                    route_map_in: None,
                    route_map_out: None,
                    families,
                    rr_client: false,
                    rs_client: true,
                    peer_interface: Some(rs_if_id),
                    prefix_len,
                },
            );
        }

        peers.push(IxpPeer {
            asn: peer_asn,
            router: peer_router,
            speed,
        });
    }

    project.autonomous_systems.push(rs_as);
    project.ixps.push(Ixp {
        asn: ixp_asn,
        prefix,
        loopback,
        peers,
    });

    Ok(())
}

/// Parse one `peers[]` entry: `"<asn>.<router_id>[ speed]"`.
fn parse_peer(ixp_asn: u32, s: &str) -> Result<(Asn, u32, u32), BuilderError> {
    let mut parts = s.split_whitespace();
    let id = parts.next().ok_or_else(|| BuilderError::MissingField {
        asn: ixp_asn,
        field: "peers[]",
    })?;
    let speed = parts
        .next()
        .map(|s| s.parse())
        .transpose()
        .map_err(|_| BuilderError::InvalidCidr {
            asn: ixp_asn,
            field: "peers[].speed",
            value: s.to_string(),
        })?
        .unwrap_or(1000);

    let (asn_str, router_str) = id.split_once('.').ok_or_else(|| BuilderError::InvalidCidr {
        asn: ixp_asn,
        field: "peers[]",
        value: s.to_string(),
    })?;
    let asn: u32 = asn_str.parse().map_err(|_| BuilderError::InvalidCidr {
        asn: ixp_asn,
        field: "peers[].asn",
        value: s.to_string(),
    })?;
    let router: u32 = router_str.parse().map_err(|_| BuilderError::InvalidCidr {
        asn: ixp_asn,
        field: "peers[].router",
        value: s.to_string(),
    })?;

    Ok((Asn(asn), router, speed))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_peer_with_explicit_speed() {
        let (asn, router, speed) = parse_peer(65000, "65001.1 1000").unwrap();
        assert_eq!(asn, Asn(65001));
        assert_eq!(router, 1);
        assert_eq!(speed, 1000);
    }

    #[test]
    fn parses_peer_defaulting_speed() {
        let (asn, router, speed) = parse_peer(65000, "65002.3").unwrap();
        assert_eq!(asn, Asn(65002));
        assert_eq!(router, 3);
        assert_eq!(speed, 1000);
    }
}
