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

//! Cross-AS link resolution: spec.md §4.2 step 2.
//!
//! Unlike internal links, an external link's two interfaces are addressed
//! from a single shared subnet drawn from the *from*-side AS's address
//! pool -- its cursor is the one already threaded through that AS's
//! internal-link and VPN/RPKI allocation, so external addressing never
//! collides with anything else drawn from the same prefix.
//!
//! eBGP neighbor sessions are keyed by the peer's direct interface address
//! rather than its loopback: these sessions are single-hop by construction
//! (the two routers share an `/30` or `/31`), so there's no multihop case
//! to support and no reason to prefer the loopback the way iBGP does.

use std::collections::BTreeMap;

use topomate_addr::LinkAddressCursor;
use topomate_model::{BgpNeighbor, ExtLinkItem, ExternalLink, NetInterface, Project};
use topomate_model::bgp::UpdateSource;
use topomate_spec::schema::ExternalLinkSpec;
use topomate_types::{AddressFamily, Asn, Relation, RouterId};

use crate::error::BuilderError;

/// Resolve every `external_links[]` entry (inline or file-sourced) against
/// the already-built project, consuming from each from-side AS's live
/// cursor.
pub fn resolve_external_links(
    project: &mut Project,
    specs: &[ExternalLinkSpec],
    as_cursors: &mut BTreeMap<Asn, LinkAddressCursor>,
) -> Result<Vec<ExternalLink>, BuilderError> {
    specs.iter().map(|spec| resolve_one(project, spec, as_cursors)).collect()
}

/// Conventional (from_role, to_role) pair for a relation mnemonic: what the
/// `from` side is, and what the `to` side is, in the commercial sense.
fn roles_for(rel: &str) -> Result<(Relation, Relation), BuilderError> {
    match rel {
        "p2c" => Ok((Relation::Provider, Relation::Customer)),
        "c2p" => Ok((Relation::Customer, Relation::Provider)),
        "p2p" => Ok((Relation::Peer, Relation::Peer)),
        other => Err(BuilderError::UnknownRelation(other.to_string())),
    }
}

fn resolve_one(
    project: &mut Project,
    spec: &ExternalLinkSpec,
    as_cursors: &mut BTreeMap<Asn, LinkAddressCursor>,
) -> Result<ExternalLink, BuilderError> {
    let from_asn = Asn(spec.from.asn);
    let to_asn = Asn(spec.to.asn);
    let (from_role, to_role) = roles_for(&spec.rel)?;
    // ExtLinkItem.relation records what the *other* side is, to this side.
    let from_relation = to_role;
    let to_relation = from_role;

    let cursor = as_cursors
        .get_mut(&from_asn)
        .ok_or(BuilderError::UnknownAsn(from_asn.0))?;
    let (from_ip, to_ip) = cursor.next_link_ips()?;
    let is4 = topomate_addr::is4(from_ip);
    let families = AddressFamily::of_is4(is4);
    let prefix_len = if is4 { 32 } else { 128 };

    let from_idx = project
        .autonomous_systems
        .iter()
        .position(|a| a.asn == from_asn)
        .ok_or(BuilderError::UnknownAsn(from_asn.0))?;
    let to_idx = project
        .autonomous_systems
        .iter()
        .position(|a| a.asn == to_asn)
        .ok_or(BuilderError::UnknownAsn(to_asn.0))?;

    let from_router = RouterId::from_one_based(spec.from.router_id);
    let to_router = RouterId::from_one_based(spec.to.router_id);

    let (from_if_id, to_if_id) = if from_idx == to_idx {
        let as_ = &mut project.autonomous_systems[from_idx];
        let max = as_.routers.len() as u32;
        let mut from_iface = NetInterface::bare(1000);
        from_iface.ip = Some(from_ip);
        from_iface.external = true;
        from_iface.description = Some(format!("ext:AS{}", to_asn.0));
        let from_if = as_
            .router_mut(from_router)
            .ok_or(BuilderError::RouterOutOfRange {
                asn: from_asn.0,
                router: spec.from.router_id,
                max,
            })?
            .attach_interface(from_iface);

        let mut to_iface = NetInterface::bare(1000);
        to_iface.ip = Some(to_ip);
        to_iface.external = true;
        to_iface.description = Some(format!("ext:AS{}", from_asn.0));
        let to_if = as_
            .router_mut(to_router)
            .ok_or(BuilderError::RouterOutOfRange {
                asn: to_asn.0,
                router: spec.to.router_id,
                max,
            })?
            .attach_interface(to_iface);

        (from_if, to_if)
    } else {
        let (as_from, as_to) = if from_idx < to_idx {
            let (left, right) = project.autonomous_systems.split_at_mut(to_idx);
            (&mut left[from_idx], &mut right[0])
        } else {
            let (left, right) = project.autonomous_systems.split_at_mut(from_idx);
            (&mut right[0], &mut left[to_idx])
        };

        let max_from = as_from.routers.len() as u32;
        let mut from_iface = NetInterface::bare(1000);
        from_iface.ip = Some(from_ip);
        from_iface.external = true;
        from_iface.description = Some(format!("ext:AS{}", to_asn.0));
        let from_if = as_from
            .router_mut(from_router)
            .ok_or(BuilderError::RouterOutOfRange {
                asn: from_asn.0,
                router: spec.from.router_id,
                max: max_from,
            })?
            .attach_interface(from_iface);

        let max_to = as_to.routers.len() as u32;
        let mut to_iface = NetInterface::bare(1000);
        to_iface.ip = Some(to_ip);
        to_iface.external = true;
        to_iface.description = Some(format!("ext:AS{}", from_asn.0));
        let to_if = as_to
            .router_mut(to_router)
            .ok_or(BuilderError::RouterOutOfRange {
                asn: to_asn.0,
                router: spec.to.router_id,
                max: max_to,
            })?
            .attach_interface(to_iface);

        (from_if, to_if)
    };

    let (route_map_in, route_map_out) = ExternalLink::route_maps_for(from_relation);
    if let Some(as_) = project.as_by_asn_mut(from_asn) {
        if let Some(r) = as_.router_mut(from_router) {
            r.neighbors.insert(
                to_ip.addr().to_string(),
                BgpNeighbor {
                    remote_asn: to_asn,
                    update_source: UpdateSource::Interface(from_if_id),
                    disable_connected_check: false,
                    next_hop_self: false,
                    route_map_in: Some(route_map_in.to_string()),
                    route_map_out: Some(route_map_out.to_string()),
                    families,
                    rr_client: false,
                    rs_client: false,
                    peer_interface: Some(from_if_id),
                    prefix_len,
                },
            );
        }
    }

    let (route_map_in, route_map_out) = ExternalLink::route_maps_for(to_relation);
    if let Some(as_) = project.as_by_asn_mut(to_asn) {
        if let Some(r) = as_.router_mut(to_router) {
            r.neighbors.insert(
                from_ip.addr().to_string(),
                BgpNeighbor {
                    remote_asn: from_asn,
                    update_source: UpdateSource::Interface(to_if_id),
                    disable_connected_check: false,
                    next_hop_self: false,
                    route_map_in: Some(route_map_in.to_string()),
                    route_map_out: Some(route_map_out.to_string()),
                    families,
                    rr_client: false,
                    rs_client: false,
                    peer_interface: Some(to_if_id),
                    prefix_len,
                },
            );
        }
    }

    Ok(ExternalLink {
        from: ExtLinkItem {
            asn: from_asn,
            router: from_router,
            interface: from_if_id,
            relation: from_relation,
        },
        to: ExtLinkItem {
            asn: to_asn,
            router: to_router,
            interface: to_if_id,
            relation: to_relation,
        },
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn p2c_swaps_roles_between_sides() {
        let (from_role, to_role) = roles_for("p2c").unwrap();
        assert_eq!(from_role, Relation::Provider);
        assert_eq!(to_role, Relation::Customer);
    }

    #[test]
    fn unknown_relation_is_rejected() {
        assert!(matches!(roles_for("x2x"), Err(BuilderError::UnknownRelation(_))));
    }
}
