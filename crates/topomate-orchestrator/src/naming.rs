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

//! Bridge and container names, derived the same way the configuration
//! emitter derives filenames: deterministically from the elaborated
//! model, with no state of their own.

use topomate_types::{Asn, RouterId};

/// One bridge per AS, carrying every internal link of that AS
/// (`int-<ASN>`, spec.md §4.5): each link is isolated from the others
/// sharing the bridge by a point-to-point flow rule
/// ([`topomate_fabric::FabricDriver::add_flow`]), not by one bridge per
/// link.
pub fn internal_bridge(asn: Asn) -> String {
    format!("int-{}", asn.0)
}

/// One bridge per cross-AS link (`ext-<ASN1><R1>-<ASN2><R2>`, spec.md
/// §4.5).
pub fn external_bridge(from_asn: Asn, from_router: RouterId, to_asn: Asn, to_router: RouterId) -> String {
    format!("ext-{}{}-{}{}", from_asn.0, from_router.0, to_asn.0, to_router.0)
}

/// One bridge per RPKI host's dedicated internal link (`rpki-<ASN>-<hostname>`,
/// spec.md §4.5's "one bridge per host link").
pub fn rpki_bridge(asn: Asn, hostname: &str) -> String {
    format!("rpki-{}-{hostname}", asn.0)
}

/// One bridge per VPN customer's PE-CE attachment. Not one of spec.md
/// §4.5's four named categories (that section only discusses provider
/// internal/external/IXP/RPKI links), but every PE-CE link still needs
/// somewhere to attach its two ports.
pub fn vpn_bridge(vrf: &str, ce_hostname: &str) -> String {
    format!("vpn-{vrf}-{ce_hostname}")
}

/// The container name a VPN customer's CE router runs under. CE routers
/// are not members of any AS's router list (their `RouterId` is only
/// unique within their own VPN), so unlike
/// [`topomate_model::Router::container_name`] they're named off their
/// hostname, which is unique project-wide by construction (the
/// declarative spec gives every customer its own).
pub fn ce_container_name(ce_hostname: &str) -> String {
    format!("cust-{ce_hostname}")
}
