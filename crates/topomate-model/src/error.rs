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

use topomate_types::{InterfaceId, RouterId};

/// Violations of the model's own invariants, detected while assembling or
/// validating a [`crate::Project`]. These are distinct from the spec errors
/// raised by the builder crate while elaborating a declarative input: a
/// `ModelError` means the in-memory model itself is inconsistent, which
/// should only happen if a caller builds one by hand incorrectly.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Two autonomous systems in the same project were given the same ASN.
    #[error("duplicate AS{0} in project")]
    DuplicateAsn(u32),

    /// An AS declares zero routers, violating `NumRouters >= 1`.
    #[error("AS{0} has no routers")]
    EmptyAs(u32),

    /// A link references a router index that does not exist in its AS.
    #[error("AS{asn} link references unknown router {router}")]
    UnknownRouter { asn: u32, router: RouterId },

    /// A link references an interface index that does not exist on the
    /// named router.
    #[error("AS{asn} router {router} has no interface {interface}")]
    UnknownInterface {
        asn: u32,
        router: RouterId,
        interface: InterfaceId,
    },

    /// An external link or IXP peer references an AS that is not part of
    /// the project.
    #[error("reference to unknown AS{0}")]
    UnknownAsn(u32),

    /// Two internal links in the same AS were allocated overlapping
    /// subnets.
    #[error("AS{asn} link subnets overlap: {a} and {b}")]
    OverlappingSubnets { asn: u32, a: String, b: String },
}
