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

use std::path::PathBuf;

use topomate_model::ModelError;

/// Everything that can go wrong while turning a declarative spec into an
/// elaborated [`topomate_model::Project`]. Every variant names the
/// offending entry, per spec.md §4.2's failure semantics ("any reference to
/// an unknown AS or out-of-range router index, or an invalid CIDR,
/// terminates elaboration with a diagnostic naming the offending entry").
#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    /// An external link, IXP peer, VPN customer parent, or route-reflector
    /// entry names an AS that isn't declared.
    #[error("reference to unknown AS{0}")]
    UnknownAsn(u32),

    /// A router index is out of `1..=routers` range for its AS.
    #[error("AS{asn} has no router {router} (has 1..={max})")]
    RouterOutOfRange { asn: u32, router: u32, max: u32 },

    /// A `links.kind`/`preset` value the builder doesn't recognize.
    #[error("AS{asn} has unknown link preset {preset:?}")]
    UnknownLinkPreset { asn: u32, preset: String },

    /// `ring` was requested with fewer than 3 routers.
    #[error("AS{asn} ring preset requires at least 3 routers, has {routers}")]
    RingTooSmall { asn: u32, routers: u32 },

    /// A `prefix`, `loopback_start`, or other CIDR field didn't parse.
    #[error("AS{asn} field {field} is not a valid CIDR: {value:?}")]
    InvalidCidr {
        asn: u32,
        field: &'static str,
        value: String,
    },

    /// A required field was absent (e.g. `links.file` missing when
    /// `kind: manual` and no inline `specs` were given).
    #[error("AS{asn} is missing required field {field}")]
    MissingField { asn: u32, field: &'static str },

    /// The elaborated model violated its own invariants (should only
    /// happen if the builder itself has a bug).
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Prefix arithmetic ran out of room (subnet or pool exhaustion).
    #[error(transparent)]
    Addr(#[from] topomate_addr::AddrError),

    /// A referenced manual-link file could not be located or parsed.
    #[error(transparent)]
    Spec(#[from] topomate_spec::SpecError),

    /// An `external_links_file` could not be read.
    #[error("cannot read {path}: {source}")]
    ExternalLinksFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An `external_links_file` did not parse as the expected YAML shape.
    #[error("malformed external links file {path}: {source}")]
    ExternalLinksFileParse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// An RPKI `server_address` was not a valid `ip` or `ip:port` string.
    #[error("invalid RPKI server_address {0:?}")]
    InvalidServerAddress(String),

    /// An `external_links[].rel` value wasn't one of `p2c`/`c2p`/`p2p`.
    #[error("unknown external link relation {0:?} (expected p2c, c2p, or p2p)")]
    UnknownRelation(String),
}
