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

//! Elaborates a declarative [`topomate_spec::TopologySpec`] into a fully
//! built [`topomate_model::Project`].
//!
//! Elaboration runs in four stages, each building on the last:
//!
//! 1. Every `autonomous_systems[]` entry is built independently
//!    ([`as_builder::build_as`]): routers and loopbacks are instantiated,
//!    the internal-link preset is expanded and addressed, IS-IS/OSPF
//!    attributes are inferred, the AS's iBGP structure is installed, VPN
//!    customers are attached, and any RPKI validators linked to one of its
//!    routers are built.
//! 2. `external_links[]` (inline or file-sourced) are resolved against the
//!    now-complete set of ASes, drawing addresses from the *from*-side
//!    AS's still-live cursor.
//! 3. `ixps[]` are realized as synthetic route-server ASes attached to the
//!    same project.
//! 4. The whole [`topomate_model::Project`] is validated as a unit.

mod as_builder;
mod context;
pub mod error;
mod external;
mod ixp;
mod links;
mod vpn;

pub use as_builder::{build_as, AsBuildResult};
pub use context::ElaborationContext;
pub use error::BuilderError;
pub use external::resolve_external_links;
pub use ixp::build_ixp;

use std::collections::BTreeMap;
use std::path::Path;

use topomate_model::bgp::RelationDefault;
use topomate_model::Project;
use topomate_spec::schema::ExternalLinkSpec;
use topomate_spec::{SpecLoader, TopologySpec};
use topomate_types::Asn;

/// Elaborate `spec` (already parsed, e.g. via [`SpecLoader::load`]) into a
/// complete [`Project`]. `spec_path` is the path `spec` itself was read
/// from, needed to resolve any relative `links.file`/`external_links_file`
/// references against the spec's own directory.
pub fn build_project(
    spec: &TopologySpec,
    loader: &dyn SpecLoader,
    spec_path: &Path,
) -> Result<Project, BuilderError> {
    let mut project = Project::new(spec.name.clone());
    apply_global_bgp_settings(&mut project, spec);

    let empty_rpki = BTreeMap::new();
    let rpki_defs = spec.rpki.as_ref().unwrap_or(&empty_rpki);
    let mut as_cursors = BTreeMap::new();

    for as_spec in &spec.autonomous_systems {
        tracing::debug!(asn = as_spec.asn, "elaborating autonomous system");
        let built = as_builder::build_as(as_spec, spec_path, loader, rpki_defs)?;
        let asn: Asn = built.autonomous_system.asn;
        as_cursors.insert(asn, built.link_cursor);
        project.rpki_servers.extend(built.rpki_servers);
        project.autonomous_systems.push(built.autonomous_system);
    }

    let mut ext_specs: Vec<ExternalLinkSpec> = spec.external_links.clone().unwrap_or_default();
    if let Some(file) = &spec.external_links_file {
        let path = topomate_spec::resolve_relative(spec_path, file);
        ext_specs.extend(load_external_links_file(&path)?);
    }
    let resolved = external::resolve_external_links(&mut project, &ext_specs, &mut as_cursors)?;
    project.external_links.extend(resolved);

    for ixp_spec in spec.ixps.iter().flatten() {
        tracing::debug!(asn = ixp_spec.asn, "building IXP fabric");
        ixp::build_ixp(&mut project, ixp_spec)?;
    }

    project.validate()?;
    Ok(project)
}

fn apply_global_bgp_settings(project: &mut Project, spec: &TopologySpec) {
    let Some(bgp) = spec.global_settings.as_ref().and_then(|gs| gs.bgp.as_ref()) else {
        return;
    };
    if let Some(c) = &bgp.customer {
        project.global_bgp.customer = RelationDefault {
            community: c.community,
            local_pref: c.local_pref,
        };
    }
    if let Some(p) = &bgp.provider {
        project.global_bgp.provider = RelationDefault {
            community: p.community,
            local_pref: p.local_pref,
        };
    }
    if let Some(p) = &bgp.peer {
        project.global_bgp.peer = RelationDefault {
            community: p.community,
            local_pref: p.local_pref,
        };
    }
}

fn load_external_links_file(path: &Path) -> Result<Vec<ExternalLinkSpec>, BuilderError> {
    let data = std::fs::read_to_string(path).map_err(|source| BuilderError::ExternalLinksFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml_ng::from_str(&data).map_err(|source| BuilderError::ExternalLinksFileParse {
        path: path.to_path_buf(),
        source,
    })
}
