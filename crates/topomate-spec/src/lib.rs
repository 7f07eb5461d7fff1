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

//! The declarative YAML topology input, and the facility that locates and
//! loads it.
//!
//! Parsing itself is a thin `serde_yaml_ng` pass over [`schema`]'s types;
//! everything that turns those loosely-typed, mostly-optional fields into
//! the fully elaborated, invariant-checked model in `topomate_model`
//! belongs to the `topomate-builder` crate, not here.

pub mod dirs;
pub mod error;
pub mod loader;
pub mod schema;

pub use dirs::Directories;
pub use error::SpecError;
pub use loader::{resolve_relative, save_spec, FsSpecLoader, LinkFileEntry, SpecLoader};
pub use schema::TopologySpec;

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_ring_of_three() {
        let yaml = r#"
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
"#;
        let spec: TopologySpec = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(spec.name, "ring-of-three");
        assert_eq!(spec.autonomous_systems.len(), 1);
        let as0 = &spec.autonomous_systems[0];
        assert_eq!(as0.asn, 65000);
        assert_eq!(as0.routers, 3);
        assert_eq!(as0.igp.as_deref(), Some("ospf"));
        let links = as0.links.as_ref().unwrap();
        assert_eq!(links.kind.as_deref(), Some("ring"));
        assert_eq!(links.subnet_length, Some(30));
    }

    #[test]
    fn parses_p2c_external_link() {
        let yaml = r#"
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
"#;
        let spec: TopologySpec = serde_yaml_ng::from_str(yaml).unwrap();
        let links = spec.external_links.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].from.asn, 65001);
        assert_eq!(links[0].to.asn, 65002);
        assert_eq!(links[0].rel, "p2c");
    }

    #[test]
    fn parses_isis_levels_and_areas() {
        let yaml = r#"
name: isis
autonomous_systems:
  - asn: 65000
    routers: 4
    igp: "isis"
    prefix: "10.0.0.0/16"
    isis:
      level-1: [1]
      level-2: [4]
      level-1-2: [2, 3]
      areas:
        1: [1, 2]
        2: [3, 4]
"#;
        let spec: TopologySpec = serde_yaml_ng::from_str(yaml).unwrap();
        let isis = spec.autonomous_systems[0].isis.as_ref().unwrap();
        assert_eq!(isis.level_1, Some(vec![1]));
        assert_eq!(isis.level_2, Some(vec![4]));
        assert_eq!(isis.level_1_2, Some(vec![2, 3]));
        assert_eq!(isis.areas.as_ref().unwrap().get(&1), Some(&vec![1, 2]));
    }
}
