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

//! The persisted record of every veth port the fabric has ever attached,
//! keyed by owning container name -- spec.md §6's `links.json`. `pause`,
//! `resume` and `restart` all read this file back instead of re-deriving
//! topology from the project file, so a fabric operation they perform
//! matches exactly what was actually wired, not what the topology says
//! should have been.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use topomate_fabric::HostIface;

use crate::error::OrchestratorError;

/// `containerName -> [HostIface]`, serialized as-is to `links.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkInventory(pub BTreeMap<String, Vec<HostIface>>);

impl LinkInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `links.json` from `path`. An absent file is treated as an
    /// empty inventory (first `start` of a project has nothing to load).
    pub fn load(path: &Path) -> Result<Self, OrchestratorError> {
        match std::fs::read_to_string(path) {
            Ok(data) => {
                serde_json::from_str(&data).map_err(|source| OrchestratorError::InventoryFormat {
                    path: path.to_path_buf(),
                    source,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(source) => Err(OrchestratorError::Inventory {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Persist this inventory to `path`, pretty-printed for readability
    /// (matches the source material, which hand-marshals JSON the
    /// operator is expected to be able to read directly).
    pub fn save(&self, path: &Path) -> Result<(), OrchestratorError> {
        let data = serde_json::to_string_pretty(&self.0).expect("LinkInventory serialization is infallible");
        std::fs::write(path, data).map_err(|source| OrchestratorError::Inventory {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Record one more port under `container`.
    pub fn push(&mut self, container: impl Into<String>, iface: HostIface) {
        self.0.entry(container.into()).or_default().push(iface);
    }

    /// Every port recorded for `container`, in attach order.
    pub fn ports_for(&self, container: &str) -> &[HostIface] {
        self.0.get(container).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use topomate_fabric::PortSettings;

    use super::*;

    #[test]
    fn round_trips_through_json() {
        let mut inv = LinkInventory::new();
        inv.push(
            "AS1-R1",
            HostIface {
                host_if: "abc123_l".to_string(),
                bridge: "as1-br-1-2".to_string(),
                container_if: "eth0".to_string(),
                settings: PortSettings::default_params(),
            },
        );

        let dir = tempdir();
        let path = dir.join("links.json");
        inv.save(&path).unwrap();
        let loaded = LinkInventory::load(&path).unwrap();
        assert_eq!(loaded.ports_for("AS1-R1").len(), 1);
        assert_eq!(loaded.ports_for("AS1-R1")[0].host_if, "abc123_l");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let loaded = LinkInventory::load(Path::new("/nonexistent/links.json")).unwrap();
        assert!(loaded.0.is_empty());
    }

    fn tempdir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("topomate-inventory-test-{:?}", std::thread::current().id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
