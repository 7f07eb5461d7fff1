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

use std::path::{Path, PathBuf};

use crate::error::SpecError;
use crate::schema::TopologySpec;

/// Abstracts reading a declarative topology spec off whatever backs it.
/// YAML parsing itself is pinned to `serde_yaml_ng` (the concrete format is
/// not an abstraction boundary the rest of the workspace needs), but the
/// source of bytes is: tests substitute an in-memory loader instead of
/// touching the filesystem.
pub trait SpecLoader {
    /// Parse a [`TopologySpec`] from `path`.
    fn load(&self, path: &Path) -> Result<TopologySpec, SpecError>;

    /// Read a manual-link file (`FROM TO SPEED [COST_A [COST_B]]` per
    /// line, blank lines and lines starting with `#` ignored) referenced
    /// by an AS's `links.file` field.
    fn load_link_file(&self, path: &Path) -> Result<Vec<LinkFileEntry>, SpecError>;
}

/// One parsed line of a manual-link file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkFileEntry {
    /// First endpoint's router index.
    pub first: u32,
    /// Second endpoint's router index.
    pub second: u32,
    /// Nominal link speed in Mbit/s.
    pub speed: u32,
    /// IGP cost on the first endpoint's side.
    pub cost_a: Option<u32>,
    /// IGP cost on the second endpoint's side.
    pub cost_b: Option<u32>,
}

/// Reads specs and link files directly off the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSpecLoader;

impl SpecLoader for FsSpecLoader {
    fn load(&self, path: &Path) -> Result<TopologySpec, SpecError> {
        let data = std::fs::read_to_string(path).map_err(|source| SpecError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml_ng::from_str(&data).map_err(|source| SpecError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn load_link_file(&self, path: &Path) -> Result<Vec<LinkFileEntry>, SpecError> {
        let data = std::fs::read_to_string(path).map_err(|source| SpecError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(parse_link_file(&data))
    }
}

fn parse_link_file(data: &str) -> Vec<LinkFileEntry> {
    data.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 {
                return None;
            }
            let first = fields[0].parse().ok()?;
            let second = fields[1].parse().ok()?;
            let speed = fields[2].parse().ok()?;
            let cost_a = fields.get(3).and_then(|s| s.parse().ok());
            let cost_b = fields.get(4).and_then(|s| s.parse().ok());
            Some(LinkFileEntry {
                first,
                second,
                speed,
                cost_a,
                cost_b,
            })
        })
        .collect()
}

/// Persist a spec to disk as YAML, overwriting any existing file (used by
/// `project create` to keep a copy of the input alongside the project's
/// other metadata).
pub fn save_spec(loader_target: &Path, spec: &TopologySpec) -> Result<(), SpecError> {
    let data = serde_yaml_ng::to_string(spec).expect("TopologySpec serialization is infallible");
    std::fs::write(loader_target, data).map_err(|source| SpecError::Write {
        path: loader_target.to_path_buf(),
        source,
    })
}

/// Resolve a path that may be relative to the directory containing the
/// spec file it was referenced from (`links.file`, `external_links_file`,
/// `rpki[].cache_file`).
pub fn resolve_relative(spec_path: &Path, referenced: &str) -> PathBuf {
    let referenced = Path::new(referenced);
    if referenced.is_absolute() {
        return referenced.to_path_buf();
    }
    spec_path
        .parent()
        .map(|dir| dir.join(referenced))
        .unwrap_or_else(|| referenced.to_path_buf())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_manual_link_file_ignoring_comments() {
        let data = "# comment\n1 2 1000\n2 3 1000 5 10\n\n";
        let entries = parse_link_file(data);
        assert_eq!(
            entries,
            vec![
                LinkFileEntry {
                    first: 1,
                    second: 2,
                    speed: 1000,
                    cost_a: None,
                    cost_b: None
                },
                LinkFileEntry {
                    first: 2,
                    second: 3,
                    speed: 1000,
                    cost_a: Some(5),
                    cost_b: Some(10)
                },
            ]
        );
    }

    #[test]
    fn resolve_relative_keeps_absolute_paths() {
        let spec_path = Path::new("/a/b/topo.yaml");
        assert_eq!(
            resolve_relative(spec_path, "/etc/links.txt"),
            PathBuf::from("/etc/links.txt")
        );
        assert_eq!(
            resolve_relative(spec_path, "links.txt"),
            PathBuf::from("/a/b/links.txt")
        );
    }
}
