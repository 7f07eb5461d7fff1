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

//! Resolution of the three well-known directories: `MainDir` (the root,
//! defaulting to `~/topomate`), `ProjectDir` (persisted project
//! metadata), and `ConfigDir` (emitted per-router configuration files).

use std::path::{Path, PathBuf};

use crate::error::SpecError;

const DEFAULT_DIR_NAME: &str = "topomate";

/// The three directories topomate reads and writes outside of the input
/// spec itself.
#[derive(Debug, Clone)]
pub struct Directories {
    main: PathBuf,
    project: PathBuf,
    config: PathBuf,
}

impl Directories {
    /// Resolve directories from explicit overrides, falling back to
    /// `~/topomate`, `~/topomate/projects`, `~/topomate/generated` for
    /// any that are `None`.
    pub fn resolve(
        main_dir: Option<PathBuf>,
        project_dir: Option<PathBuf>,
        config_dir: Option<PathBuf>,
    ) -> Result<Self, SpecError> {
        let main = match main_dir {
            Some(p) => p,
            None => dirs::home_dir()
                .ok_or(SpecError::NoHomeDir)?
                .join(DEFAULT_DIR_NAME),
        };
        let project = project_dir.unwrap_or_else(|| main.join("projects"));
        let config = config_dir.unwrap_or_else(|| main.join("generated"));
        Ok(Self {
            main,
            project,
            config,
        })
    }

    /// `MainDir`.
    pub fn main_dir(&self) -> &Path {
        &self.main
    }

    /// `ProjectDir`.
    pub fn project_dir(&self) -> &Path {
        &self.project
    }

    /// `ConfigDir`.
    pub fn config_dir(&self) -> &Path {
        &self.config
    }

    /// Path to the persisted link inventory, `<MainDir>/links.json`.
    pub fn links_file(&self) -> PathBuf {
        self.main.join("links.json")
    }

    /// Path a project's metadata file would live at.
    pub fn project_file(&self, name: &str) -> PathBuf {
        self.project.join(format!("{name}.yaml"))
    }

    /// Path an emitted router config would live at.
    pub fn router_config_file(&self, asn: u32, hostname: &str) -> PathBuf {
        self.config.join(format!("conf_{asn}_{hostname}"))
    }

    /// Path an emitted CE router config would live at.
    pub fn ce_config_file(&self, hostname: &str) -> PathBuf {
        self.config.join(format!("conf_cust_{hostname}"))
    }

    /// Create all three directories if they don't already exist.
    pub fn ensure_exist(&self) -> Result<(), SpecError> {
        for dir in [&self.main, &self.project, &self.config] {
            std::fs::create_dir_all(dir)
                .map_err(|_| SpecError::Directory(dir.clone()))?;
        }
        Ok(())
    }
}
