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

/// Errors that can occur while locating, reading, or parsing a declarative
/// topology spec.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// The spec file (or a `file:` it references) could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The spec file could not be written (used by `project create`'s
    /// persistence step).
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The YAML did not match the expected schema.
    #[error("malformed spec in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
    /// A directory required by the spec facility (main/project/config) does
    /// not exist and could not be created.
    #[error("cannot create directory {0}")]
    Directory(PathBuf),
    /// No home directory could be resolved to default `MainDir` under.
    #[error("cannot determine a home directory to default MainDir under")]
    NoHomeDir,
}
