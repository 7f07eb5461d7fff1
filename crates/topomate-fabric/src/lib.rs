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

//! The Fabric Driver: the thin boundary between the orchestrator and the
//! actual wiring of containers together (bridges, veth pairs, namespaces,
//! OpenFlow rules). See [`FabricDriver`] for the trait contract and
//! [`LinuxFabric`]/[`RecordingFabric`] for its two implementations.

mod driver;
mod error;
mod linux;
mod netns;
mod null;
mod settings;

pub use driver::FabricDriver;
pub use error::FabricError;
pub use linux::LinuxFabric;
pub use null::{FabricCall, RecordingFabric};
pub use settings::{HostIface, PortSettings};
