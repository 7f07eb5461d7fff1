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

//! Auxiliary workloads that are not routers: RPKI validators and similar
//! single-purpose containers attached to exactly one router.

use serde::{Deserialize, Serialize};
use topomate_types::{LinkId, RouterId};

/// A non-routing container attached to an AS via a dedicated internal
/// link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    /// Hostname / container name suffix.
    pub hostname: String,
    /// Container image.
    pub image: String,
    /// The router this host is linked to.
    pub linked_router: RouterId,
    /// The internal link realizing that attachment.
    pub link: LinkId,
}
