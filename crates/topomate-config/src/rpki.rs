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

//! RPKI cache block: spec.md §4.3 item 4.

use std::fmt::Write as _;

use topomate_model::Router;

pub fn write_rpki(out: &mut String, router: &Router) {
    if router.rpki_caches.is_empty() {
        return;
    }
    let _ = writeln!(out, "rpki");
    for (i, cache) in router.rpki_caches.iter().enumerate() {
        let _ = writeln!(
            out,
            " rpki cache {} {} preference {}",
            cache.address,
            cache.port,
            i + 1
        );
    }
    let _ = writeln!(out, "exit");
    let _ = writeln!(out, "!");
}
