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

//! Running netlink operations inside a container's network namespace.
//!
//! `rtnetlink::Handle::link().set(..).setns_by_pid(..)` can move an
//! interface into another namespace from the host namespace, but renaming
//! it, bringing it up, and enslaving it to a VRF device all have to happen
//! with *that* namespace current. Rather than shell out to
//! `ip netns exec <pid> ip link ...` (the source material's approach), we
//! swap a dedicated OS thread into the target namespace with `setns` and
//! open a fresh netlink socket there.

use std::future::Future;
use std::os::fd::BorrowedFd;
use std::path::{Path, PathBuf};

use nix::fcntl::OFlag;
use nix::sched::CloneFlags;
use nix::sys::stat::Mode;
use rtnetlink::Handle;

use crate::error::FabricError;

/// Run `f` with a fresh [`Handle`] connected inside the namespace at
/// `/proc/<pid>/ns/net`, on a dedicated OS thread, and return its result.
///
/// The calling (async) context is not blocked on the namespace swap
/// itself -- the closure runs to completion on its own thread and the
/// result is joined back in; callers should still invoke this from inside
/// `tokio::task::spawn_blocking` if called from a multi-threaded runtime
/// that must keep servicing other tasks meanwhile.
pub fn run_in_container_netns<F, Fut, T>(pid: i32, f: F) -> Result<T, FabricError>
where
    F: FnOnce(Handle) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, FabricError>>,
    T: Send + 'static,
{
    let ns_path = PathBuf::from(format!("/proc/{pid}/ns/net"));
    let path_for_thread = ns_path.clone();

    let handle = std::thread::Builder::new()
        .name(format!("topomate-netns-{pid}"))
        .spawn(move || -> Result<T, FabricError> {
            unsafe { enter_netns(&path_for_thread) }?;

            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_io()
                .enable_time()
                .build()
                .map_err(|source| FabricError::Namespace {
                    path: path_for_thread.clone(),
                    source,
                })?;

            rt.block_on(async move {
                let (connection, handle, _) = rtnetlink::new_connection()?;
                tokio::spawn(connection);
                f(handle).await
            })
        })
        .map_err(|source| FabricError::Namespace {
            path: ns_path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::Other, source.to_string()),
        })?;

    handle
        .join()
        .map_err(|_| FabricError::WorkerLost(ns_path.display().to_string()))?
}

/// # Safety
/// Must only be called on a thread that owns no other namespace-sensitive
/// state (sockets, open files keyed to the previous namespace) -- it is
/// only ever invoked on the freshly spawned, single-purpose thread above.
unsafe fn enter_netns(path: &Path) -> Result<(), FabricError> {
    nix::sched::unshare(CloneFlags::CLONE_NEWNET).map_err(|e| FabricError::Namespace {
        path: path.to_path_buf(),
        source: std::io::Error::from(e),
    })?;

    let fd = nix::fcntl::open(path, OFlag::O_RDONLY | OFlag::O_CLOEXEC, Mode::empty())
        .map_err(|e| FabricError::Namespace {
            path: path.to_path_buf(),
            source: std::io::Error::from(e),
        })?;

    let borrowed = BorrowedFd::borrow_raw(fd);
    let result = nix::sched::setns(borrowed, CloneFlags::CLONE_NEWNET).map_err(|e| {
        FabricError::Namespace {
            path: path.to_path_buf(),
            source: std::io::Error::from(e),
        }
    });
    let _ = nix::unistd::close(fd);
    result
}
