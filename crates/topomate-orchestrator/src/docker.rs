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

//! A thin `bollard`-backed wrapper around the handful of Docker Engine
//! operations the orchestrator needs: create/start/stop/restart/remove a
//! container, list ones this tool owns, and read back a running
//! container's PID for [`topomate_fabric::FabricDriver::attach_port_to_container`].
//!
//! Every router and host container disables Docker's own networking
//! (`network_disabled`) since all connectivity is wired by hand through
//! the Fabric Driver, and requests `SYS_ADMIN`/`NET_ADMIN` so the fabric
//! can move interfaces into its namespace and bring them up.

use std::collections::HashMap;
use std::path::Path;

use bollard::container::{
    Config, CreateContainerOptions, ListContainersOptions, RemoveContainerOptions,
    RestartContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::HostConfig;
use bollard::Docker;
use futures::TryStreamExt;
use tokio::process::Command;

use crate::error::OrchestratorError;

/// Docker images recognized as topomate's own, for `cleanup` to find and
/// remove regardless of which project created them.
pub const ROUTER_IMAGE: &str = "topomate/router";
pub const ROUTE_SERVER_IMAGE: &str = "topomate/routeserver";
/// VPN customer (CE) routers run the same FRR image as PE routers; they
/// just never carry a BGP block (`topomate-config::ce`).
pub const CE_IMAGE: &str = "topomate/router";
/// RPKI validator hosts, per `topomate_builder::as_builder`'s
/// `Host::image` literal.
pub const RPKI_IMAGE: &str = "rpki-validator";

/// Thin wrapper around a [`Docker`] connection.
pub struct DockerClient {
    docker: Docker,
}

impl DockerClient {
    /// Connect using the local Docker daemon's default socket, honoring
    /// `DOCKER_HOST` and friends the way the Docker CLI itself does.
    pub fn connect() -> Result<Self, OrchestratorError> {
        Ok(Self {
            docker: Docker::connect_with_local_defaults()?,
        })
    }

    /// Create `name` if it does not already exist, then start it. Returns
    /// without error if the container was already present (mirrors the
    /// source material's "list by name filter, create only if absent"
    /// idempotency check).
    pub async fn ensure_started(
        &self,
        name: &str,
        hostname: &str,
        image: &str,
    ) -> Result<(), OrchestratorError> {
        if !self.exists(name).await? {
            let options = CreateContainerOptions {
                name: name.to_string(),
                platform: None,
            };
            let config = Config {
                image: Some(image.to_string()),
                hostname: Some(hostname.to_string()),
                network_disabled: Some(true),
                host_config: Some(HostConfig {
                    cap_add: Some(vec!["SYS_ADMIN".to_string(), "NET_ADMIN".to_string()]),
                    ..Default::default()
                }),
                ..Default::default()
            };
            self.docker.create_container(Some(options), config).await?;
        }

        self.docker
            .start_container(name, None::<StartContainerOptions<String>>)
            .await?;
        Ok(())
    }

    /// Pull `image` from its registry, overwriting any local copy. `start`
    /// calls this once per distinct image before creating containers,
    /// unless the CLI's `--no-pull` is given.
    pub async fn pull_image(&self, image: &str) -> Result<(), OrchestratorError> {
        tracing::debug!(image, "pulling image");
        let options = CreateImageOptions {
            from_image: image.to_string(),
            ..Default::default()
        };
        self.docker
            .create_image(Some(options), None, None)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(())
    }

    /// Whether a container named `name` exists (running or not).
    pub async fn exists(&self, name: &str) -> Result<bool, OrchestratorError> {
        let mut filters = HashMap::new();
        filters.insert("name".to_string(), vec![name.to_string()]);
        let options = ListContainersOptions {
            all: true,
            filters,
            ..Default::default()
        };
        let containers = self.docker.list_containers(Some(options)).await?;
        Ok(containers.iter().any(|c| {
            c.names
                .as_ref()
                .is_some_and(|names| names.iter().any(|n| n.trim_start_matches('/') == name))
        }))
    }

    /// Copy a generated configuration file into the container's
    /// `/etc/frr/frr.conf`, by shelling out to `docker cp` -- the same
    /// mechanism the source material uses rather than the Engine API's
    /// tar-archive upload endpoint.
    pub async fn copy_config(&self, name: &str, config_path: &Path) -> Result<(), OrchestratorError> {
        let dest = format!("{name}:/etc/frr/frr.conf");
        let output = Command::new("docker")
            .arg("cp")
            .arg(config_path)
            .arg(&dest)
            .output()
            .await
            .map_err(|source| OrchestratorError::CopyConfig {
                container: name.to_string(),
                src: config_path.display().to_string(),
                dest: dest.clone(),
                detail: source.to_string(),
            })?;
        if !output.status.success() {
            return Err(OrchestratorError::CopyConfig {
                container: name.to_string(),
                src: config_path.display().to_string(),
                dest,
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    /// Apply a just-copied `/etc/frr/frr.conf` to the already-running
    /// daemon inside `name`, the same way an operator reloads an
    /// integrated vtysh config by hand (`vtysh -b` re-reads and replays
    /// every line of the integrated file against the running daemons).
    /// Released only after every container's ports are wired (spec.md
    /// §5's reload-ready barrier), so this always runs against a
    /// fully-attached namespace.
    pub async fn reload_config(&self, name: &str) -> Result<(), OrchestratorError> {
        let output = Command::new("docker")
            .args(["exec", name, "vtysh", "-b"])
            .output()
            .await
            .map_err(|source| OrchestratorError::CopyConfig {
                container: name.to_string(),
                src: "/etc/frr/frr.conf".to_string(),
                dest: format!("{name} (reload)"),
                detail: source.to_string(),
            })?;
        if !output.status.success() {
            return Err(OrchestratorError::CopyConfig {
                container: name.to_string(),
                src: "/etc/frr/frr.conf".to_string(),
                dest: format!("{name} (reload)"),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    /// The PID Docker reports for `name`'s init process, for
    /// `setns`-based namespace entry.
    pub async fn pid_of(&self, name: &str) -> Result<i32, OrchestratorError> {
        let inspect = self.docker.inspect_container(name, None).await?;
        inspect
            .state
            .and_then(|s| s.pid)
            .filter(|pid| *pid > 0)
            .map(|pid| pid as i32)
            .ok_or_else(|| OrchestratorError::NoPid(name.to_string()))
    }

    pub async fn stop(&self, name: &str) -> Result<(), OrchestratorError> {
        self.docker
            .stop_container(name, None::<StopContainerOptions>)
            .await?;
        Ok(())
    }

    pub async fn restart(&self, name: &str) -> Result<(), OrchestratorError> {
        self.docker
            .restart_container(name, None::<RestartContainerOptions>)
            .await?;
        Ok(())
    }

    pub async fn remove(&self, name: &str) -> Result<(), OrchestratorError> {
        let options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };
        self.docker.remove_container(name, Some(options)).await?;
        Ok(())
    }

    /// Every container whose image is one topomate creates (used by
    /// `cleanup`, which otherwise has no project file to consult).
    pub async fn list_owned(&self) -> Result<Vec<String>, OrchestratorError> {
        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };
        let containers = self.docker.list_containers(Some(options)).await?;
        Ok(containers
            .into_iter()
            .filter(|c| {
                matches!(
                    c.image.as_deref(),
                    Some(ROUTER_IMAGE) | Some(ROUTE_SERVER_IMAGE) | Some(RPKI_IMAGE)
                )
            })
            .filter_map(|c| c.id)
            .collect())
    }
}
