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

//! The production [`FabricDriver`]: veth/netns plumbing over `rtnetlink`,
//! bridge and flow plumbing over `ovs-vsctl`/`ovs-ofctl`.
//!
//! The source material manages ports through `ovs-vsctl` (`internal/ovsdocker`)
//! but installs point-to-point flow isolation through a raw OVS-datapath
//! netlink library (`internal/datapath`, `github.com/weaveworks/go-odp`) --
//! two different backends for what is conceptually one job ("make this
//! bridge forward only between these two ports"). No crate in this
//! workspace's dependency set speaks the raw datapath protocol, so
//! [`LinuxFabric::add_flow`] uses `ovs-ofctl`, the userspace equivalent of
//! the same operation (recorded in DESIGN.md).

use std::collections::BTreeMap;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::driver::FabricDriver;
use crate::error::FabricError;
use crate::netns;
use crate::settings::{HostIface, PortSettings};

const MPLS_MAX_LABELS: u32 = 65_535;

/// `ovs-vsctl`/`ovs-ofctl`-backed [`FabricDriver`] wired to a real
/// netlink/namespace stack. Requires `CAP_NET_ADMIN` (typically run via
/// `sudo`, matching `utils.ExecSudo` in the source material).
pub struct LinuxFabric {
    use_sudo: bool,
}

impl LinuxFabric {
    /// A driver that prefixes every shell-out with `sudo`, the source
    /// material's default.
    pub fn new() -> Self {
        Self { use_sudo: true }
    }

    /// A driver that runs commands as the current user, for environments
    /// that already run privileged (e.g. inside a root-owned CI runner).
    pub fn without_sudo() -> Self {
        Self { use_sudo: false }
    }

    fn command(&self, program: &str) -> Command {
        if self.use_sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg(program);
            cmd
        } else {
            Command::new(program)
        }
    }

    async fn run(&self, program: &str, args: &[&str]) -> Result<(), FabricError> {
        let mut cmd = self.command(program);
        cmd.args(args).stdout(Stdio::null()).stderr(Stdio::piped());
        let output = cmd.output().await.map_err(|source| FabricError::Spawn {
            command: format!("{program} {}", args.join(" ")),
            source,
        })?;
        if !output.status.success() {
            return Err(FabricError::Command {
                command: format!("{program} {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl Default for LinuxFabric {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FabricDriver for LinuxFabric {
    async fn create_bridge(&self, name: &str) -> Result<(), FabricError> {
        tracing::debug!(bridge = name, "creating OVS bridge");
        self.run("ovs-vsctl", &["--may-exist", "add-br", name]).await
    }

    async fn delete_bridge(&self, name: &str) -> Result<(), FabricError> {
        tracing::debug!(bridge = name, "deleting OVS bridge");
        self.run("ovs-vsctl", &["--if-exists", "del-br", name]).await
    }

    async fn attach_port_to_container(
        &self,
        bridge: &str,
        if_name: &str,
        container_pid: i32,
        container_name: &str,
        settings: PortSettings,
        attach_to_bridge: bool,
    ) -> Result<HostIface, FabricError> {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        let base = &uuid[..13];
        let host_if = format!("{base}_l");
        let peer_if = format!("{base}_c");

        tracing::debug!(
            container = container_name,
            iface = if_name,
            host = host_if,
            "creating veth pair"
        );

        create_veth_pair(&host_if, &peer_if).await?;
        set_link_up(&host_if).await?;
        move_to_netns_and_configure(&peer_if, if_name, container_pid, &settings).await?;

        if attach_to_bridge {
            add_port_to_ovs(self, bridge, &host_if, container_name, settings.speed).await?;
        }

        Ok(HostIface {
            host_if,
            bridge: bridge.to_string(),
            container_if: if_name.to_string(),
            settings,
        })
    }

    async fn bulk_add_to_bridge(
        &self,
        ports: &BTreeMap<String, Vec<HostIface>>,
    ) -> Result<(), FabricError> {
        tracing::info!(containers = ports.len(), "bulk-attaching veth ports to bridges");
        for (container_name, ifaces) in ports {
            for iface in ifaces {
                add_port_to_ovs(self, &iface.bridge, &iface.host_if, container_name, iface.settings.speed)
                    .await?;
                if let Some(of_port) = iface.settings.of_port {
                    self.run(
                        "ovs-vsctl",
                        &[
                            "set",
                            "interface",
                            &iface.host_if,
                            &format!("ofport_request={of_port}"),
                        ],
                    )
                    .await?;
                }
            }
        }
        Ok(())
    }

    async fn add_flow(&self, bridge: &str, src_if: &str, dst_if: &str) -> Result<(), FabricError> {
        tracing::debug!(bridge, src_if, dst_if, "installing point-to-point flow");
        let src_port = ovs_ofport(self, bridge, src_if).await?;
        let dst_port = ovs_ofport(self, bridge, dst_if).await?;
        for (in_port, out_port) in [(src_port, dst_port), (dst_port, src_port)] {
            self.run(
                "ovs-ofctl",
                &[
                    "add-flow",
                    bridge,
                    &format!("in_port={in_port},actions=output:{out_port}"),
                ],
            )
            .await?;
        }
        Ok(())
    }

    async fn delete_port(&self, bridge: &str, host_if: &str) -> Result<(), FabricError> {
        tracing::debug!(bridge, host_if, "deleting OVS port");
        self.run("ovs-vsctl", &["--if-exists", "del-port", bridge, host_if])
            .await
    }
}

async fn ovs_ofport(fabric: &LinuxFabric, bridge: &str, iface: &str) -> Result<String, FabricError> {
    let mut cmd = fabric.command("ovs-vsctl");
    cmd.args(["get", "interface", iface, "ofport"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let output = cmd.output().await.map_err(|source| FabricError::Spawn {
        command: format!("ovs-vsctl get interface {iface} ofport"),
        source,
    })?;
    if !output.status.success() {
        return Err(FabricError::Command {
            command: format!("ovs-vsctl get interface {iface} ofport (bridge {bridge})"),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

async fn add_port_to_ovs(
    fabric: &LinuxFabric,
    bridge: &str,
    host_if: &str,
    container_name: &str,
    speed_mbit: u32,
) -> Result<(), FabricError> {
    fabric
        .run(
            "ovs-vsctl",
            &[
                "--may-exist",
                "add-port",
                bridge,
                host_if,
                "--",
                "set",
                "interface",
                host_if,
                &format!("external_ids:container_id={container_name}"),
                &format!("external_ids:container_iface={host_if}"),
                &format!("ingress_policing_rate={}", speed_mbit * 1000),
            ],
        )
        .await
}

async fn create_veth_pair(host: &str, peer: &str) -> Result<(), FabricError> {
    let (connection, handle, _) = rtnetlink::new_connection()?;
    tokio::spawn(connection);
    handle
        .link()
        .add()
        .veth(host.to_string(), peer.to_string())
        .execute()
        .await?;
    Ok(())
}

async fn set_link_up(name: &str) -> Result<(), FabricError> {
    let (connection, handle, _) = rtnetlink::new_connection()?;
    tokio::spawn(connection);
    let index = link_index(&handle, name).await?;
    handle.link().set(index).up().execute().await?;
    Ok(())
}

async fn link_index(handle: &rtnetlink::Handle, name: &str) -> Result<u32, FabricError> {
    use futures::TryStreamExt;
    let mut links = handle.link().get().match_name(name.to_string()).execute();
    match links.try_next().await? {
        Some(msg) => Ok(msg.header.index),
        None => Err(FabricError::Command {
            command: format!("link lookup {name}"),
            stderr: "no such link".to_string(),
        }),
    }
}

/// Move `peer_if` into `pid`'s netns, rename it to `if_name`, bring it up,
/// and apply MPLS/VRF settings -- all of which must happen with that
/// namespace current (spec.md §4.4).
async fn move_to_netns_and_configure(
    peer_if: &str,
    if_name: &str,
    pid: i32,
    settings: &PortSettings,
) -> Result<(), FabricError> {
    {
        let (connection, handle, _) = rtnetlink::new_connection()?;
        tokio::spawn(connection);
        let index = link_index(&handle, peer_if).await?;
        handle
            .link()
            .set(index)
            .setns_by_pid(pid as u32)
            .execute()
            .await?;
    }

    let peer_if = peer_if.to_string();
    let if_name = if_name.to_string();
    let settings = *settings;
    tokio::task::spawn_blocking(move || {
        netns::run_in_container_netns(pid, move |handle| async move {
            let index = link_index(&handle, &peer_if).await?;
            handle
                .link()
                .set(index)
                .name(if_name.clone())
                .execute()
                .await?;
            // Re-resolve: renaming invalidates cached indices on some kernels.
            let index = link_index(&handle, &if_name).await?;
            handle.link().set(index).up().execute().await?;

            if settings.mpls {
                enable_mpls(&if_name).await?;
            }
            if let Some(vrf) = &settings.vrf {
                enslave_to_vrf(&handle, &if_name, vrf).await?;
            }
            Ok(())
        })
    })
    .await
    .map_err(|e| FabricError::WorkerLost(e.to_string()))??;

    Ok(())
}

async fn enable_mpls(if_name: &str) -> Result<(), FabricError> {
    for (key, value) in [
        (format!("net.mpls.conf.{if_name}.input"), "1".to_string()),
        (
            "net.mpls.conf.platform_labels".to_string(),
            MPLS_MAX_LABELS.to_string(),
        ),
    ] {
        let output = Command::new("sysctl")
            .args(["-w", &format!("{key}={value}")])
            .output()
            .await
            .map_err(|source| FabricError::Spawn {
                command: format!("sysctl -w {key}={value}"),
                source,
            })?;
        if !output.status.success() {
            return Err(FabricError::Command {
                command: format!("sysctl -w {key}={value}"),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
    }
    Ok(())
}

/// Create (if missing) a VRF device and enslave `if_name` to it --
/// "enables L3 master-device acceptance in the container namespace" per
/// spec.md §4.4.
async fn enslave_to_vrf(handle: &rtnetlink::Handle, if_name: &str, vrf: &str) -> Result<(), FabricError> {
    use futures::TryStreamExt;

    let vrf_exists = {
        let mut links = handle.link().get().match_name(vrf.to_string()).execute();
        links.try_next().await.ok().flatten().is_some()
    };
    if !vrf_exists {
        // table id == vrf name hash is arbitrary here; any unused table id works.
        let table_id = (vrf.bytes().fold(0u32, |a, b| a.wrapping_mul(31).wrapping_add(b as u32)) % 250) + 1;
        handle
            .link()
            .add()
            .vrf(vrf.to_string(), table_id)
            .execute()
            .await?;
        let vrf_index = link_index(handle, vrf).await?;
        handle.link().set(vrf_index).up().execute().await?;
    }

    let vrf_index = link_index(handle, vrf).await?;
    let if_index = link_index(handle, if_name).await?;
    handle.link().set(if_index).controller(vrf_index).execute().await?;
    Ok(())
}
