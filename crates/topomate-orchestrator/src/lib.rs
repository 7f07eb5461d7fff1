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

//! Concurrent container/fabric lifecycle orchestration: spec.md §4.5/§5.
//!
//! [`Orchestrator::start`] brings up every container this project needs
//! (provider routers, IXP route servers -- which are just ordinary routers
//! in a synthetic AS -- VPN customer CEs, and RPKI validator hosts) in
//! parallel, then single-threadedly wires bridges, veth pairs and flow
//! rules once every container's namespace exists, persists the resulting
//! [`inventory::LinkInventory`], and only then lets each container's task
//! reload its routing daemon's configuration -- mirroring the source
//! material's goroutine-plus-waitgroup-plus-channel structure with a
//! [`tokio::sync::Barrier`] standing in for the "reload-ready" channel.

pub mod docker;
pub mod error;
pub mod inventory;
pub mod naming;

pub use docker::DockerClient;
pub use error::OrchestratorError;
pub use inventory::LinkInventory;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::try_join_all;
use tokio::sync::{oneshot, Barrier};
use topomate_fabric::{FabricDriver, HostIface, PortSettings};
use topomate_model::Project;
use topomate_types::{Asn, RouterId};

/// Which bridge categories [`Orchestrator::start`] should wire, per the
/// CLI's `--links all|internal|external|none` flag. RPKI and VPN
/// attachments aren't one of spec.md §4.5's named link categories, so they
/// follow `internal`/`external` loosely: they're wired whenever anything
/// is (everything but `None`), since skipping them while their owning
/// router's container is still running would just leave an interface
/// permanently unattached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkScope {
    #[default]
    All,
    Internal,
    External,
    None,
}

impl LinkScope {
    fn wants_internal(self) -> bool {
        matches!(self, LinkScope::All | LinkScope::Internal)
    }

    fn wants_external(self) -> bool {
        matches!(self, LinkScope::All | LinkScope::External)
    }

    fn wants_any(self) -> bool {
        self != LinkScope::None
    }
}

/// Options governing one [`Orchestrator::start`] call, threaded down from
/// the CLI's `start` subcommand flags.
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    /// Which bridge categories to wire (`--links`).
    pub links: LinkScope,
    /// Restrict container creation and fabric wiring to these ASNs
    /// (`--as`). `None` means every AS in the project.
    pub only_as: Option<BTreeSet<Asn>>,
    /// Pull each container's image before creating it (`--no-pull`
    /// negates this).
    pub pull_images: bool,
}

impl StartOptions {
    fn allows(&self, asn: Asn) -> bool {
        self.only_as.as_ref().map_or(true, |set| set.contains(&asn))
    }
}

/// Everything needed to create and start one container, independent of
/// whether it's a provider router, a route server, a CE, or an RPKI host.
#[derive(Debug, Clone)]
struct ContainerSpec {
    name: String,
    hostname: String,
    image: String,
    config_path: Option<PathBuf>,
    /// The AS this container's lifecycle is scoped to, for `--as`
    /// filtering. RPKI hosts have no owning AS of their own construction
    /// but are still attached to one router's AS.
    owner: Asn,
}

/// The concurrent lifecycle driver. Holds the collaborators named as
/// external to the core model in spec.md §1 (the container runtime, the
/// Fabric Driver) plus the directories it reads/writes generated
/// configuration and the link inventory under.
pub struct Orchestrator {
    docker: Arc<DockerClient>,
    fabric: Arc<dyn FabricDriver>,
    config_dir: PathBuf,
    links_file: PathBuf,
}

impl Orchestrator {
    pub fn new(
        docker: DockerClient,
        fabric: Arc<dyn FabricDriver>,
        config_dir: impl Into<PathBuf>,
        links_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            docker: Arc::new(docker),
            fabric,
            config_dir: config_dir.into(),
            links_file: links_file.into(),
        }
    }

    /// Bring up every container `project` needs, wire the fabric, persist
    /// the link inventory, then release every container to reload its
    /// configuration. See the module docs for the phase breakdown.
    pub async fn start(&self, project: &Project, opts: &StartOptions) -> Result<(), OrchestratorError> {
        let containers = enumerate_containers(project, &self.config_dir, Some(opts));
        tracing::info!(count = containers.len(), "starting containers");

        if opts.pull_images {
            let images: BTreeSet<&str> = containers.iter().map(|c| c.image.as_str()).collect();
            for image in images {
                self.docker.pull_image(image).await?;
            }
        }

        let barrier = Arc::new(Barrier::new(containers.len() + 1));
        let mut pid_rx = Vec::with_capacity(containers.len());
        let mut handles = Vec::with_capacity(containers.len());

        for spec in &containers {
            let (pid_tx, rx) = oneshot::channel();
            pid_rx.push((spec.name.clone(), rx));
            let barrier = barrier.clone();
            let docker = self.docker.clone();
            let spec = spec.clone();
            handles.push(tokio::spawn(async move {
                docker.ensure_started(&spec.name, &spec.hostname, &spec.image).await?;
                if let Some(path) = &spec.config_path {
                    docker.copy_config(&spec.name, path).await?;
                }
                let pid = docker.pid_of(&spec.name).await?;
                let _ = pid_tx.send(pid);
                // Wait until the orchestrator has finished wiring every
                // port before touching the routing daemon.
                barrier.wait().await;
                docker.reload_config(&spec.name).await
            }));
        }

        let mut pids = BTreeMap::new();
        for (name, rx) in pid_rx {
            let pid = rx.await.map_err(|_| OrchestratorError::TaskLost(name.clone(), "creation".into()))?;
            pids.insert(name, pid);
        }

        let inventory = self.wire_fabric(project, &pids, opts).await?;
        inventory.save(&self.links_file)?;

        // Releasing the barrier is what lets every container's task move
        // on to reload its own configuration.
        barrier.wait().await;

        for handle in handles {
            handle
                .await
                .map_err(|e| OrchestratorError::TaskLost("<unknown>".into(), e.to_string()))??;
        }

        Ok(())
    }

    /// Single-threaded bridge/port/flow construction, run only after every
    /// container above exists (spec.md §5's first ordering guarantee).
    async fn wire_fabric(
        &self,
        project: &Project,
        pids: &BTreeMap<String, i32>,
        opts: &StartOptions,
    ) -> Result<LinkInventory, OrchestratorError> {
        let mut inventory = LinkInventory::new();
        if !opts.links.wants_any() {
            return Ok(inventory);
        }
        let mut pending: BTreeMap<String, Vec<HostIface>> = BTreeMap::new();
        let mut flows: Vec<(String, String, String)> = Vec::new();

        for as_ in &project.autonomous_systems {
            if as_.links.is_empty() || !opts.links.wants_internal() || !opts.allows(as_.asn) {
                continue;
            }
            let bridge = naming::internal_bridge(as_.asn);
            self.fabric.create_bridge(&bridge).await?;

            for link in &as_.links {
                for end in [link.a, link.b] {
                    let router = as_.router(end.router).expect("validated project");
                    let container = router.container_name(as_.asn);
                    let pid = *pids
                        .get(&container)
                        .ok_or_else(|| OrchestratorError::UnknownContainer(container.clone()))?;
                    let iface_name = format!("eth{}", end.interface.0);
                    let host_iface = self
                        .fabric
                        .attach_port_to_container(
                            &bridge,
                            &iface_name,
                            pid,
                            &container,
                            PortSettings::default_params(),
                            false,
                        )
                        .await?;
                    pending.entry(container).or_default().push(host_iface);
                }
            }

            for link in &as_.links {
                let a_router = as_.router(link.a.router).expect("validated project");
                let b_router = as_.router(link.b.router).expect("validated project");
                let a_container = a_router.container_name(as_.asn);
                let b_container = b_router.container_name(as_.asn);
                let a_if = pending[&a_container]
                    .iter()
                    .rev()
                    .find(|h| h.container_if == format!("eth{}", link.a.interface.0))
                    .expect("just attached")
                    .host_if
                    .clone();
                let b_if = pending[&b_container]
                    .iter()
                    .rev()
                    .find(|h| h.container_if == format!("eth{}", link.b.interface.0))
                    .expect("just attached")
                    .host_if
                    .clone();
                flows.push((bridge.clone(), a_if, b_if));
            }
        }

        for link in &project.external_links {
            if !opts.links.wants_external() || !opts.allows(link.from.asn) || !opts.allows(link.to.asn) {
                continue;
            }
            let from_as = project.as_by_asn(link.from.asn).expect("validated project");
            let to_as = project.as_by_asn(link.to.asn).expect("validated project");
            let bridge = naming::external_bridge(link.from.asn, link.from.router, link.to.asn, link.to.router);
            self.fabric.create_bridge(&bridge).await?;

            for (as_, end) in [(from_as, link.from), (to_as, link.to)] {
                let router = as_.router(end.router).expect("validated project");
                let container = router.container_name(as_.asn);
                let pid = *pids
                    .get(&container)
                    .ok_or_else(|| OrchestratorError::UnknownContainer(container.clone()))?;
                let iface_name = format!("eth{}", end.interface.0);
                let host_iface = self
                    .fabric
                    .attach_port_to_container(&bridge, &iface_name, pid, &container, PortSettings::default_params(), false)
                    .await?;
                pending.entry(container).or_default().push(host_iface);
            }
        }

        for ixp in &project.ixps {
            if !opts.links.wants_external() || !opts.allows(ixp.asn) {
                continue;
            }
            let bridge = ixp.bridge_name();
            self.fabric.create_bridge(&bridge).await?;
            let rs_as = project.as_by_asn(ixp.asn).expect("validated project");
            let rs_router = rs_as.router(RouterId::from_one_based(1)).expect("route server");
            let rs_container = rs_router.container_name(ixp.asn);
            for (iface_owner_asn, router_id, container) in
                std::iter::once((ixp.asn, RouterId::from_one_based(1), rs_container.clone())).chain(
                    ixp.peers.iter().filter(|p| opts.allows(p.asn)).map(|p| {
                        let peer_as = project.as_by_asn(p.asn).expect("validated project");
                        let peer_router = peer_as.router(p.router).expect("validated project");
                        (p.asn, p.router, peer_router.container_name(p.asn))
                    }),
                )
            {
                let as_ = project.as_by_asn(iface_owner_asn).expect("validated project");
                let router = as_.router(router_id).expect("validated project");
                let pid = *pids
                    .get(&container)
                    .ok_or_else(|| OrchestratorError::UnknownContainer(container.clone()))?;
                // Matched by description rather than "whichever interface
                // was added last": a peer router may also carry eBGP or
                // other fabric-facing interfaces attached after this one.
                let needle = if router_id == RouterId::from_one_based(1) && as_.asn == ixp.asn {
                    "ixp fabric".to_string()
                } else {
                    format!("ixp:AS{}", ixp.asn.0)
                };
                let iface_id = find_interface_by_description(router, &needle)
                    .unwrap_or(router.next_interface.saturating_sub(1));
                let iface_name = format!("eth{iface_id}");
                let host_iface = self
                    .fabric
                    .attach_port_to_container(&bridge, &iface_name, pid, &container, PortSettings::default_params(), false)
                    .await?;
                pending.entry(container).or_default().push(host_iface);
            }
        }

        for rpki in &project.rpki_servers {
            if !opts.allows(rpki.asn) {
                continue;
            }
            let as_ = project.as_by_asn(rpki.asn).expect("validated project");
            let bridge = naming::rpki_bridge(rpki.asn, &rpki.hostname);
            self.fabric.create_bridge(&bridge).await?;

            let router = as_.router(rpki.linked_router).expect("validated project");
            let router_container = router.container_name(rpki.asn);
            let router_pid = *pids
                .get(&router_container)
                .ok_or_else(|| OrchestratorError::UnknownContainer(router_container.clone()))?;
            let router_iface_id = find_interface_by_description(router, &format!("rpki:{}", rpki.hostname))
                .unwrap_or(router.next_interface.saturating_sub(1));
            let router_iface_name = format!("eth{router_iface_id}");
            let router_host_iface = self
                .fabric
                .attach_port_to_container(
                    &bridge,
                    &router_iface_name,
                    router_pid,
                    &router_container,
                    PortSettings::default_params(),
                    false,
                )
                .await?;
            pending.entry(router_container).or_default().push(router_host_iface);

            let host_container = naming::ce_container_name(&rpki.hostname);
            if let Some(&host_pid) = pids.get(&host_container) {
                let host_iface = self
                    .fabric
                    .attach_port_to_container(&bridge, "eth0", host_pid, &host_container, PortSettings::default_params(), false)
                    .await?;
                pending.entry(host_container).or_default().push(host_iface);
            }
        }

        for as_ in &project.autonomous_systems {
            if !opts.allows(as_.asn) {
                continue;
            }
            for vpn in &as_.vpns {
                for customer in &vpn.customers {
                    let pe = as_.router(customer.parent).expect("validated project");
                    let pe_container = pe.container_name(as_.asn);
                    let bridge = naming::vpn_bridge(&vpn.vrf, &customer.ce.hostname);
                    self.fabric.create_bridge(&bridge).await?;

                    let pe_pid = *pids
                        .get(&pe_container)
                        .ok_or_else(|| OrchestratorError::UnknownContainer(pe_container.clone()))?;
                    let pe_iface = find_interface_by_description(pe, &format!("vpn:{}:{}", vpn.vrf, customer.ce.hostname))
                        .unwrap_or(pe.next_interface.saturating_sub(1));
                    let pe_host_iface = self
                        .fabric
                        .attach_port_to_container(
                            &bridge,
                            &format!("eth{pe_iface}"),
                            pe_pid,
                            &pe_container,
                            PortSettings {
                                vrf: Some(vpn.vrf.clone()),
                                ..PortSettings::default_params()
                            },
                            false,
                        )
                        .await?;
                    pending.entry(pe_container).or_default().push(pe_host_iface);

                    let ce_container = naming::ce_container_name(&customer.ce.hostname);
                    if let Some(&ce_pid) = pids.get(&ce_container) {
                        let ce_host_iface = self
                            .fabric
                            .attach_port_to_container(&bridge, "eth0", ce_pid, &ce_container, PortSettings::default_params(), false)
                            .await?;
                        pending.entry(ce_container).or_default().push(ce_host_iface);
                    }
                }
            }
        }

        self.fabric.bulk_add_to_bridge(&pending).await?;
        for (bridge, a_if, b_if) in flows {
            self.fabric.add_flow(&bridge, &a_if, &b_if).await?;
        }

        for (container, ifaces) in pending {
            for iface in ifaces {
                inventory.push(container.clone(), iface);
            }
        }

        Ok(inventory)
    }

    /// Stop every container, then delete every bridge, then remove the
    /// inventory file (spec.md §4.5's stop sequence).
    pub async fn stop(&self, project: &Project) -> Result<(), OrchestratorError> {
        let containers = enumerate_containers(project, &self.config_dir, None);
        let stops = containers.iter().map(|c| {
            let docker = self.docker.clone();
            let name = c.name.clone();
            async move { docker.stop(&name).await }
        });
        try_join_all(stops).await?;

        for bridge in all_bridge_names(project) {
            self.fabric.delete_bridge(&bridge).await?;
        }

        match std::fs::remove_file(&self.links_file) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(OrchestratorError::Inventory {
                    path: self.links_file.clone(),
                    source,
                })
            }
        }
        Ok(())
    }

    /// Stop a single container and delete only its ports, leaving bridges
    /// and every other container untouched. `container = None` pauses
    /// every entry in the inventory.
    pub async fn pause(&self, container: Option<&str>) -> Result<(), OrchestratorError> {
        let inventory = LinkInventory::load(&self.links_file)?;
        let targets = self.resolve_targets(&inventory, container)?;

        let tasks = targets.into_iter().map(|name| {
            let docker = self.docker.clone();
            let fabric = self.fabric.clone();
            let ports = inventory.ports_for(&name).to_vec();
            async move {
                docker.stop(&name).await?;
                for port in ports {
                    if let Err(e) = fabric.delete_port(&port.bridge, &port.host_if).await {
                        tracing::warn!(container = %name, bridge = %port.bridge, error = %e, "failed to delete port during pause");
                    }
                }
                Ok::<(), OrchestratorError>(())
            }
        });
        try_join_all(tasks).await?;
        Ok(())
    }

    /// Start a single container and re-attach every port recorded for it
    /// in the inventory, using the exact same settings it was given at
    /// `start` time. `container = None` resumes every entry.
    pub async fn resume(&self, project: &Project, container: Option<&str>) -> Result<(), OrchestratorError> {
        let inventory = LinkInventory::load(&self.links_file)?;
        let containers = enumerate_containers(project, &self.config_dir, None);
        let targets = self.resolve_targets(&inventory, container)?;

        for name in targets {
            let spec = containers
                .iter()
                .find(|c| c.name == name)
                .ok_or_else(|| OrchestratorError::UnknownContainer(name.clone()))?;
            self.docker.ensure_started(&spec.name, &spec.hostname, &spec.image).await?;
            let pid = self.docker.pid_of(&name).await?;

            for port in inventory.ports_for(&name) {
                let if_name = port.container_if.clone();
                self.fabric
                    .attach_port_to_container(&port.bridge, &if_name, pid, &name, port.settings, true)
                    .await?;
            }
            self.docker.reload_config(&name).await?;
        }
        Ok(())
    }

    /// Pause then resume one container.
    pub async fn restart(&self, project: &Project, container: &str) -> Result<(), OrchestratorError> {
        self.pause(Some(container)).await?;
        self.resume(project, Some(container)).await
    }

    /// Stop and remove every container this tool owns, regardless of
    /// which project created them, for when the project file itself is
    /// gone or stale.
    pub async fn cleanup(&self) -> Result<(), OrchestratorError> {
        let owned = self.docker.list_owned().await?;
        let removals = owned.iter().map(|id| {
            let docker = self.docker.clone();
            let id = id.clone();
            async move {
                let _ = docker.stop(&id).await;
                docker.remove(&id).await
            }
        });
        try_join_all(removals).await?;
        Ok(())
    }

    fn resolve_targets(&self, inventory: &LinkInventory, container: Option<&str>) -> Result<Vec<String>, OrchestratorError> {
        match container {
            Some(name) => {
                if !inventory.0.contains_key(name) {
                    return Err(OrchestratorError::UnknownContainer(name.to_string()));
                }
                Ok(vec![name.to_string()])
            }
            None => Ok(inventory.0.keys().cloned().collect()),
        }
    }
}

/// Every container `project` needs running, with the generated
/// configuration path it should receive (`None` for containers the config
/// emitter never produces a file for, such as RPKI validator hosts).
fn enumerate_containers(project: &Project, config_dir: &Path, opts: Option<&StartOptions>) -> Vec<ContainerSpec> {
    let mut out = Vec::new();
    let ixp_asns: std::collections::BTreeSet<Asn> = project.ixps.iter().map(|i| i.asn).collect();

    for as_ in &project.autonomous_systems {
        if opts.is_some_and(|o| !o.allows(as_.asn)) {
            continue;
        }
        let is_ixp = ixp_asns.contains(&as_.asn);
        for router in &as_.routers {
            let image = router.image.clone().unwrap_or_else(|| {
                if is_ixp {
                    docker::ROUTE_SERVER_IMAGE.to_string()
                } else {
                    docker::ROUTER_IMAGE.to_string()
                }
            });
            out.push(ContainerSpec {
                name: router.container_name(as_.asn),
                hostname: router.hostname.clone(),
                image,
                config_path: Some(config_dir.join(topomate_config::router_config_filename(as_.asn.0, &router.hostname))),
                owner: as_.asn,
            });
        }

        for vpn in &as_.vpns {
            for customer in &vpn.customers {
                out.push(ContainerSpec {
                    name: naming::ce_container_name(&customer.ce.hostname),
                    hostname: customer.ce.hostname.clone(),
                    image: customer.ce.image.clone().unwrap_or_else(|| docker::CE_IMAGE.to_string()),
                    config_path: Some(config_dir.join(topomate_config::ce_config_filename(&customer.ce.hostname))),
                    owner: as_.asn,
                });
            }
        }

        for host in &as_.hosts {
            out.push(ContainerSpec {
                name: naming::ce_container_name(&host.hostname),
                hostname: host.hostname.clone(),
                image: host.image.clone(),
                config_path: None,
                owner: as_.asn,
            });
        }
    }

    out
}

fn all_bridge_names(project: &Project) -> Vec<String> {
    let mut names = Vec::new();
    for as_ in &project.autonomous_systems {
        if !as_.links.is_empty() {
            names.push(naming::internal_bridge(as_.asn));
        }
        for vpn in &as_.vpns {
            for customer in &vpn.customers {
                names.push(naming::vpn_bridge(&vpn.vrf, &customer.ce.hostname));
            }
        }
    }
    for link in &project.external_links {
        names.push(naming::external_bridge(link.from.asn, link.from.router, link.to.asn, link.to.router));
    }
    for ixp in &project.ixps {
        names.push(ixp.bridge_name());
    }
    for rpki in &project.rpki_servers {
        names.push(naming::rpki_bridge(rpki.asn, &rpki.hostname));
    }
    names
}

fn find_interface_by_description(router: &topomate_model::Router, needle: &str) -> Option<u32> {
    router
        .interfaces
        .iter()
        .find(|i| i.description.as_deref() == Some(needle))
        .map(|i| i.id.0)
}

#[cfg(test)]
mod test {
    use super::*;
    use topomate_types::Asn;

    #[test]
    fn enumerates_one_container_per_router() {
        let mut project = Project::new("t");
        project
            .autonomous_systems
            .push(topomate_model::AutonomousSystem::new(Asn(65000), "10.0.0.0/24".parse().unwrap(), 3));
        let containers = enumerate_containers(&project, Path::new("/tmp/conf"), None);
        assert_eq!(containers.len(), 3);
        assert_eq!(containers[0].name, "AS65000-R1");
    }

    #[test]
    fn bridge_names_cover_every_as_with_links() {
        let mut project = Project::new("t");
        let mut as_ = topomate_model::AutonomousSystem::new(Asn(65000), "10.0.0.0/24".parse().unwrap(), 2);
        as_.links.push(topomate_model::Link {
            id: topomate_types::LinkId(0),
            a: topomate_model::link::LinkItem {
                router: topomate_types::RouterId::from_one_based(1),
                interface: topomate_types::InterfaceId(0),
            },
            b: topomate_model::link::LinkItem {
                router: topomate_types::RouterId::from_one_based(2),
                interface: topomate_types::InterfaceId(0),
            },
            subnet: None,
        });
        project.autonomous_systems.push(as_);
        let bridges = all_bridge_names(&project);
        assert_eq!(bridges, vec!["int-65000".to_string()]);
    }
}
