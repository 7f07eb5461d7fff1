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

//! One handler per spec.md §6 subcommand. Every handler is a thin
//! sequence over the core crates: resolve paths via
//! [`topomate_spec::Directories`], load/elaborate/emit via
//! `topomate-spec`/`topomate-builder`/`topomate-config`, and drive the
//! container/fabric lifecycle via `topomate-orchestrator`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use topomate_builder::build_project;
use topomate_config::emit_project;
use topomate_fabric::LinuxFabric;
use topomate_model::Project;
use topomate_orchestrator::{DockerClient, LinkScope, Orchestrator, StartOptions};
use topomate_spec::{save_spec, Directories, FsSpecLoader, SpecLoader, TopologySpec};
use topomate_types::Asn;

use crate::cli::{ProjectCommand, ProjectTarget, SpecSource, StartArgs};
use crate::error::CliError;

/// `project create <name> --file <path>`.
pub fn project_create(dirs: &Directories, name: &str, file: &Path) -> Result<(), CliError> {
    let loader = FsSpecLoader;
    let spec = loader.load(file)?;
    // Elaborating here (and discarding the result) surfaces spec errors at
    // `create` time rather than deferring them to the first `generate`.
    build_project(&spec, &loader, file)?;

    dirs.ensure_exist()?;
    save_spec(&dirs.project_file(name), &spec)?;
    println!("created project {name:?} ({} autonomous systems)", spec.autonomous_systems.len());
    Ok(())
}

/// `project list`.
pub fn project_list(dirs: &Directories) -> Result<(), CliError> {
    for (name, spec) in list_projects(dirs)? {
        let asns: Vec<u32> = spec.autonomous_systems.iter().map(|a| a.asn).collect();
        let routers: u32 = spec.autonomous_systems.iter().map(|a| a.routers).sum();
        println!(
            "{name}\tAS={}\tASNs={asns:?}\trouters={routers}",
            spec.autonomous_systems.len()
        );
    }
    Ok(())
}

/// `project delete <name>`.
pub fn project_delete(dirs: &Directories, name: &str) -> Result<(), CliError> {
    let path = dirs.project_file(name);
    std::fs::remove_file(&path).map_err(|source| CliError::Write { path, source })?;
    println!("deleted project {name:?}");
    Ok(())
}

/// `generate [--project <name> | <file>]`: elaborate and emit only.
pub fn generate(dirs: &Directories, spec_source: &SpecSource) -> Result<(), CliError> {
    let (project, _spec_path) = elaborate(dirs, spec_source)?;
    write_generated_config(dirs, &project)?;
    Ok(())
}

/// `start [--project <name> | <file>] [--links ...] [--no-generate] [--no-pull] [--as <csv>]`.
pub async fn start(dirs: &Directories, args: &StartArgs) -> Result<(), CliError> {
    let (project, _spec_path) = elaborate(dirs, &args.spec)?;
    if !args.no_generate {
        write_generated_config(dirs, &project)?;
    }

    let only_as = match &args.r#as {
        None => None,
        Some(csv) => Some(parse_asn_list(csv)?),
    };
    let opts = StartOptions {
        links: LinkScope::from(args.links),
        only_as,
        pull_images: !args.no_pull,
    };

    let orchestrator = make_orchestrator(dirs)?;
    orchestrator.start(&project, &opts).await?;
    println!("started {} containers", count_containers(&project));
    Ok(())
}

/// `pause [<container>]`.
pub async fn pause(dirs: &Directories, container: Option<&str>) -> Result<(), CliError> {
    let orchestrator = make_orchestrator(dirs)?;
    orchestrator.pause(container).await?;
    println!("paused {}", container.unwrap_or("all containers"));
    Ok(())
}

/// `resume [<container>]`.
pub async fn resume(dirs: &Directories, container: Option<&str>, project: &ProjectTarget) -> Result<(), CliError> {
    let target_project = resolve_project_for_lifecycle(dirs, project)?;
    let orchestrator = make_orchestrator(dirs)?;
    orchestrator.resume(&target_project, container).await?;
    println!("resumed {}", container.unwrap_or("all containers"));
    Ok(())
}

/// `restart <container>`.
pub async fn restart(dirs: &Directories, container: &str, project: &ProjectTarget) -> Result<(), CliError> {
    let target_project = resolve_project_for_lifecycle(dirs, project)?;
    let orchestrator = make_orchestrator(dirs)?;
    orchestrator.restart(&target_project, container).await?;
    println!("restarted {container}");
    Ok(())
}

/// `cleanup`.
pub async fn cleanup(dirs: &Directories) -> Result<(), CliError> {
    let orchestrator = make_orchestrator(dirs)?;
    orchestrator.cleanup().await?;
    println!("cleaned up every topomate-owned container and bridge");
    Ok(())
}

/// Resolve a [`SpecSource`] to a spec path, load, and elaborate it.
fn elaborate(dirs: &Directories, source: &SpecSource) -> Result<(Project, PathBuf), CliError> {
    let path = spec_path(dirs, source)?;
    let loader = FsSpecLoader;
    let spec = loader.load(&path)?;
    let project = build_project(&spec, &loader, &path)?;
    Ok((project, path))
}

fn spec_path(dirs: &Directories, source: &SpecSource) -> Result<PathBuf, CliError> {
    if let Some(name) = &source.project {
        let path = dirs.project_file(name);
        if !path.exists() {
            return Err(CliError::UnknownProject(name.clone()));
        }
        return Ok(path);
    }
    if let Some(file) = &source.file {
        return Ok(file.clone());
    }
    Err(CliError::NoSpecGiven)
}

fn write_generated_config(dirs: &Directories, project: &Project) -> Result<(), CliError> {
    dirs.ensure_exist()?;
    let files = emit_project(project)?;
    for (filename, text) in files {
        let path = dirs.config_dir().join(&filename);
        std::fs::write(&path, text).map_err(|source| CliError::Write { path, source })?;
    }
    Ok(())
}

fn parse_asn_list(csv: &str) -> Result<BTreeSet<Asn>, CliError> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>().map(Asn).map_err(|_| CliError::InvalidAsList(csv.to_string())))
        .collect()
}

fn count_containers(project: &Project) -> usize {
    project
        .autonomous_systems
        .iter()
        .map(|a| a.routers.len() + a.hosts.len() + a.vpns.iter().map(|v| v.customers.len()).sum::<usize>())
        .sum()
}

fn make_orchestrator(dirs: &Directories) -> Result<Orchestrator, CliError> {
    let docker = DockerClient::connect()?;
    let fabric = Arc::new(LinuxFabric::new());
    Ok(Orchestrator::new(docker, fabric, dirs.config_dir(), dirs.links_file()))
}

/// A project to drive `resume`/`restart` with: the one named by
/// `--project`, or the sole persisted project if exactly one exists.
/// `resume`/`restart` re-derive container images and config paths from
/// the topology model (spec.md §4.5), so they need a `Project`, not just
/// the container name the operator passed on the command line.
fn resolve_project_for_lifecycle(dirs: &Directories, target: &ProjectTarget) -> Result<Project, CliError> {
    let source = SpecSource {
        project: Some(match &target.project {
            Some(name) => name.clone(),
            None => {
                let mut projects = list_projects(dirs)?;
                if projects.len() != 1 {
                    return Err(CliError::UnknownProject(
                        "pass --project <name>: more than one (or no) project is persisted".to_string(),
                    ));
                }
                projects.remove(0).0
            }
        }),
        file: None,
    };
    Ok(elaborate(dirs, &source)?.0)
}

fn list_projects(dirs: &Directories) -> Result<Vec<(String, TopologySpec)>, CliError> {
    dirs.ensure_exist()?;
    let entries = std::fs::read_dir(dirs.project_dir()).map_err(|source| CliError::ReadDir {
        path: dirs.project_dir().to_path_buf(),
        source,
    })?;

    let loader = FsSpecLoader;
    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CliError::ReadDir {
            path: dirs.project_dir().to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let spec = loader.load(&path)?;
        out.push((stem.to_string(), spec));
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

/// `command::ProjectCommand` dispatch, kept here rather than in `main.rs`
/// to match every other handler's signature (`Directories` first).
pub fn project(dirs: &Directories, action: &ProjectCommand) -> Result<(), CliError> {
    match action {
        ProjectCommand::Create { name, file } => project_create(dirs, name, file),
        ProjectCommand::List => project_list(dirs),
        ProjectCommand::Delete { name } => project_delete(dirs, name),
    }
}

#[cfg(test)]
mod test {
    use ipnet::IpNet;
    use topomate_model::{AutonomousSystem, Host};
    use topomate_types::Asn;

    use super::*;

    fn dirs() -> Directories {
        let base = std::env::temp_dir().join(format!("topomate-cli-test-{:?}", std::thread::current().id()));
        Directories::resolve(Some(base), None, None).unwrap()
    }

    #[test]
    fn parse_asn_list_accepts_comma_separated_integers() {
        let parsed = parse_asn_list("65000, 65001,65002").unwrap();
        assert_eq!(parsed, BTreeSet::from([Asn(65000), Asn(65001), Asn(65002)]));
    }

    #[test]
    fn parse_asn_list_rejects_garbage() {
        assert!(parse_asn_list("65000,not-a-number").is_err());
    }

    #[test]
    fn parse_asn_list_ignores_blank_entries() {
        let parsed = parse_asn_list("65000,,65001,").unwrap();
        assert_eq!(parsed, BTreeSet::from([Asn(65000), Asn(65001)]));
    }

    #[test]
    fn spec_path_prefers_file_over_project() {
        let source = SpecSource {
            project: None,
            file: Some(PathBuf::from("/tmp/topo.yaml")),
        };
        assert_eq!(spec_path(&dirs(), &source).unwrap(), PathBuf::from("/tmp/topo.yaml"));
    }

    #[test]
    fn spec_path_rejects_unknown_project() {
        let source = SpecSource {
            project: Some("does-not-exist".to_string()),
            file: None,
        };
        assert!(matches!(spec_path(&dirs(), &source), Err(CliError::UnknownProject(_))));
    }

    #[test]
    fn spec_path_requires_project_or_file() {
        let source = SpecSource { project: None, file: None };
        assert!(matches!(spec_path(&dirs(), &source), Err(CliError::NoSpecGiven)));
    }

    #[test]
    fn count_containers_sums_routers_hosts_and_vpn_customers() {
        let mut project = Project::new("t");
        let network: IpNet = "10.0.0.0/24".parse().unwrap();
        let mut as_ = AutonomousSystem::new(Asn(65000), network, 2);
        as_.hosts.push(Host {
            hostname: "h1".to_string(),
            image: "alpine".to_string(),
            linked_router: topomate_types::RouterId::from_one_based(1),
            link: topomate_types::LinkId(0),
        });
        project.autonomous_systems.push(as_);
        assert_eq!(count_containers(&project), 3);
    }
}
