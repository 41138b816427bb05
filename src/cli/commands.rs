//! Command dispatch: maps parsed arguments onto mind map use cases.

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{DeleteMode, ExchangeFormat, MindMapService};
use crate::application::surgery::{ConnectionRequest, Reconnection};
use crate::cli::args::{Cli, Commands, ConfigCommands, EdgeCommands, NodeCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    default_source_handle, DomainError, EdgeId, EdgeStyleUpdate, EdgeUpdate, EntityKind,
    HandleId, MindMapId, NodeId, NodeUpdate, OutlineTree, Position, PositionUpdate,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `mindmap --help`".to_string(),
        ));
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = load_settings(cli)?;
    if let Commands::Config { command } = command {
        return _config(command, &settings);
    }

    let container = ServiceContainer::new(settings);
    let svc = &container.mindmaps;
    match command {
        Commands::New { title } => _new(svc, title.as_deref()),
        Commands::List => _list(svc),
        Commands::Show { map } => _show(svc, map),
        Commands::Rm { map } => {
            svc.delete(&MindMapId::new(map.as_str()))?;
            output::success(&format!("Deleted {map}"));
            Ok(())
        }
        Commands::Rename { map, title } => {
            let renamed = svc.rename(&MindMapId::new(map.as_str()), title)?;
            output::success(&format!("Renamed {} to '{}'", renamed.id(), renamed.title()));
            Ok(())
        }
        Commands::Node { command } => _node(svc, command),
        Commands::Edge { command } => _edge(svc, command),
        Commands::Search { map, term } => _search(svc, map, term),
        Commands::Stats { map } => {
            let stats = svc.statistics(&MindMapId::new(map.as_str()))?;
            output::statistics(&stats);
            Ok(())
        }
        Commands::Export { map, format } => {
            let format: ExchangeFormat = format.parse()?;
            output::info(&svc.export(&MindMapId::new(map.as_str()), format)?);
            Ok(())
        }
        Commands::Import { file, format } => _import(&container, file, format.as_deref()),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let cwd = std::env::current_dir().map_err(|e| InfraError::io("read current directory", e))?;
    let mut settings = Settings::load(Some(&cwd))?;
    if let Some(dir) = &cli.data_dir {
        settings.override_data_dir(dir);
    }
    debug!("data_dir: {}", settings.data_dir.display());
    Ok(settings)
}

fn _config(command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no config directory on this platform"),
            }
            let cwd =
                std::env::current_dir().map_err(|e| InfraError::io("read current directory", e))?;
            output::action("local", &local_config_path(&cwd).display());
            output::action("maps", &settings.maps_dir().display());
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}

#[instrument(skip(svc))]
fn _new(svc: &MindMapService, title: Option<&str>) -> CliResult<()> {
    let map = svc.create(title)?;
    output::success(&format!("Created '{}'", map.title()));
    output::detail(map.id());
    Ok(())
}

fn _list(svc: &MindMapService) -> CliResult<()> {
    output::summaries(&svc.list()?);
    Ok(())
}

fn _show(svc: &MindMapService, map: &str) -> CliResult<()> {
    let map = svc.load(&MindMapId::new(map))?;
    let tree = OutlineTree::from_mindmap(&map);
    output::info(&tree.to_termtree(map.title()));
    Ok(())
}

#[instrument(skip(svc))]
fn _search(svc: &MindMapService, map: &str, term: &str) -> CliResult<()> {
    let hits = svc.search(&MindMapId::new(map), term)?;
    if hits.is_empty() {
        output::detail("(no matches)");
    }
    for (id, content) in hits {
        output::action(id.as_str(), &content);
    }
    Ok(())
}

#[instrument(skip(container))]
fn _import(container: &ServiceContainer, file: &Path, format: Option<&str>) -> CliResult<()> {
    let format: ExchangeFormat = match format {
        Some(f) => f.parse()?,
        None => file
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .parse()?,
    };
    let data = container
        .fs
        .read_to_string(file)
        .map_err(|e| InfraError::io(format!("read {}", file.display()), e))?;
    let map = container.mindmaps.import(&data, format)?;
    output::success(&format!(
        "Imported '{}' ({} nodes, {} edges)",
        map.title(),
        map.node_count(),
        map.edge_count()
    ));
    output::detail(map.id());
    Ok(())
}

fn _node(svc: &MindMapService, command: &NodeCommands) -> CliResult<()> {
    match command {
        NodeCommands::Add {
            map,
            content,
            parent,
            x,
            y,
        } => {
            let parent = parent.as_deref().map(NodeId::new);
            let (node_id, _) = svc.add_node(
                &MindMapId::new(map.as_str()),
                content,
                Position::new(*x, *y),
                parent.as_ref(),
            )?;
            output::success(&format!("Added node {node_id}"));
        }
        NodeCommands::Edit {
            map,
            node,
            content,
            x,
            y,
            width,
            height,
        } => {
            let position = (x.is_some() || y.is_some()).then_some(PositionUpdate { x: *x, y: *y });
            let update = NodeUpdate {
                content: content.clone(),
                position,
                height: *height,
                width: *width,
                ..Default::default()
            };
            svc.update_node(&MindMapId::new(map.as_str()), &NodeId::new(node.as_str()), update)?;
            output::success(&format!("Updated node {node}"));
        }
        NodeCommands::Rm { map, nodes, simple } => {
            let ids: Vec<NodeId> = nodes.iter().map(|n| NodeId::new(n.as_str())).collect();
            let mode = if *simple {
                DeleteMode::Simple
            } else {
                DeleteMode::Smart
            };
            let (report, _) = svc.delete_nodes(&MindMapId::new(map.as_str()), &ids, mode)?;
            output::delete_report(&report);
        }
        NodeCommands::Spawn {
            map,
            node,
            handle,
            content,
            x,
            y,
        } => {
            let map_id = MindMapId::new(map.as_str());
            let source = NodeId::new(node.as_str());
            let handle = match handle {
                Some(h) => HandleId::new(h.as_str()),
                None => {
                    let loaded = svc.load(&map_id)?;
                    let node = loaded
                        .get_node(&source)
                        .ok_or_else(|| DomainError::not_found(EntityKind::Node, &source))?;
                    default_source_handle(node)
                }
            };
            let (outcome, _) = svc.spawn_node(
                &map_id,
                &source,
                &handle,
                Position::new(*x, *y),
                content.as_deref(),
            )?;
            output::success(&format!("Spawned node {}", outcome.node_id));
            output::diff_add(&format!("edge {}", outcome.edge_id));
        }
        NodeCommands::Drop { map, node, x, y } => {
            let (outcome, _) = svc.drop_node(
                &MindMapId::new(map.as_str()),
                &NodeId::new(node.as_str()),
                Position::new(*x, *y),
            )?;
            output::success(&format!(
                "Moved {} to ({}, {})",
                outcome.node_id, outcome.position.x, outcome.position.y
            ));
            match outcome.connected {
                Some(edge) => output::diff_add(&format!("edge {edge}")),
                None => output::detail("no node in reach"),
            }
        }
    }
    Ok(())
}

fn _edge(svc: &MindMapService, command: &EdgeCommands) -> CliResult<()> {
    match command {
        EdgeCommands::Connect {
            map,
            from_node,
            from_handle,
            to_node,
            to_handle,
            edge_type,
        } => {
            let request = ConnectionRequest {
                from_node: NodeId::new(from_node.as_str()),
                from_handle: HandleId::new(from_handle.as_str()),
                to_node: NodeId::new(to_node.as_str()),
                to_handle: HandleId::new(to_handle.as_str()),
                edge_type: edge_type.clone(),
            };
            let (edge_id, _) = svc.connect(&MindMapId::new(map.as_str()), request)?;
            output::success(&format!("Connected, edge {edge_id}"));
        }
        EdgeCommands::Link {
            map,
            source,
            target,
            edge_type,
        } => {
            let (edge_id, _) = svc.connect_nodes(
                &MindMapId::new(map.as_str()),
                &NodeId::new(source.as_str()),
                &NodeId::new(target.as_str()),
                edge_type.as_deref(),
            )?;
            output::success(&format!("Linked, edge {edge_id}"));
        }
        EdgeCommands::Unlink { map, a, b } => {
            let (edge_id, _) = svc.disconnect_nodes(
                &MindMapId::new(map.as_str()),
                &NodeId::new(a.as_str()),
                &NodeId::new(b.as_str()),
            )?;
            output::diff_remove(&format!("edge {edge_id}"));
        }
        EdgeCommands::Style {
            map,
            edge,
            color,
            width,
            opacity,
            edge_type,
        } => {
            let style = (color.is_some() || width.is_some() || opacity.is_some()).then(|| {
                EdgeStyleUpdate {
                    color: color.clone(),
                    width: *width,
                    opacity: *opacity,
                }
            });
            if style.is_none() && edge_type.is_none() {
                return Err(CliError::InvalidArgs(
                    "nothing to change, give --color, --width, --opacity or --type".to_string(),
                ));
            }
            let update = EdgeUpdate {
                style,
                edge_type: edge_type.clone(),
                ..Default::default()
            };
            svc.update_edge(&MindMapId::new(map.as_str()), &EdgeId::new(edge.as_str()), update)?;
            output::success(&format!("Updated edge {edge}"));
        }
        EdgeCommands::Reconnect {
            map,
            edge,
            source,
            target,
            source_handle,
            target_handle,
        } => {
            let to = Reconnection {
                source: NodeId::new(source.as_str()),
                target: NodeId::new(target.as_str()),
                source_handle: source_handle.as_deref().map(HandleId::new),
                target_handle: target_handle.as_deref().map(HandleId::new),
            };
            let (edge_id, _) =
                svc.reconnect_edge(&MindMapId::new(map.as_str()), &EdgeId::new(edge.as_str()), to)?;
            output::diff_remove(&format!("edge {edge}"));
            output::diff_add(&format!("edge {edge_id}"));
        }
    }
    Ok(())
}
