//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Mind maps on the command line: nodes, edges and graph surgery
#[derive(Parser, Debug)]
#[command(name = "mindmap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Storage root (overrides config)
    #[arg(long, global = true, env = "MINDMAP_DATA_DIR", value_hint = ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a mind map with a root node
    New {
        /// Title (default from config)
        title: Option<String>,
    },

    /// List stored mind maps, newest first
    List,

    /// Show a mind map as a tree
    Show {
        /// Mind map id
        map: String,
    },

    /// Delete a mind map
    Rm {
        /// Mind map id
        map: String,
    },

    /// Rename a mind map
    Rename {
        /// Mind map id
        map: String,
        /// New title
        title: String,
    },

    /// Manage nodes
    Node {
        #[command(subcommand)]
        command: NodeCommands,
    },

    /// Manage edges
    Edge {
        #[command(subcommand)]
        command: EdgeCommands,
    },

    /// Find nodes by content (case-insensitive)
    Search {
        /// Mind map id
        map: String,
        /// Search term
        term: String,
    },

    /// Show statistics
    Stats {
        /// Mind map id
        map: String,
    },

    /// Export a mind map to stdout
    Export {
        /// Mind map id
        map: String,
        /// json | text
        #[arg(short, long, default_value = "json")]
        format: String,
    },

    /// Import a mind map from a file
    Import {
        /// Input file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// json | text (default: from file extension)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum NodeCommands {
    /// Add a node, optionally linked from a parent
    Add {
        /// Mind map id
        map: String,
        /// Node content
        content: String,
        /// Parent node id
        #[arg(short, long)]
        parent: Option<String>,
        #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
        x: f64,
        #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
        y: f64,
    },

    /// Edit content, position or size
    Edit {
        /// Mind map id
        map: String,
        /// Node id
        node: String,
        #[arg(short, long)]
        content: Option<String>,
        #[arg(short, long, allow_hyphen_values = true)]
        x: Option<f64>,
        #[arg(short, long, allow_hyphen_values = true)]
        y: Option<f64>,
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
    },

    /// Delete nodes, reconnecting their neighbours
    Rm {
        /// Mind map id
        map: String,
        /// Node ids
        #[arg(required = true, num_args = 1..)]
        nodes: Vec<String>,
        /// Only drop touching edges, no reconnection
        #[arg(long)]
        simple: bool,
    },

    /// Create a node connected from a source handle
    Spawn {
        /// Mind map id
        map: String,
        /// Source node id
        node: String,
        /// Source handle id (default: the node's outgoing handle)
        #[arg(long)]
        handle: Option<String>,
        /// Node content (default from config)
        #[arg(short, long)]
        content: Option<String>,
        #[arg(short, long, allow_hyphen_values = true)]
        x: f64,
        #[arg(short, long, allow_hyphen_values = true)]
        y: f64,
    },

    /// Move a node and auto-connect it to the closest neighbour in reach
    Drop {
        /// Mind map id
        map: String,
        /// Node id
        node: String,
        #[arg(short, long, allow_hyphen_values = true)]
        x: f64,
        #[arg(short, long, allow_hyphen_values = true)]
        y: f64,
    },
}

#[derive(Subcommand, Debug)]
pub enum EdgeCommands {
    /// Connect two handles (order of source/target is normalized)
    Connect {
        /// Mind map id
        map: String,
        /// From node id
        from_node: String,
        /// From handle id
        from_handle: String,
        /// To node id
        to_node: String,
        /// To handle id
        to_handle: String,
        /// Edge type
        #[arg(short = 't', long = "type")]
        edge_type: Option<String>,
    },

    /// Connect two nodes without handles
    Link {
        /// Mind map id
        map: String,
        source: String,
        target: String,
        /// Edge type
        #[arg(short = 't', long = "type")]
        edge_type: Option<String>,
    },

    /// Remove the connection between two nodes
    Unlink {
        /// Mind map id
        map: String,
        a: String,
        b: String,
    },

    /// Change style or type of an edge
    Style {
        /// Mind map id
        map: String,
        /// Edge id
        edge: String,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        opacity: Option<f64>,
        /// Edge type
        #[arg(short = 't', long = "type")]
        edge_type: Option<String>,
    },

    /// Move an edge to new endpoints
    Reconnect {
        /// Mind map id
        map: String,
        /// Edge id
        edge: String,
        source: String,
        target: String,
        #[arg(long)]
        source_handle: Option<String>,
        #[arg(long)]
        target_handle: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
    /// Print a config template
    Template,
}
