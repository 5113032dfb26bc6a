use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use terrain_formats::TerrainNode;

#[derive(Parser, Debug)]
#[command(about = "Summarise a terrain scene document", version)]
struct Args {
    /// Terrain JSON document
    path: PathBuf,

    /// Vertical normal component above which a face counts as a top face
    #[arg(long, default_value_t = 0.5)]
    top_threshold: f32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let terrain = TerrainNode::load(&args.path)?;
    println!(
        "{} ({} nodes) from {}",
        terrain.name,
        terrain.node_count(),
        args.path.display()
    );
    if let Some(bounds) = terrain.bounds() {
        println!(
            "  bounds min ({:.2}, {:.2}, {:.2}) max ({:.2}, {:.2}, {:.2})",
            bounds.min[0], bounds.min[1], bounds.min[2], bounds.max[0], bounds.max[1], bounds.max[2]
        );
    }
    print_node(&terrain, args.top_threshold, 1);
    Ok(())
}

fn print_node(node: &TerrainNode, threshold: f32, depth: usize) {
    let split = node.classify_faces(threshold);
    println!(
        "{indent}{name:<32} top {top:>8} side {side:>8}",
        indent = "  ".repeat(depth),
        name = node.name,
        top = split.top.len(),
        side = split.side.len()
    );
    for child in &node.children {
        print_node(child, threshold, depth + 1);
    }
}
