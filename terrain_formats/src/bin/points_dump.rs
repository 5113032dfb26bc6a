use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use terrain_formats::{PointColumns, PointTable};

#[derive(Parser, Debug)]
#[command(about = "Print the rows of a survey point table", version)]
struct Args {
    /// CSV file with survey coordinates
    path: PathBuf,

    /// Column holding the easting (survey feet)
    #[arg(long, default_value = "x")]
    x_column: String,

    /// Column holding the northing (survey feet)
    #[arg(long, default_value = "y")]
    y_column: String,

    /// Optional column identifying each row's detail content
    #[arg(long)]
    key_column: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let columns = PointColumns {
        x: args.x_column,
        y: args.y_column,
        key: args.key_column,
    };
    let table = PointTable::open(&args.path, &columns)?;
    println!(
        "{} rows ({} skipped) in {}",
        table.len(),
        table.skipped.len(),
        args.path.display()
    );
    for row in &table.rows {
        println!(
            "{line:>6} {x:>16.3} {y:>16.3} {key}",
            line = row.line,
            x = row.x,
            y = row.y,
            key = row.key.as_deref().unwrap_or("-")
        );
    }
    for skipped in &table.skipped {
        println!("  skipped line {}: {}", skipped.line, skipped.reason);
    }
    Ok(())
}
