//! Run the pipeline over CSV files.
//!
//! Run with:
//!   cargo run --example csv_pipeline --features io -- pings.csv shapes.txt SHAPE_ID out_dir

use std::fs::File;
use std::path::PathBuf;

use transit_tracker::io::{read_pings, read_shapes, write_assignments, write_vehicles};
use transit_tracker::{cluster_users_into_vehicles, Result, TrackingConfig};

fn run(pings: PathBuf, shapes: PathBuf, shape_id: &str, out_dir: PathBuf) -> Result<()> {
    let pings = read_pings(File::open(pings)?)?;
    let shapes = read_shapes(File::open(shapes)?)?;

    let config = TrackingConfig::default();
    let tables = cluster_users_into_vehicles(&pings, &shapes, shape_id, &config)?;

    std::fs::create_dir_all(&out_dir)?;
    write_vehicles(File::create(out_dir.join("vehicles.csv"))?, &tables.vehicles)?;
    write_assignments(File::create(out_dir.join("assignments.csv"))?, &tables.assignments)?;

    println!(
        "{} pings -> {} vehicle rows, {} assignments",
        pings.len(),
        tables.vehicles.len(),
        tables.assignments.len()
    );
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 4 {
        eprintln!("usage: csv_pipeline <pings.csv> <shapes.txt> <shape_id> <out_dir>");
        std::process::exit(2);
    }

    if let Err(e) = run(
        PathBuf::from(&args[0]),
        PathBuf::from(&args[1]),
        &args[2],
        PathBuf::from(&args[3]),
    ) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
