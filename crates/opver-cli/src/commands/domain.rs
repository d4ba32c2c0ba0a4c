use std::error::Error;

use clap::Args;
use opver_engine::{generate, generate_seeded, to_canonical_json_bytes};

#[derive(Args, Debug)]
pub struct DomainArgs {
    /// Coordinates per probe.
    #[arg(long)]
    pub dimension: usize,
    /// Requested probe count.
    #[arg(long)]
    pub count: usize,
    /// Draw seeded uniform probes instead of a grid.
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(args: &DomainArgs) -> Result<(), Box<dyn Error>> {
    let domain = match args.seed {
        Some(seed) => generate_seeded(args.dimension, args.count, seed)?,
        None => generate(args.dimension, args.count)?,
    };
    let json = to_canonical_json_bytes(&domain)?;
    println!("{}", String::from_utf8(json)?);
    Ok(())
}
