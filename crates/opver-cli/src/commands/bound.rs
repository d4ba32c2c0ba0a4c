use std::error::Error;

use clap::Args;
use opver_engine::coincidence_bound;

use crate::render::render_bound;

#[derive(Args, Debug)]
pub struct BoundArgs {
    /// Complexity estimate of the reference, in bits.
    #[arg(long)]
    pub reference_bits: u64,
    /// Complexity estimate of the candidate, in bits.
    #[arg(long)]
    pub candidate_bits: u64,
    /// Independent trials to compound.
    #[arg(long, default_value_t = 10)]
    pub trials: u32,
}

pub fn run(args: &BoundArgs) -> Result<(), Box<dyn Error>> {
    let bound = coincidence_bound(args.reference_bits, args.candidate_bits, args.trials)?;
    print!("{}", render_bound(&bound)?);
    Ok(())
}
