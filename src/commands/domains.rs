use std::path::Path;

use super::util::{load_archive, print_json};
use crate::error::Result;
use crate::filter::{domain_stats, records};

#[derive(Clone, Copy, Debug, Default)]
pub struct DomainsOptions {
    pub json: bool,
}

/// Record counts per hostname, busiest first.
pub fn run_domains(input: &Path, options: &DomainsOptions) -> Result<()> {
    let archive = load_archive(input)?;
    let stats = domain_stats(&records(&archive.har));

    if options.json {
        return print_json(&stats);
    }
    for stat in &stats {
        println!("{:>6}  {}", stat.count, stat.domain);
    }
    Ok(())
}
