//! `show`: print the cache without contacting the network.

use anyhow::{bail, Result};
use clap::Parser;

use super::output::{cache_summary_json, format_cache, print_json};
use super::CliContext;

#[derive(Parser, Debug)]
pub struct ShowCmd {}

impl ShowCmd {
    pub fn execute(&self, ctx: &CliContext) -> Result<()> {
        let path = ctx.cache_path();
        if !path.exists() {
            bail!("no cache at {}", path.display());
        }
        let reconciler = ctx.open_cache()?;
        if ctx.json {
            print_json(&cache_summary_json(reconciler.state()));
        } else {
            println!("Cache: {}", path.display());
            print!("{}", format_cache(reconciler.state()));
        }
        Ok(())
    }
}
