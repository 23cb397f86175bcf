//! `verify`: read the registry back and compare it with the cache.

use anyhow::{bail, Result};
use clap::Parser;
use mint_registry::pipeline::{verify, VerifyOptions};
use mint_registry::types::Address;

use super::output::{format_verify, print_json, verify_json};
use super::CliContext;

#[derive(Parser, Debug)]
pub struct VerifyCmd {
    /// Registry address (default: the one recorded in the cache)
    #[arg(long)]
    registry: Option<String>,

    /// Declared collection size (default: number of cached items)
    #[arg(long)]
    items_available: Option<u64>,

    /// Mark mismatched items for re-upload
    #[arg(long)]
    requeue_mismatches: bool,
}

impl VerifyCmd {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let registry = self
            .registry
            .as_deref()
            .map(|text| Address::parse(text, "registry address"))
            .transpose()?;
        let mut reconciler = ctx.open_cache()?;
        let declared = self
            .items_available
            .unwrap_or(reconciler.state().len() as u64);
        let options = VerifyOptions {
            requeue_mismatches: self.requeue_mismatches,
        };

        let network = ctx.rpc_client();
        let outcome = verify(&mut reconciler, registry, declared, &network, options).await;

        if ctx.json {
            print_json(&verify_json(&outcome));
        } else {
            print!("{}", format_verify(&outcome));
        }

        if let Some(e) = outcome.error {
            return Err(e.into());
        }
        if !outcome.ok() {
            bail!("registry does not match the cache yet");
        }
        Ok(())
    }
}
