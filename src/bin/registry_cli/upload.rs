//! `upload`: initialize once, then write pending items in batches.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use mint_registry::config::{confirm_timeout, load_manifest, CollectionConfigFile};
use mint_registry::pipeline::instructions::DEFAULT_PROGRAM_ID;
use mint_registry::pipeline::{upload, UploadRequest};
use mint_registry::transport::Wallet;
use mint_registry::types::Address;
use tracing::info;

use super::output::{format_upload, print_json, upload_json};
use super::CliContext;

#[derive(Parser, Debug)]
pub struct UploadCmd {
    /// Manifest JSON: array of {index, name, uri, symbol, seller_fee_basis_points, creators}
    #[arg(long)]
    manifest: PathBuf,

    /// Collection config JSON (price, treasury, settings, batch sizes)
    #[arg(long)]
    config: PathBuf,

    /// Registry program id
    #[arg(long, default_value = DEFAULT_PROGRAM_ID)]
    program_id: String,
}

impl UploadCmd {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let manifest = load_manifest(&self.manifest)?;
        let config = CollectionConfigFile::load(&self.config)?;
        let program_id = Address::parse(&self.program_id, "program id")?;

        let mut request = UploadRequest::new(manifest, config.collection.clone(), program_id);
        request.planner = config.planner()?;
        request.confirm_timeout = confirm_timeout();

        let mut reconciler = ctx.open_cache()?;
        let network = ctx.rpc_client();
        let wallet = ctx.wallet()?;
        info!(
            cache = %ctx.cache_path().display(),
            items = request.manifest.len(),
            wallet = %wallet.address(),
            "starting upload"
        );

        let outcome = upload(&request, &mut reconciler, &wallet, &network).await;

        if ctx.json {
            print_json(&upload_json(&outcome));
        } else {
            print!("{}", format_upload(&outcome));
        }

        if let Some(e) = outcome.error {
            return Err(e.into());
        }
        if !outcome.successful {
            bail!("some transactions failed; re-run upload to retry them");
        }
        Ok(())
    }
}
