//! Resumable entry points: `upload` and `verify`.
//!
//! Both take the caller's [`CacheReconciler`] and always hand back a snapshot
//! of the cache, including when they fail, so a re-run continues where the
//! previous one stopped.

use std::time::Duration;

use mint_cache::{CacheReconciler, CacheState};
use mint_registry_types::manifest::check_contiguous;
use mint_registry_types::{Address, CollectionSettings, ManifestItem, RegistryConfig};
use mint_transport::{NetworkClient, Wallet};
use tracing::{error, info};

use crate::error::PipelineError;
use crate::initializer::{check_config, InitializedRegistry, RegistryInitializer};
use crate::orchestrator::{UploadOrchestrator, UploadReport};
use crate::planner::BatchPlanner;
use crate::verifier::{check_counts, VerificationReport, Verifier, VerifyOptions};

/// Default wait for a single transaction confirmation.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub manifest: Vec<ManifestItem>,
    pub collection: CollectionSettings,
    pub program_id: Address,
    pub planner: BatchPlanner,
    pub confirm_timeout: Duration,
}

impl UploadRequest {
    pub fn new(manifest: Vec<ManifestItem>, collection: CollectionSettings, program_id: Address) -> Self {
        Self {
            manifest,
            collection,
            program_id,
            planner: BatchPlanner::default(),
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
        }
    }
}

#[derive(Debug)]
pub struct UploadOutcome {
    pub cache: CacheState,
    pub successful: bool,
    /// Set when this run created the registry.
    pub initialized: Option<InitializedRegistry>,
    /// Absent when the run stopped before uploading or the registry is hidden.
    pub report: Option<UploadReport>,
    pub error: Option<PipelineError>,
}

#[derive(Debug)]
pub struct VerifyOutcome {
    pub cache: CacheState,
    pub report: Option<VerificationReport>,
    pub error: Option<PipelineError>,
}

impl VerifyOutcome {
    pub fn ok(&self) -> bool {
        self.error.is_none()
            && self
                .report
                .as_ref()
                .map(|report| report.all_matched)
                .unwrap_or(false)
    }
}

/// Check the manifest and derive the registry config without touching the cache or network.
pub fn prepare_config(request: &UploadRequest) -> Result<RegistryConfig, PipelineError> {
    if request.manifest.is_empty() {
        return Err(PipelineError::EmptyManifest);
    }
    check_contiguous(&request.manifest).map_err(PipelineError::invalid_config)?;
    let config = RegistryConfig::from_manifest(&request.manifest, &request.collection)
        .map_err(PipelineError::invalid_config)?;
    check_config(&config)?;
    if request.manifest.len() as u64 > config.items_available {
        return Err(PipelineError::InvalidConfig(format!(
            "manifest has {} items but the registry holds {}",
            request.manifest.len(),
            config.items_available
        )));
    }
    Ok(config)
}

/// Initialize the registry if needed, then upload every pending item.
pub async fn upload(
    request: &UploadRequest,
    reconciler: &mut CacheReconciler,
    wallet: &dyn Wallet,
    network: &dyn NetworkClient,
) -> UploadOutcome {
    let mut initialized = None;
    let result = run_upload(request, reconciler, wallet, network, &mut initialized).await;
    let (report, error) = match result {
        Ok(report) => (report, None),
        Err(e) => {
            error!(error = %e, "upload stopped");
            (None, Some(e))
        }
    };
    let successful = error.is_none() && report.as_ref().map(|r| r.successful).unwrap_or(true);
    UploadOutcome {
        cache: reconciler.load(),
        successful,
        initialized,
        report,
        error,
    }
}

async fn run_upload(
    request: &UploadRequest,
    reconciler: &mut CacheReconciler,
    wallet: &dyn Wallet,
    network: &dyn NetworkClient,
    initialized: &mut Option<InitializedRegistry>,
) -> Result<Option<UploadReport>, PipelineError> {
    let config = prepare_config(request)?;

    let summary = reconciler
        .register_manifest(&request.manifest)
        .map_err(PipelineError::Cache)?;
    info!(
        items = request.manifest.len(),
        inserted = summary.inserted,
        changed = summary.changed,
        "manifest registered"
    );

    let registry = match reconciler.state().registry() {
        Some(registry) => {
            info!(registry = %registry, "using registry from cache");
            registry
        }
        None => {
            let created = RegistryInitializer::new(request.program_id, request.confirm_timeout)
                .initialize(&config, wallet, network)
                .await?;
            reconciler
                .set_program(created.address, &created.collection_id)
                .map_err(PipelineError::Cache)?;
            let address = created.address;
            *initialized = Some(created);
            address
        }
    };

    if config.is_hidden() {
        info!(registry = %registry, "hidden settings in use, no item lines to upload");
        return Ok(None);
    }

    let plan = request.planner.plan(request.manifest.len() as u32);
    let report = UploadOrchestrator::new(request.program_id, registry, request.confirm_timeout)
        .upload(&plan, reconciler, wallet, network)
        .await?;
    Ok(Some(report))
}

/// Verify the registry against the cache. `registry` overrides the cached address.
pub async fn verify(
    reconciler: &mut CacheReconciler,
    registry: Option<Address>,
    declared_items_available: u64,
    network: &dyn NetworkClient,
    options: VerifyOptions,
) -> VerifyOutcome {
    let Some(registry) = registry.or_else(|| reconciler.state().registry()) else {
        return VerifyOutcome {
            cache: reconciler.load(),
            report: None,
            error: Some(PipelineError::RegistryNotInitialized),
        };
    };

    let verifier = Verifier::new(options);
    let (report, error) = match verifier.verify_items(registry, reconciler, network).await {
        Ok(report) => {
            let error = check_counts(&report.header, declared_items_available).err();
            (Some(report), error)
        }
        Err(e) => (None, Some(e)),
    };
    if let Some(e) = &error {
        error!(registry = %registry, error = %e, "verification failed");
    }
    VerifyOutcome {
        cache: reconciler.load(),
        report,
        error,
    }
}
