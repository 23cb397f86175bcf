//! Manifest, collection and request builders.

use std::time::Duration;

use mint_registry::pipeline::{BatchPlanner, UploadRequest};
use mint_registry::types::{Address, CollectionSettings, ManifestCreator, ManifestItem, MintSetting};

pub const PROGRAM_ID: Address = Address::new([9u8; 32]);

pub fn creator_address(seed: u8) -> Address {
    Address::new([seed; 32])
}

pub fn manifest_with_shares(n: u32, shares: &[u8]) -> Vec<ManifestItem> {
    (0..n)
        .map(|index| ManifestItem {
            index,
            name: format!("Item #{}", index),
            uri: format!("https://arweave.net/item-{}", index),
            symbol: "ART".to_string(),
            seller_fee_basis_points: 500,
            creators: shares
                .iter()
                .enumerate()
                .map(|(i, share)| ManifestCreator {
                    address: Some(creator_address(20 + i as u8).to_base58()),
                    share: *share,
                })
                .collect(),
        })
        .collect()
}

pub fn manifest(n: u32) -> Vec<ManifestItem> {
    manifest_with_shares(n, &[100])
}

pub fn collection() -> CollectionSettings {
    CollectionSettings {
        price: 1_000_000_000,
        treasury: Address::new([1u8; 32]),
        token_mint: None,
        is_mutable: true,
        retain_authority: true,
        max_supply: 0,
        items_available: None,
        settings: vec![MintSetting::GoLive { date: 1_640_995_200 }],
    }
}

pub fn request(manifest: Vec<ManifestItem>) -> UploadRequest {
    let mut request = UploadRequest::new(manifest, collection(), PROGRAM_ID);
    request.confirm_timeout = Duration::from_millis(200);
    request
}

pub fn request_with_planner(
    manifest: Vec<ManifestItem>,
    confirmation_batch_size: usize,
    transaction_size: usize,
) -> UploadRequest {
    let mut request = request(manifest);
    request.planner =
        BatchPlanner::new(confirmation_batch_size, transaction_size).expect("valid planner");
    request
}
