//! Manifest items produced upstream (one per collection entry).

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestCreator {
    #[serde(default)]
    pub address: Option<String>,
    pub share: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestItem {
    pub index: u32,
    pub name: String,
    /// Metadata link for the item.
    pub uri: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub seller_fee_basis_points: u16,
    #[serde(default)]
    pub creators: Vec<ManifestCreator>,
}

/// Indices must be exactly `0..len` in order.
pub fn check_contiguous(items: &[ManifestItem]) -> Result<()> {
    for (position, item) in items.iter().enumerate() {
        if item.index as usize != position {
            bail!(
                "manifest index {} found at position {}; indices must be contiguous from 0",
                item.index,
                position
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(index: u32) -> ManifestItem {
        ManifestItem {
            index,
            name: format!("#{}", index),
            uri: format!("https://x/{}.json", index),
            symbol: String::new(),
            seller_fee_basis_points: 0,
            creators: Vec::new(),
        }
    }

    #[test]
    fn test_contiguous_indices() {
        assert!(check_contiguous(&[item(0), item(1), item(2)]).is_ok());
        assert!(check_contiguous(&[item(0), item(2)]).is_err());
        assert!(check_contiguous(&[item(0), item(0)]).is_err());
    }
}
