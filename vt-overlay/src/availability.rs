//! Optional manifest that answers "is this tile worth fetching at all" before a request ever
//! reaches the transport (§4.10).

use std::collections::HashMap;

use async_trait::async_trait;

use crate::tile_key::TileKey;

/// One zoom level's `x → [[yStart, yEnd], …]` availability table.
pub type XRanges = HashMap<i64, Vec<(i64, i64)>>;

/// A `{ z → { x → [[yStart, yEnd], …] } }` table describing which tiles actually exist.
#[derive(Debug, Clone, Default)]
pub struct TileAvailabilityManifest {
    zooms: HashMap<u32, XRanges>,
}

impl TileAvailabilityManifest {
    /// Builds a manifest from an explicit `{z: {x: [(yStart, yEnd), ..]}}` table.
    pub fn new(zooms: HashMap<u32, XRanges>) -> Self {
        Self { zooms }
    }

    /// True iff `key.z` exists, `key.x` exists under it, and `key.y` falls within one of the
    /// listed closed intervals.
    pub fn contains(&self, key: TileKey) -> bool {
        let Some(x_ranges) = self.zooms.get(&key.z) else {
            return false;
        };
        let Some(ranges) = x_ranges.get(&key.x) else {
            return false;
        };
        ranges.iter().any(|&(start, end)| key.y >= start && key.y <= end)
    }
}

/// Gates tile fetches on an optional [`TileAvailabilityManifest`] (§4.10). With no manifest
/// loaded, every tile is considered available.
#[derive(Default)]
pub struct TileAvailabilityOracle {
    manifest: Option<TileAvailabilityManifest>,
}

impl TileAvailabilityOracle {
    /// Creates an oracle with no manifest loaded (always available).
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs or clears the manifest, e.g. for `setTileAvailabilityManifest`/`refreshManifest`.
    pub fn set_manifest(&mut self, manifest: Option<TileAvailabilityManifest>) {
        self.manifest = manifest;
    }

    /// True if `key` should be fetched.
    pub fn is_available(&self, key: TileKey) -> bool {
        match &self.manifest {
            None => true,
            Some(manifest) => manifest.contains(key),
        }
    }
}

/// An async source for a [`TileAvailabilityManifest`], used by `refreshManifest` (§6) to refetch
/// the manifest without the host having to re-supply it inline.
#[async_trait]
pub trait ManifestProvider: Send + Sync {
    /// Fetches the current manifest.
    async fn fetch(&self) -> TileAvailabilityManifest;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Always resolves to a pre-built manifest.
    pub struct FakeManifestProvider {
        pub manifest: TileAvailabilityManifest,
    }

    #[async_trait]
    impl ManifestProvider for FakeManifestProvider {
        async fn fetch(&self) -> TileAvailabilityManifest {
            self.manifest.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_with(z: u32, x: i64, ranges: Vec<(i64, i64)>) -> TileAvailabilityManifest {
        let mut x_ranges = HashMap::new();
        x_ranges.insert(x, ranges);
        let mut zooms = HashMap::new();
        zooms.insert(z, x_ranges);
        TileAvailabilityManifest::new(zooms)
    }

    #[test]
    fn absent_manifest_accepts_everything() {
        let oracle = TileAvailabilityOracle::new();
        assert!(oracle.is_available(TileKey::new(12, 999, 999)));
    }

    #[test]
    fn a_y_one_past_the_largest_range_end_is_rejected() {
        let mut oracle = TileAvailabilityOracle::new();
        oracle.set_manifest(Some(manifest_with(5, 3, vec![(10, 20)])));

        assert!(oracle.is_available(TileKey::new(5, 3, 20)));
        assert!(!oracle.is_available(TileKey::new(5, 3, 21)));
    }

    #[test]
    fn unknown_zoom_or_column_is_rejected() {
        let oracle_with = {
            let mut o = TileAvailabilityOracle::new();
            o.set_manifest(Some(manifest_with(5, 3, vec![(10, 20)])));
            o
        };
        assert!(!oracle_with.is_available(TileKey::new(6, 3, 15)));
        assert!(!oracle_with.is_available(TileKey::new(5, 4, 15)));
    }
}
