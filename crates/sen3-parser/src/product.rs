//! Product directory discovery and channel metadata.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::{Sen3Error, Sen3Result};

/// One geophysical channel of an OLCI Level-2 water product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    /// NetCDF variable name, e.g. `CHL_NN`.
    pub variable: &'static str,
    /// Dataset file inside the product directory.
    pub dataset: &'static str,
    pub description: &'static str,
}

/// Channels of the OL_2_WFR product this crate knows how to read.
pub const OLCI_CHANNELS: &[Channel] = &[
    Channel {
        variable: "CHL_NN",
        dataset: "chl_nn.nc",
        description: "Chlorophyll-a concentration, neural network",
    },
    Channel {
        variable: "CHL_OC4ME",
        dataset: "chl_oc4me.nc",
        description: "Chlorophyll-a concentration, OC4Me algorithm",
    },
    Channel {
        variable: "TSM_NN",
        dataset: "tsm_nn.nc",
        description: "Total suspended matter, neural network",
    },
];

/// Look up a channel by variable name, case-insensitively.
pub fn channel_by_name(name: &str) -> Sen3Result<&'static Channel> {
    OLCI_CHANNELS
        .iter()
        .find(|c| c.variable.eq_ignore_ascii_case(name))
        .ok_or_else(|| Sen3Error::UnknownChannel(name.to_string()))
}

/// An unpacked `.SEN3` product directory.
#[derive(Debug, Clone)]
pub struct Sen3Product {
    root: PathBuf,
    name: String,
}

impl Sen3Product {
    /// Open an existing product directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Sen3Result<Self> {
        let root = path.as_ref().to_path_buf();
        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        if !root.is_dir() || !name.ends_with(".SEN3") {
            return Err(Sen3Error::NotAProduct(root.display().to_string()));
        }

        Ok(Self { root, name })
    }

    /// Find every `.SEN3` product directory under `dir`, sorted by name.
    ///
    /// Descends past the top level because products are commonly unpacked
    /// into per-day subdirectories.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Sen3Result<Vec<Self>> {
        let mut products = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.map_err(|e| Sen3Error::InvalidFormat(e.to_string()))?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let is_product = entry
                .file_name()
                .to_str()
                .map(|n| n.ends_with(".SEN3"))
                .unwrap_or(false);
            if is_product {
                products.push(Self::open(entry.path())?);
            }
        }

        products.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = products.len(), "Discovered products");
        Ok(products)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a dataset file inside the product directory.
    pub fn dataset_path(&self, dataset: &str) -> PathBuf {
        self.root.join(dataset)
    }
}

/// A channel grid with scaling applied. Fill pixels are NaN.
#[derive(Debug, Clone)]
pub struct ChannelGrid {
    pub variable: String,
    /// Unit string from the dataset, when the variable declares one.
    pub units: Option<String>,
    pub rows: usize,
    pub columns: usize,
    /// Row-major values, `rows * columns` long.
    pub values: Vec<f32>,
}

impl ChannelGrid {
    /// Summary statistics over the valid (non-fill) pixels.
    pub fn stats(&self) -> GridStats {
        let mut valid: usize = 0;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum: f64 = 0.0;

        for &v in &self.values {
            if v.is_nan() {
                continue;
            }
            valid += 1;
            min = min.min(v);
            max = max.max(v);
            sum += v as f64;
        }

        if valid == 0 {
            return GridStats {
                total: self.values.len(),
                valid: 0,
                min: None,
                max: None,
                mean: None,
            };
        }

        GridStats {
            total: self.values.len(),
            valid,
            min: Some(min),
            max: Some(max),
            mean: Some((sum / valid as f64) as f32),
        }
    }
}

/// Per-channel summary statistics.
#[derive(Debug, Clone, Serialize)]
pub struct GridStats {
    pub total: usize,
    pub valid: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f32>,
}

/// Reads channel grids out of a product.
///
/// The default implementation shells out to `ncdump`; tests and callers
/// with the native NetCDF stack available can substitute their own.
pub trait GridReader {
    fn read_channel(&self, product: &Sen3Product, channel: &Channel) -> Sen3Result<ChannelGrid>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_channel_lookup_is_case_insensitive() {
        let channel = channel_by_name("chl_nn").unwrap();
        assert_eq!(channel.variable, "CHL_NN");
        assert_eq!(channel.dataset, "chl_nn.nc");

        let channel = channel_by_name("TSM_NN").unwrap();
        assert_eq!(channel.dataset, "tsm_nn.nc");
    }

    #[test]
    fn test_channel_lookup_unknown() {
        let err = channel_by_name("SST").unwrap_err();
        assert!(matches!(err, Sen3Error::UnknownChannel(_)));
    }

    #[test]
    fn test_open_rejects_plain_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = Sen3Product::open(dir.path()).unwrap_err();
        assert!(matches!(err, Sen3Error::NotAProduct(_)));
    }

    #[test]
    fn test_open_product_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir
            .path()
            .join("S3A_OL_2_WFR____20220701T000000_x.SEN3");
        fs::create_dir(&root).unwrap();

        let product = Sen3Product::open(&root).unwrap();
        assert_eq!(product.name(), "S3A_OL_2_WFR____20220701T000000_x.SEN3");
        assert_eq!(product.dataset_path("chl_nn.nc"), root.join("chl_nn.nc"));
    }

    #[test]
    fn test_discover_finds_nested_products_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("2022/07/02/B_product.SEN3")).unwrap();
        fs::create_dir_all(dir.path().join("2022/07/01/A_product.SEN3")).unwrap();
        fs::create_dir_all(dir.path().join("2022/07/01/not_a_product")).unwrap();

        let products = Sen3Product::discover(dir.path()).unwrap();
        let names: Vec<&str> = products.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["A_product.SEN3", "B_product.SEN3"]);
    }

    #[test]
    fn test_stats_skip_fill_pixels() {
        let grid = ChannelGrid {
            variable: "CHL_NN".to_string(),
            units: Some("lg(re mg.m-3)".to_string()),
            rows: 2,
            columns: 3,
            values: vec![1.0, 2.0, f32::NAN, 3.0, f32::NAN, 6.0],
        };

        let stats = grid.stats();
        assert_eq!(stats.total, 6);
        assert_eq!(stats.valid, 4);
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(6.0));
        assert_eq!(stats.mean, Some(3.0));
    }

    #[test]
    fn test_stats_all_fill() {
        let grid = ChannelGrid {
            variable: "CHL_NN".to_string(),
            units: None,
            rows: 1,
            columns: 2,
            values: vec![f32::NAN, f32::NAN],
        };

        let stats = grid.stats();
        assert_eq!(stats.valid, 0);
        assert!(stats.min.is_none());
        assert!(stats.mean.is_none());

        // All-fill stats must stay serializable.
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"valid\":0"));
        assert!(!json.contains("min"));
    }
}
