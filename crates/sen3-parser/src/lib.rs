//! Reader for Sentinel-3 OLCI Level-2 water products (`.SEN3` directories).
//!
//! An OL_2_WFR product unpacks to a directory holding one small NetCDF
//! dataset per geophysical channel plus coordinate and flag datasets.
//! This crate locates product directories, maps channel names to their
//! datasets, and reads channel grids with scale, offset, and fill-value
//! handling applied.
//!
//! # Implementation Notes
//!
//! Grids are read through the `ncdump` command-line tool, so no NetCDF or
//! HDF5 system libraries are required. Reading is behind the
//! [`GridReader`] trait; callers that want the native `netcdf` crate can
//! supply their own implementation.

use thiserror::Error;

/// Result type for product reading operations.
pub type Sen3Result<T> = Result<T, Sen3Error>;

/// Error types for `.SEN3` product reading.
#[derive(Error, Debug)]
pub enum Sen3Error {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The path is not a `.SEN3` product directory
    #[error("Not a .SEN3 product directory: {0}")]
    NotAProduct(String),

    /// Missing required variable, attribute, or dataset
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Command execution error
    #[error("Command execution failed: {0}")]
    Command(String),

    /// The requested channel is not a known OLCI Level-2 channel
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),
}

pub mod ncdump;
pub mod product;

pub use ncdump::NcdumpReader;
pub use product::{
    channel_by_name, Channel, ChannelGrid, GridReader, GridStats, Sen3Product, OLCI_CHANNELS,
};
