//! Grid reading through the `ncdump` command-line tool.
//!
//! OLCI Level-2 datasets store channels as packed integers with
//! `scale_factor`, `add_offset`, and `_FillValue` attributes. Header
//! metadata comes from `ncdump -h`; values come from `ncdump -v` at high
//! precision. Fill pixels, which `ncdump` prints as `_`, become NaN.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::product::{Channel, ChannelGrid, GridReader, Sen3Product};
use crate::{Sen3Error, Sen3Result};

/// [`GridReader`] backed by the `ncdump` binary.
#[derive(Debug, Default)]
pub struct NcdumpReader;

impl NcdumpReader {
    pub fn new() -> Self {
        Self
    }
}

impl GridReader for NcdumpReader {
    fn read_channel(&self, product: &Sen3Product, channel: &Channel) -> Sen3Result<ChannelGrid> {
        let path = product.dataset_path(channel.dataset);
        if !path.exists() {
            return Err(Sen3Error::MissingData(format!(
                "dataset {} in {}",
                channel.dataset,
                product.name()
            )));
        }

        let header = run_ncdump(&path, &["-h"])?;
        let rows = parse_dimension(&header, "rows")?;
        let columns = parse_dimension(&header, "columns")?;

        let scale = parse_variable_attribute(&header, channel.variable, "scale_factor").unwrap_or(1.0);
        let offset = parse_variable_attribute(&header, channel.variable, "add_offset").unwrap_or(0.0);
        let fill = parse_variable_attribute(&header, channel.variable, "_FillValue");
        let units = parse_string_attribute(&header, channel.variable, "units");

        debug!(
            variable = channel.variable,
            rows, columns, scale, offset, "Reading channel grid"
        );

        let dump = run_ncdump(&path, &["-v", channel.variable, "-p", "9,17"])?;
        let values = parse_values(&dump, channel.variable, scale, offset, fill)?;

        if values.len() != rows * columns {
            return Err(Sen3Error::InvalidFormat(format!(
                "{} has {} values, expected {}x{}",
                channel.variable,
                values.len(),
                rows,
                columns
            )));
        }

        Ok(ChannelGrid {
            variable: channel.variable.to_string(),
            units,
            rows,
            columns,
            values,
        })
    }
}

fn run_ncdump(path: &Path, args: &[&str]) -> Sen3Result<String> {
    let output = Command::new("ncdump")
        .args(args)
        .arg(path)
        .output()
        .map_err(|e| Sen3Error::Command(format!("Failed to run ncdump: {e}")))?;

    if !output.status.success() {
        return Err(Sen3Error::Command(format!(
            "ncdump failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse a dimension line like `\trows = 4091 ;`.
pub(crate) fn parse_dimension(header: &str, name: &str) -> Sen3Result<usize> {
    let pattern = format!("{name} = ");
    for line in header.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix(&pattern) {
            let num = rest.trim().trim_end_matches(';').trim();
            return num
                .parse()
                .map_err(|_| Sen3Error::InvalidFormat(format!("Failed to parse dimension {name}")));
        }
    }
    Err(Sen3Error::MissingData(format!("dimension {name}")))
}

/// Parse a numeric variable attribute like `\t\tCHL_NN:scale_factor = 0.0016f ;`.
pub(crate) fn parse_variable_attribute(header: &str, variable: &str, name: &str) -> Option<f64> {
    let pattern = format!("{variable}:{name} = ");
    for line in header.lines() {
        if let Some(rest) = line.trim_start().strip_prefix(&pattern) {
            return parse_number(rest);
        }
    }
    None
}

/// Parse a quoted string attribute like `\t\tCHL_NN:units = "mg.m-3" ;`.
pub(crate) fn parse_string_attribute(header: &str, variable: &str, name: &str) -> Option<String> {
    let pattern = format!("{variable}:{name} = ");
    for line in header.lines() {
        if let Some(rest) = line.trim_start().strip_prefix(&pattern) {
            let text = rest.trim().trim_end_matches(';').trim_end();
            return Some(text.trim_matches('"').to_string());
        }
    }
    None
}

/// Parse one ncdump numeric literal, dropping the `;` terminator and any
/// type suffix (`s`, `f`, `b`, `L`, ...).
fn parse_number(text: &str) -> Option<f64> {
    let mut clean = text.trim().trim_end_matches(';').trim_end().to_string();
    while clean
        .chars()
        .last()
        .map(|c| c.is_ascii_alphabetic())
        .unwrap_or(false)
    {
        clean.pop();
    }
    let clean = clean.trim_end_matches('.').trim();
    clean.parse().ok()
}

/// Extract the value list of `variable` from full `ncdump -v` output.
pub(crate) fn parse_values(
    dump: &str,
    variable: &str,
    scale: f64,
    offset: f64,
    fill: Option<f64>,
) -> Sen3Result<Vec<f32>> {
    let data_start = dump
        .find("\ndata:")
        .ok_or_else(|| Sen3Error::MissingData("data section".to_string()))?;
    let section = &dump[data_start..];

    let marker = format!("{variable} = ");
    let values_start = section
        .find(&marker)
        .ok_or_else(|| Sen3Error::MissingData(format!("values for {variable}")))?;
    let body = &section[values_start + marker.len()..];
    let body = &body[..body.find(';').unwrap_or(body.len())];

    let mut values = Vec::new();
    for token in body.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if token == "_" {
            values.push(f32::NAN);
            continue;
        }
        let raw = parse_number(token).ok_or_else(|| {
            Sen3Error::InvalidFormat(format!("Bad value '{token}' for {variable}"))
        })?;
        if fill.map(|f| raw == f).unwrap_or(false) {
            values.push(f32::NAN);
        } else {
            values.push((raw * scale + offset) as f32);
        }
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "netcdf chl_nn {\n\
dimensions:\n\
\trows = 2 ;\n\
\tcolumns = 3 ;\n\
variables:\n\
\tshort CHL_NN(rows, columns) ;\n\
\t\tCHL_NN:_FillValue = -32768s ;\n\
\t\tCHL_NN:scale_factor = 0.0016f ;\n\
\t\tCHL_NN:add_offset = -4.6f ;\n\
\t\tCHL_NN:units = \"lg(re mg.m-3)\" ;\n\
}\n";

    const DUMP: &str = "netcdf chl_nn {\n\
dimensions:\n\
\trows = 2 ;\n\
\tcolumns = 3 ;\n\
variables:\n\
\tshort CHL_NN(rows, columns) ;\n\
\t\tCHL_NN:_FillValue = -32768s ;\n\
data:\n\
\n\
 CHL_NN = 1000, 2000, -32768,\n\
    _, 3000, 0 ;\n\
}\n";

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimension(HEADER, "rows").unwrap(), 2);
        assert_eq!(parse_dimension(HEADER, "columns").unwrap(), 3);
    }

    #[test]
    fn test_parse_missing_dimension() {
        let err = parse_dimension(HEADER, "bands").unwrap_err();
        assert!(matches!(err, Sen3Error::MissingData(_)));
    }

    #[test]
    fn test_parse_attributes_with_type_suffixes() {
        let scale = parse_variable_attribute(HEADER, "CHL_NN", "scale_factor").unwrap();
        assert!((scale - 0.0016).abs() < 1e-12);

        let offset = parse_variable_attribute(HEADER, "CHL_NN", "add_offset").unwrap();
        assert!((offset - -4.6).abs() < 1e-12);

        let fill = parse_variable_attribute(HEADER, "CHL_NN", "_FillValue").unwrap();
        assert_eq!(fill, -32768.0);
    }

    #[test]
    fn test_parse_attribute_missing() {
        assert!(parse_variable_attribute(HEADER, "CHL_NN", "valid_min").is_none());
        assert!(parse_variable_attribute(HEADER, "TSM_NN", "scale_factor").is_none());
    }

    #[test]
    fn test_parse_units_string() {
        let units = parse_string_attribute(HEADER, "CHL_NN", "units").unwrap();
        assert_eq!(units, "lg(re mg.m-3)");

        assert!(parse_string_attribute(HEADER, "CHL_NN", "long_name").is_none());
    }

    #[test]
    fn test_parse_scientific_notation() {
        let header = "\t\tX:scale_factor = 1.4e-05f ;\n";
        let value = parse_variable_attribute(header, "X", "scale_factor").unwrap();
        assert!((value - 1.4e-05).abs() < 1e-15);
    }

    #[test]
    fn test_parse_values_applies_scaling_and_fill() {
        let values = parse_values(DUMP, "CHL_NN", 0.0016, -4.6, Some(-32768.0)).unwrap();
        assert_eq!(values.len(), 6);

        assert!((values[0] - (1000.0 * 0.0016 - 4.6) as f32).abs() < 1e-6);
        assert!((values[1] - (2000.0 * 0.0016 - 4.6) as f32).abs() < 1e-6);
        assert!(values[2].is_nan(), "fill value must become NaN");
        assert!(values[3].is_nan(), "underscore marker must become NaN");
        assert!((values[5] - -4.6).abs() < 1e-6);
    }

    #[test]
    fn test_parse_values_without_fill() {
        let values = parse_values(DUMP, "CHL_NN", 1.0, 0.0, None).unwrap();
        assert_eq!(values[2], -32768.0);
    }

    #[test]
    fn test_parse_values_missing_variable() {
        let err = parse_values(DUMP, "TSM_NN", 1.0, 0.0, None).unwrap_err();
        assert!(matches!(err, Sen3Error::MissingData(_)));
    }

    #[test]
    fn test_parse_values_rejects_garbage() {
        let dump = "netcdf x {\ndata:\n X = 1, garbage, 3 ;\n}\n";
        let err = parse_values(dump, "X", 1.0, 0.0, None).unwrap_err();
        assert!(matches!(err, Sen3Error::InvalidFormat(_)));
    }

    #[test]
    fn test_missing_dataset_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("S3A_test.SEN3");
        std::fs::create_dir(&root).unwrap();

        let product = Sen3Product::open(&root).unwrap();
        let channel = crate::product::channel_by_name("CHL_NN").unwrap();

        let err = NcdumpReader::new().read_channel(&product, channel).unwrap_err();
        assert!(matches!(err, Sen3Error::MissingData(_)));
    }
}
