//! Catalogue search and payload download flow.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use catalogue_client::{CatalogueClient, ProductRecord, SearchResults};
use futures::StreamExt;
use odata_query::{AreaOfInterest, FilterValue, SearchCriteria};
use serde::Serialize;
use tracing::{error, info};

use crate::config::ArchiveConfig;
use crate::Args;

/// Run a catalogue search, write the matches, and optionally download
/// their payloads.
pub async fn run_search(args: &Args, config: &ArchiveConfig) -> Result<()> {
    let client = CatalogueClient::new(config.client_config())?;
    let criteria = build_criteria(args, config)?;

    info!(max_results = criteria.max_results, "Searching product catalogue");
    let results = client.fetch_all(&criteria).await?;

    match results {
        SearchResults::NoMatches => {
            info!("No products matched the search");
        }
        SearchResults::Found(products) => {
            write_json_lines(&products, args.output.as_deref())?;
            info!(count = products.len(), "Search complete");

            if args.download {
                download_products(&client, &products, args).await?;
            }
        }
    }

    Ok(())
}

/// Translate command-line arguments into search criteria, with config
/// defaults filling the gaps.
pub fn build_criteria(args: &Args, config: &ArchiveConfig) -> Result<SearchCriteria> {
    let mut criteria = SearchCriteria::new(args.max_results.unwrap_or(config.search.max_results));
    criteria.start = args.start.clone();
    criteria.end = args.end.clone();

    criteria.area = match (&args.area, &args.region, &args.area_file) {
        (Some(wkt), _, _) => Some(AreaOfInterest::Wkt(wkt.clone())),
        (None, Some(region), _) => {
            let wkt = config
                .regions
                .get(region)
                .with_context(|| format!("Region '{region}' is not defined in the config file"))?;
            Some(AreaOfInterest::Wkt(wkt.clone()))
        }
        (None, None, Some(path)) => Some(read_area_csv(path)?),
        (None, None, None) => None,
    };

    for raw in &args.attributes {
        criteria.attribute_filters.push(parse_attribute_arg(raw)?);
    }

    Ok(criteria)
}

/// Read a two-column CSV of `lat,lon` rows into tabular coordinates.
///
/// A non-numeric first row is treated as a header and skipped. Blank
/// lines are ignored. Whether the points form a usable polygon is decided
/// later by the area normalizer.
pub fn read_area_csv(path: &Path) -> Result<AreaOfInterest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read area file: {}", path.display()))?;

    let mut lats = Vec::new();
    let mut lons = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split(',').map(str::trim);
        let (lat, lon) = match (fields.next(), fields.next(), fields.next()) {
            (Some(lat), Some(lon), None) => (lat, lon),
            _ => anyhow::bail!(
                "Area file line {} is not a lat,lon pair: '{line}'",
                index + 1
            ),
        };

        match (lat.parse::<f64>(), lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => {
                lats.push(lat);
                lons.push(lon);
            }
            _ if index == 0 => continue,
            _ => anyhow::bail!("Area file line {} is not numeric: '{line}'", index + 1),
        }
    }

    Ok(AreaOfInterest::Table { lats, lons })
}

/// Parse a `NAME=VALUE` attribute filter argument.
pub fn parse_attribute_arg(raw: &str) -> Result<(String, FilterValue)> {
    let (name, value) = raw
        .split_once('=')
        .with_context(|| format!("Attribute filter '{raw}' must be NAME=VALUE"))?;

    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Attribute filter '{raw}' has an empty name");
    }

    Ok((name.to_string(), parse_filter_value(value.trim())))
}

/// Infer the value shape of a filter argument. How the value is rendered
/// on the wire is decided later by the attribute's declared type, so a
/// wrong guess here is harmless for quoting.
pub fn parse_filter_value(raw: &str) -> FilterValue {
    if raw.eq_ignore_ascii_case("true") {
        return FilterValue::from(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return FilterValue::from(false);
    }
    if let Some(value) = raw.parse::<f64>().ok().filter(|v| v.is_finite()) {
        return FilterValue::from(value);
    }
    FilterValue::from(raw)
}

/// Write items as JSON lines to a file, or to stdout when no path given.
pub fn write_json_lines<T: Serialize>(items: &[T], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_items(items, std::io::BufWriter::new(file))
        }
        None => {
            let stdout = std::io::stdout();
            write_items(items, stdout.lock())
        }
    }
}

fn write_items<T: Serialize, W: Write>(items: &[T], mut writer: W) -> Result<()> {
    for item in items {
        serde_json::to_writer(&mut writer, item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Download every matched payload, a few at a time.
async fn download_products(
    client: &CatalogueClient,
    products: &[ProductRecord],
    args: &Args,
) -> Result<()> {
    let username = args
        .username
        .as_deref()
        .context("--username or CDSE_USERNAME is required for downloads")?;
    let password = args
        .password
        .as_deref()
        .context("--password or CDSE_PASSWORD is required for downloads")?;

    let token = client.fetch_token(username, password).await?;
    tokio::fs::create_dir_all(&args.output_dir).await?;

    info!(
        count = products.len(),
        concurrency = args.max_concurrent,
        output_dir = %args.output_dir.display(),
        "Starting payload downloads"
    );

    let results = futures::stream::iter(products.iter().map(|product| {
        let client = client.clone();
        let token = token.clone();
        let output_dir = args.output_dir.clone();
        async move {
            match client.download_product(product, &token, &output_dir).await {
                Ok(path) => {
                    info!(product = %product.name, path = %path.display(), "Downloaded");
                    Ok(path)
                }
                Err(e) => {
                    error!(product = %product.name, error = %e, "Download failed");
                    Err(e)
                }
            }
        }
    }))
    .buffer_unordered(args.max_concurrent)
    .collect::<Vec<_>>()
    .await;

    let (successes, failures): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);

    info!(
        success = successes.len(),
        failed = failures.len(),
        "Download cycle complete"
    );

    if !failures.is_empty() {
        anyhow::bail!("{} of {} downloads failed", failures.len(), products.len());
    }
    Ok(())
}
