/*!
mapsvg Command Line Interface

Exports view snapshots of styled maps to SVG and inspects how style layers
and properties are handled.
*/

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mapsvg::style::{BuiltinCatalog, PropertyKind, PropertyResolver, Resolved, StyleCatalog};
use mapsvg::writer::svg::LayerPlan;
use mapsvg::writer::FileDelivery;
use mapsvg::{
    ExportConfig, Feature, MapExporter, SnapshotView, StyleDocument, ViewProvider, VERSION,
};

#[derive(Parser)]
#[command(name = "mapsvg")]
#[command(about = "Export the rendered view of a styled vector map to SVG")]
#[command(version = VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export a view snapshot to an SVG file
    Export {
        /// Style document (JSON)
        #[arg(long)]
        style: PathBuf,

        /// View snapshot (JSON)
        #[arg(long)]
        view: PathBuf,

        /// Output directory
        #[arg(long, default_value = ".")]
        output: PathBuf,

        /// Side of the square output in pixels
        #[arg(long)]
        size: Option<u32>,

        /// Decimal places kept for coordinates
        #[arg(long)]
        precision: Option<u8>,

        /// Export configuration (JSON); flags override its values
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show which layers would be exported and why others are skipped
    Layers {
        /// Style document (JSON)
        #[arg(long)]
        style: PathBuf,

        /// View snapshot (JSON)
        #[arg(long)]
        view: PathBuf,
    },

    /// Resolve one style property for an ad-hoc feature
    Resolve {
        /// Style document (JSON)
        #[arg(long)]
        style: PathBuf,

        /// Layer id
        #[arg(long)]
        layer: String,

        /// Property id, e.g. fill-color
        #[arg(long)]
        property: String,

        /// Zoom level to resolve at
        #[arg(long, default_value_t = 0.0)]
        zoom: f64,

        /// Feature properties as a JSON object
        #[arg(long)]
        properties: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mapsvg=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            style,
            view,
            output,
            size,
            precision,
            config,
        } => {
            let mut export_config = match config {
                Some(path) => ExportConfig::from_path(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => ExportConfig::default(),
            };
            if let Some(size) = size {
                export_config = export_config.with_size(size);
            }
            if let Some(precision) = precision {
                export_config = export_config.with_precision(precision);
            }

            let style = StyleDocument::from_path(&style)?;
            let view = SnapshotView::from_path(&view)?;
            let mut delivery = FileDelivery::new(output);

            let report = MapExporter::new(export_config).export_to(&view, &style, &mut delivery)?;

            for path in delivery.written() {
                println!("Wrote {}", path.display());
            }
            println!(
                "{} elements from {} layers ({} skipped, {} diagnostics)",
                report.element_count,
                report.layers_exported.len(),
                report.layers_skipped(),
                report.diagnostics.len()
            );
        }

        Commands::Layers { style, view } => {
            let style = StyleDocument::from_path(&style)?;
            let view = SnapshotView::from_path(&view)?;
            let exporter = MapExporter::new(ExportConfig::default());

            println!("zoom {} at {}", view.zoom(), view.center());
            for line in layer_listing(&exporter, &style, &view) {
                println!("{}", line);
            }
        }

        Commands::Resolve {
            style,
            layer,
            property,
            zoom,
            properties,
        } => {
            let style = StyleDocument::from_path(&style)?;
            let Some(style_layer) = style.layer(&layer) else {
                bail!("Layer '{}' not found in style", layer);
            };

            let mut feature = Feature::default();
            if let Some(json) = properties {
                let value: Value =
                    serde_json::from_str(&json).context("Failed to parse --properties")?;
                let Value::Object(map) = value else {
                    bail!("--properties must be a JSON object");
                };
                feature.properties = map;
            }

            let kind = property_kind(style_layer.layout.contains_key(&property), &property);
            let resolved =
                PropertyResolver::default().resolve(style_layer, kind, &property, &feature, zoom);
            match resolved {
                Resolved::Missing => println!("{} is not set on layer '{}'", property, layer),
                Resolved::Value(value) => println!("{}", value),
                Resolved::Fallback { value, reason } => {
                    match value {
                        Some(value) => println!("{}", value),
                        None => println!("(omitted)"),
                    }
                    eprintln!("fallback: {}", reason);
                }
            }
        }
    }

    Ok(())
}

/// One line per style layer: exported with its feature count, skipped with
/// the reason, or the query error. A failing layer does not stop the listing.
fn layer_listing(
    exporter: &MapExporter,
    style: &StyleDocument,
    view: &dyn ViewProvider,
) -> Vec<String> {
    style
        .layers
        .iter()
        .map(|layer| match exporter.plan_layer(layer) {
            LayerPlan::Export(_) => match view.query_rendered_features(&layer.id) {
                Ok(features) => format!(
                    "  export  {:<32} {:<12} {} features",
                    layer.id,
                    layer.kind,
                    features.len()
                ),
                Err(e) => format!(
                    "  error   {:<32} {:<12} query failed: {}",
                    layer.id, layer.kind, e
                ),
            },
            LayerPlan::Skip(reason) => {
                format!("  skip    {:<32} {:<12} {}", layer.id, layer.kind, reason)
            }
        })
        .collect()
}

/// Property map a property id belongs to: the catalog's answer, otherwise
/// wherever the layer defines it.
fn property_kind(in_layout: bool, property: &str) -> PropertyKind {
    match BuiltinCatalog.property_spec(property) {
        Some(spec) => spec.kind,
        None if in_layout => PropertyKind::Layout,
        None => PropertyKind::Paint,
    }
}
