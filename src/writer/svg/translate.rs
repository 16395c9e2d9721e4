//! Layer-to-vector translation
//!
//! [`MapExporter`] runs one export pass over a style document:
//!
//! ```text
//! INIT -> for each layer { SKIP | BACKGROUND | FEATURES } -> ASSEMBLE -> DELIVER
//! ```
//!
//! Every layer gets a fresh projection. Its scale comes from fitting the
//! viewport bounding box into the square output extent; it is centered on
//! the viewport center, translated to the middle of the output and clipped to
//! it. The zoom reported by the view is read once and used both for
//! simplification and for every property resolution.

use regex::{Captures, Regex};
use serde_json::{Map, Value};

use super::diagnostics::{Diagnostic, ExportReport, SkipReason};
use super::spec::{
    convert_value, AttributeTransform, Converted, LayerStyleSpec, CIRCLE_RADIUS,
    DEFAULT_HALO_BLUR, LABEL_BLUR, LABEL_HALO, LABEL_TEXT, TEXT_FIELD, TEXT_TRANSFORM,
};
use super::{Attributes, LayerGroup, SvgDocument, VectorElement};
use crate::config::ExportConfig;
use crate::geometry::{rewind, simplify_features, tolerance_for_zoom, Feature};
use crate::projection::{
    fit_extent, format_number, label_anchor, render_path_with, ClipExtent, Mercator, PathWriter,
};
use crate::reader::ViewProvider;
use crate::style::engine::value_to_string;
use crate::style::function::{evaluate_legacy_function, is_legacy_function};
use crate::style::{
    BuiltinCatalog, LayerType, PropertyKind, PropertyResolver, Resolved, StyleCatalog,
    StyleDocument, StyleLayer,
};
use crate::writer::{Delivery, SVG_MIME_TYPE};
use crate::{MapSvgError, Result};

/// What an export will do with a layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerPlan {
    Export(LayerType),
    Skip(SkipReason),
}

/// Exports a styled map view to SVG.
pub struct MapExporter<'a> {
    config: ExportConfig,
    catalog: &'a dyn StyleCatalog,
    on_diagnostic: Option<Box<dyn Fn(&Diagnostic) + 'a>>,
    token_pattern: Regex,
}

impl<'a> MapExporter<'a> {
    /// Create an exporter using the built-in property catalog.
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            catalog: &BuiltinCatalog,
            on_diagnostic: None,
            token_pattern: Regex::new(r"\{([^{}]+)\}").expect("Failed to compile token regex"),
        }
    }

    pub fn with_catalog(mut self, catalog: &'a dyn StyleCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Register a callback receiving every diagnostic as it happens.
    pub fn on_diagnostic(mut self, callback: impl Fn(&Diagnostic) + 'a) -> Self {
        self.on_diagnostic = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Decide whether a layer is exported.
    pub fn plan_layer(&self, layer: &StyleLayer) -> LayerPlan {
        if !layer.is_visible() {
            LayerPlan::Skip(SkipReason::Hidden)
        } else if self.config.is_unsupported(&layer.kind) {
            LayerPlan::Skip(SkipReason::UnsupportedType(layer.kind.clone()))
        } else {
            LayerPlan::Export(layer.layer_type())
        }
    }

    /// Translate every layer of `style` for the current `view`.
    ///
    /// # Errors
    ///
    /// Returns `MapSvgError::ExportError` only for an invalid configuration.
    /// Problems inside layers are reported as diagnostics.
    pub fn export<V: ViewProvider + ?Sized>(
        &self,
        view: &V,
        style: &StyleDocument,
    ) -> Result<(SvgDocument, ExportReport)> {
        self.config.validate()?;

        let zoom = view.zoom();
        let center = view.center();
        let bbox = view.bounds().to_feature();
        let size = self.config.size as f64;
        let extent = ClipExtent::square(size);
        let resolver = PropertyResolver::new(self.catalog);

        tracing::info!(
            layers = style.layers.len(),
            zoom,
            center = %center,
            size = self.config.size,
            "Exporting map view"
        );

        let mut document = SvgDocument::new(&self.config);
        let mut report = ExportReport::default();

        for layer in &style.layers {
            let layer_type = match self.plan_layer(layer) {
                LayerPlan::Export(layer_type) => layer_type,
                LayerPlan::Skip(reason) => {
                    self.emit(
                        &mut report,
                        Diagnostic::LayerSkipped {
                            layer_id: layer.id.clone(),
                            reason,
                        },
                    );
                    continue;
                }
            };

            let features = if layer_type == LayerType::Background {
                vec![bbox.clone()]
            } else {
                match view.query_rendered_features(&layer.id) {
                    Ok(features) if self.config.simplify => {
                        simplify_features(features, tolerance_for_zoom(zoom))
                    }
                    Ok(features) => features,
                    Err(e) => {
                        self.emit(
                            &mut report,
                            Diagnostic::LayerSkipped {
                                layer_id: layer.id.clone(),
                                reason: SkipReason::QueryFailed(e.to_string()),
                            },
                        );
                        continue;
                    }
                }
            };

            let (_, scale) = fit_extent(Mercator::new(), &extent, &bbox);
            if !(scale.is_finite() && scale > 0.0) {
                self.emit(
                    &mut report,
                    Diagnostic::DegenerateFit {
                        layer_id: layer.id.clone(),
                        scale,
                    },
                );
                continue;
            }

            let layer_ctx = LayerContext {
                layer,
                layer_type,
                zoom,
                resolver,
                precision: self.config.precision,
                projection: Mercator::new()
                    .with_center(center.lng, center.lat)
                    .with_scale(scale)
                    .with_translate(size / 2.0, size / 2.0)
                    .with_clip_extent(extent),
            };

            let feature_count = features.len();
            let mut group = LayerGroup::new(layer.id.clone());
            for (index, feature) in features.into_iter().enumerate() {
                let feature = if feature.is_bbox() {
                    feature
                } else {
                    rewind(feature)
                };
                let element_id = match &feature.id {
                    Some(id) => id.to_string(),
                    None => format!("{}-{}", layer.id, index),
                };
                if layer_type == LayerType::Symbol {
                    self.translate_label(&layer_ctx, &feature, &element_id, &mut group, &mut report);
                } else {
                    self.translate_path(&layer_ctx, &feature, &element_id, &mut group, &mut report);
                }
            }

            tracing::debug!(
                layer = %layer.id,
                kind = %layer.kind,
                scale,
                features = feature_count,
                elements = group.elements.len(),
                "Translated layer"
            );
            report.layers_exported.push(layer.id.clone());
            document.groups.push(group);
        }

        report.element_count = document.element_count();
        tracing::info!(
            elements = report.element_count,
            layers = report.layers_exported.len(),
            skipped = report.layers_skipped(),
            "Export complete"
        );
        Ok((document, report))
    }

    /// Export, serialize and hand the document to `delivery`.
    pub fn export_to<V: ViewProvider + ?Sized>(
        &self,
        view: &V,
        style: &StyleDocument,
        delivery: &mut dyn Delivery,
    ) -> Result<ExportReport> {
        let (document, mut report) = self.export(view, style)?;
        let svg = document.to_svg_string();
        let filename = self.config.filename();

        delivery
            .deliver(svg.as_bytes(), &filename, SVG_MIME_TYPE)
            .map_err(|e| match e {
                MapSvgError::DeliveryError(_) => e,
                other => MapSvgError::DeliveryError(other.to_string()),
            })?;

        report.filename = Some(filename);
        report.bytes = svg.len();
        Ok(report)
    }

    fn emit(&self, report: &mut ExportReport, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::LayerSkipped {
                reason: SkipReason::Hidden | SkipReason::UnsupportedType(_),
                ..
            } => tracing::debug!("{}", diagnostic),
            _ => tracing::warn!("{}", diagnostic),
        }
        if let Some(callback) = &self.on_diagnostic {
            callback(&diagnostic);
        }
        report.diagnostics.push(diagnostic);
    }

    /// Fill, line, background and circle layers: one path per feature.
    fn translate_path(
        &self,
        ctx: &LayerContext,
        feature: &Feature,
        element_id: &str,
        group: &mut LayerGroup,
        report: &mut ExportReport,
    ) {
        let Some(geometry) = &feature.geometry else {
            self.skip_element(ctx, element_id, "feature has no geometry", report);
            return;
        };

        let mut writer = PathWriter::new(ctx.precision);
        if ctx.layer_type == LayerType::Circle {
            if let Some(radius) = self.circle_radius(ctx, feature, element_id, report) {
                writer = writer.with_point_radius(radius);
            }
        }

        let Some(d) = render_path_with(geometry, &ctx.projection, writer) else {
            self.skip_element(ctx, element_id, "nothing visible in the output extent", report);
            return;
        };

        let mut attributes = Attributes::new();
        self.apply_spec(
            LayerStyleSpec::for_layer_type(ctx.layer_type),
            ctx,
            feature,
            element_id,
            &mut attributes,
            report,
        );
        group.elements.push(VectorElement::Path {
            id: element_id.to_string(),
            d,
            attributes,
        });
    }

    /// Point radius for a circle layer feature. An unset `circle-radius`
    /// takes the catalog default; legacy functions are evaluated at the
    /// export zoom.
    fn circle_radius(
        &self,
        ctx: &LayerContext,
        feature: &Feature,
        element_id: &str,
        report: &mut ExportReport,
    ) -> Option<f64> {
        let value = match ctx.resolve(PropertyKind::Paint, CIRCLE_RADIUS, feature) {
            Resolved::Missing => self.catalog.property_spec(CIRCLE_RADIUS)?.default?,
            resolved => {
                self.note_fallback(ctx, &resolved, CIRCLE_RADIUS, element_id, report);
                resolved.into_value()?
            }
        };
        let value = if is_legacy_function(&value) {
            evaluate_legacy_function(&value, &feature.properties, ctx.zoom)?
        } else {
            value
        };
        value.as_f64().filter(|radius| radius.is_finite() && *radius > 0.0)
    }

    /// Symbol layers: optional blur filter, optional halo text, then the
    /// label text.
    ///
    /// The blur's `stdDeviation` follows the resolved `text-halo-blur` and is
    /// `5` when that resolves to nothing usable.
    fn translate_label(
        &self,
        ctx: &LayerContext,
        feature: &Feature,
        element_id: &str,
        group: &mut LayerGroup,
        report: &mut ExportReport,
    ) {
        let Some(geometry) = &feature.geometry else {
            self.skip_element(ctx, element_id, "feature has no geometry", report);
            return;
        };
        let Some([x, y]) = label_anchor(geometry, &ctx.projection) else {
            self.skip_element(ctx, element_id, "no finite label position", report);
            return;
        };
        let Some(content) = self.label_content(ctx, feature, element_id, report) else {
            self.skip_element(ctx, element_id, "empty label", report);
            return;
        };

        let transform = format!(
            "translate({},{})",
            format_number(x, ctx.precision),
            format_number(y, ctx.precision)
        );

        let paint_is_set = |property: &str| {
            ctx.layer
                .property(PropertyKind::Paint, property)
                .is_some_and(is_set)
        };
        if paint_is_set("text-halo-color") {
            let mut halo = Attributes::new();
            if paint_is_set("text-halo-blur") {
                let filter_id = format!("{}-blur", element_id);
                let mut blur = Attributes::new();
                self.apply_spec(&LABEL_BLUR, ctx, feature, element_id, &mut blur, report);
                group.elements.push(VectorElement::Filter {
                    id: filter_id.clone(),
                    std_deviation: blur
                        .get("stdDeviation")
                        .unwrap_or(DEFAULT_HALO_BLUR)
                        .to_string(),
                });
                halo.set("filter", format!("url(#{})", filter_id));
            }
            self.apply_spec(&LABEL_HALO, ctx, feature, element_id, &mut halo, report);
            group.elements.push(VectorElement::Text {
                id: format!("{}-stroke", element_id),
                transform: transform.clone(),
                content: content.clone(),
                attributes: halo,
            });
        }

        let mut text = Attributes::new();
        self.apply_spec(&LABEL_TEXT, ctx, feature, element_id, &mut text, report);
        group.elements.push(VectorElement::Text {
            id: format!("{}-text", element_id),
            transform,
            content,
            attributes: text,
        });
    }

    /// Resolve `text-field`, fill `{token}` placeholders and apply
    /// `text-transform`.
    fn label_content(
        &self,
        ctx: &LayerContext,
        feature: &Feature,
        element_id: &str,
        report: &mut ExportReport,
    ) -> Option<String> {
        let resolved = ctx.resolve(PropertyKind::Layout, TEXT_FIELD, feature);
        self.note_fallback(ctx, &resolved, TEXT_FIELD, element_id, report);
        let mut value = resolved.into_value()?;

        let mut tokenized = ctx
            .layer
            .property(PropertyKind::Layout, TEXT_FIELD)
            .is_some_and(Value::is_string);
        if is_legacy_function(&value) {
            value = evaluate_legacy_function(&value, &feature.properties, ctx.zoom)?;
            tokenized = true;
        }

        let mut text = match &value {
            Value::Null | Value::Bool(false) => return None,
            Value::String(s) => s.clone(),
            other => value_to_string(other),
        };
        if tokenized {
            text = self.substitute_tokens(&text, &feature.properties);
        }

        let case = ctx
            .resolve(PropertyKind::Layout, TEXT_TRANSFORM, feature)
            .into_value();
        match case.as_ref().and_then(Value::as_str) {
            Some("uppercase") => text = text.to_uppercase(),
            Some("lowercase") => text = text.to_lowercase(),
            _ => {}
        }

        (!text.is_empty()).then_some(text)
    }

    fn substitute_tokens(&self, text: &str, properties: &Map<String, Value>) -> String {
        self.token_pattern
            .replace_all(text, |caps: &Captures| {
                properties
                    .get(&caps[1])
                    .map(value_to_string)
                    .unwrap_or_default()
            })
            .into_owned()
    }

    fn apply_spec(
        &self,
        spec: &LayerStyleSpec,
        ctx: &LayerContext,
        feature: &Feature,
        element_id: &str,
        attributes: &mut Attributes,
        report: &mut ExportReport,
    ) {
        for rule in spec.rules {
            let resolved = ctx.resolve(rule.kind, rule.property, feature);
            self.note_fallback(ctx, &resolved, rule.property, element_id, report);
            let Some(value) = resolved.into_value() else {
                continue;
            };

            match convert_value(&value, rule.transform, &feature.properties, ctx.zoom) {
                Converted::Set(text) => attributes.set(rule.attribute, text),
                Converted::Skip => {}
                Converted::Invalid(value) if rule.transform == AttributeTransform::Hex => self
                    .emit(
                        report,
                        Diagnostic::InvalidColor {
                            layer_id: ctx.layer.id.clone(),
                            element_id: element_id.to_string(),
                            property: rule.property.to_string(),
                            value,
                        },
                    ),
                Converted::Invalid(value) => self.emit(
                    report,
                    Diagnostic::ExpressionFallback {
                        layer_id: ctx.layer.id.clone(),
                        element_id: element_id.to_string(),
                        property: rule.property.to_string(),
                        reason: format!("{} cannot be written as '{}'", value, rule.attribute),
                    },
                ),
            }
        }
        for (name, value) in spec.fixed {
            attributes.set(name, *value);
        }
    }

    fn note_fallback(
        &self,
        ctx: &LayerContext,
        resolved: &Resolved,
        property: &str,
        element_id: &str,
        report: &mut ExportReport,
    ) {
        if let Resolved::Fallback { reason, .. } = resolved {
            self.emit(
                report,
                Diagnostic::ExpressionFallback {
                    layer_id: ctx.layer.id.clone(),
                    element_id: element_id.to_string(),
                    property: property.to_string(),
                    reason: reason.clone(),
                },
            );
        }
    }

    fn skip_element(
        &self,
        ctx: &LayerContext,
        element_id: &str,
        reason: &str,
        report: &mut ExportReport,
    ) {
        self.emit(
            report,
            Diagnostic::ElementSkipped {
                layer_id: ctx.layer.id.clone(),
                element_id: element_id.to_string(),
                reason: reason.to_string(),
            },
        );
    }
}

/// Per-layer state shared by every feature of the layer.
struct LayerContext<'l> {
    layer: &'l StyleLayer,
    layer_type: LayerType,
    zoom: f64,
    resolver: PropertyResolver<'l>,
    precision: u8,
    projection: Mercator,
}

impl LayerContext<'_> {
    fn resolve(&self, kind: PropertyKind, property_id: &str, feature: &Feature) -> Resolved {
        self.resolver
            .resolve(self.layer, kind, property_id, feature, self.zoom)
    }
}

/// Truthiness of a raw style value, as used for optional label parts.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
