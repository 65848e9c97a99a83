//! Overlays: several layers sharing one coordinate system.

use super::{Bounds, View, ViewKind, ViewMetadata};
use crate::{DataViewError, DataViewResult};

/// An ordered sequence of layers drawn superimposed, first layer at the bottom.
#[derive(Debug, Clone)]
pub struct Overlay {
    layers: Vec<View>,
    pub metadata: ViewMetadata,
}

impl Overlay {
    /// Fails if there are no layers or a layer is itself a composite.
    pub fn new(layers: Vec<View>) -> DataViewResult<Self> {
        if layers.is_empty() {
            return Err(DataViewError::invalid_parameter(
                "layers",
                "an overlay needs at least one layer",
            ));
        }
        if let Some(layer) = layers.iter().find(|layer| !layer.kind().is_layer()) {
            return Err(DataViewError::invalid_parameter(
                "layers",
                format!("{} cannot be an overlay layer", layer.kind()),
            ));
        }
        Ok(Self {
            layers,
            metadata: ViewMetadata::default(),
        })
    }

    /// Add a layer on top.
    pub fn push(&mut self, layer: impl Into<View>) -> DataViewResult<()> {
        let layer = layer.into();
        if !layer.kind().is_layer() {
            return Err(DataViewError::invalid_parameter(
                "layer",
                format!("{} cannot be an overlay layer", layer.kind()),
            ));
        }
        self.layers.push(layer);
        Ok(())
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    pub fn with_labels(mut self, xlabel: impl Into<String>, ylabel: impl Into<String>) -> Self {
        self.metadata.xlabel = Some(xlabel.into());
        self.metadata.ylabel = Some(ylabel.into());
        self
    }

    pub fn layers(&self) -> &[View] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The topmost layer.
    pub fn last(&self) -> Option<&View> {
        self.layers.last()
    }

    /// True if any layer lives in sheet coordinates.
    pub fn is_spatial(&self) -> bool {
        self.layers.iter().any(|layer| layer.kind().is_spatial())
    }

    /// Shared extent: the union of every bounded layer.
    pub fn bounds(&self) -> Option<Bounds> {
        let bounds: Vec<Bounds> = self.layers.iter().filter_map(View::bounds).collect();
        Bounds::union(bounds.iter())
    }

    pub fn roi(&self) -> Overlay {
        Overlay {
            layers: self.layers.iter().map(View::roi).collect(),
            metadata: self.metadata.clone(),
        }
    }

    /// Kinds of each layer, bottom to top.
    pub fn layer_kinds(&self) -> Vec<ViewKind> {
        self.layers.iter().map(View::kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{Annotation, SheetPoints, SheetView};
    use ndarray::{Array2, array};

    #[test]
    fn test_overlay_variant_follows_layers() {
        let sheet = SheetView::new(Array2::zeros((2, 2)), Bounds::new(0.0, 0.0, 1.0, 1.0));
        let overlay = Overlay::new(vec![sheet.into(), Annotation::new().vline(0.5, None).into()])
            .expect("valid");
        assert!(matches!(View::from(overlay), View::SheetOverlay(_)));

        let overlay = Overlay::new(vec![Annotation::new().into()]).expect("valid");
        assert!(matches!(View::from(overlay), View::DataOverlay(_)));
    }

    #[test]
    fn test_bounds_union() {
        let unit = Bounds::new(0.0, 0.0, 1.0, 1.0);
        let points = SheetPoints::new(array![[0.0, 0.0]], Bounds::new(-1.0, 0.0, 0.5, 2.0)).expect("valid");
        let overlay = Overlay::new(vec![
            SheetView::new(Array2::zeros((1, 1)), unit).into(),
            points.into(),
        ])
        .expect("valid");
        assert_eq!(overlay.bounds().map(|b| b.lbrt()), Some((-1.0, 0.0, 1.0, 2.0)));
    }

    #[test]
    fn test_nested_overlay_rejected() {
        let inner = Overlay::new(vec![Annotation::new().into()]).expect("valid");
        assert!(Overlay::new(vec![View::from(inner)]).is_err());
        assert!(Overlay::new(vec![]).is_err());
    }
}
