//! Keyed stacks of views.

use std::cmp::Ordering;
use std::fmt;

use super::{Bounds, View, ViewKind};
use crate::{DataViewError, DataViewResult};

/// Dimension label given to stacks built from a bare view.
pub const DEFAULT_DIMENSION: &str = "Default";

/// A stack key: one coordinate value per stack dimension.
///
/// Keys compare with [`f64::total_cmp`], so `NaN` equals itself and `-0.0`
/// sorts below `0.0`.
#[derive(Debug, Clone)]
pub struct Key(Vec<f64>);

impl Key {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self(values.into())
    }

    pub fn scalar(value: f64) -> Self {
        Self(vec![value])
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match a.total_cmp(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl From<f64> for Key {
    fn from(value: f64) -> Self {
        Self::scalar(value)
    }
}

impl From<Vec<f64>> for Key {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[f64; N]> for Key {
    fn from(values: [f64; N]) -> Self {
        Self(values.to_vec())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}

/// An ordered collection of `(key, view)` pairs sharing one element kind.
///
/// Entries are kept sorted by key, so the last entry is the `top` of the
/// stack. Spatial stacks additionally require every view to share the same
/// bounds.
#[derive(Debug, Clone)]
pub struct Stack {
    kind: ViewKind,
    dimension_labels: Vec<String>,
    entries: Vec<(Key, View)>,
}

impl Stack {
    /// Wrap a bare view in a single-frame stack with the default dimension
    /// and key `0`.
    pub fn from_view(view: View) -> Self {
        Self {
            kind: view.kind(),
            dimension_labels: vec![DEFAULT_DIMENSION.to_string()],
            entries: vec![(Key::scalar(0.0), view)],
        }
    }

    /// Build a stack over the given dimensions from `(key, view)` pairs.
    ///
    /// Fails if no items are supplied or any item violates the stack
    /// invariants (see [`Stack::insert`]).
    pub fn from_items<S, K, V, I>(dimension_labels: Vec<S>, items: I) -> DataViewResult<Self>
    where
        S: Into<String>,
        K: Into<Key>,
        V: Into<View>,
        I: IntoIterator<Item = (K, V)>,
    {
        let dimension_labels: Vec<String> = dimension_labels.into_iter().map(Into::into).collect();
        if dimension_labels.is_empty() {
            return Err(DataViewError::invalid_parameter(
                "dimension_labels",
                "a stack needs at least one dimension",
            ));
        }

        let mut items = items.into_iter();
        let (key, view) = items.next().ok_or_else(|| {
            DataViewError::invalid_parameter("items", "a stack needs at least one view")
        })?;
        let view = view.into();
        let mut stack = Self {
            kind: view.kind(),
            dimension_labels,
            entries: Vec::new(),
        };
        stack.insert(key, view)?;
        for (key, view) in items {
            stack.insert(key, view)?;
        }
        Ok(stack)
    }

    /// Insert a view at `key`, replacing any view already stored there.
    ///
    /// The key must have one value per dimension, the view must match the
    /// stack's kind, and spatial views must share the stack's bounds.
    pub fn insert(&mut self, key: impl Into<Key>, view: impl Into<View>) -> DataViewResult<()> {
        let key = key.into();
        let view = view.into();

        if key.len() != self.dimension_labels.len() {
            return Err(DataViewError::structure(format!(
                "key {} has {} values but the stack has {} dimensions",
                key,
                key.len(),
                self.dimension_labels.len()
            )));
        }
        if view.kind() != self.kind {
            return Err(DataViewError::structure(format!(
                "cannot insert a {} into a stack of {}",
                view.kind(),
                self.kind
            )));
        }
        if self.kind.is_spatial() {
            if let (Some(expected), Some(actual)) = (self.bounds(), view.bounds()) {
                if expected != actual {
                    return Err(DataViewError::structure(format!(
                        "view bounds {:?} differ from stack bounds {:?}",
                        actual.lbrt(),
                        expected.lbrt()
                    )));
                }
            }
        }

        match self.entries.binary_search_by(|(k, _)| k.cmp(&key)) {
            Ok(index) => self.entries[index].1 = view,
            Err(index) => self.entries.insert(index, (key, view)),
        }
        Ok(())
    }

    pub const fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn dimension_labels(&self) -> &[String] {
        &self.dimension_labels
    }

    /// True when the stack was built from a bare view.
    pub fn has_default_dimension(&self) -> bool {
        self.dimension_labels.len() == 1 && self.dimension_labels[0] == DEFAULT_DIMENSION
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The view at the key-max position.
    pub fn top(&self) -> &View {
        // Construction guarantees at least one entry.
        &self.entries[self.entries.len() - 1].1
    }

    pub fn last_key(&self) -> &Key {
        &self.entries[self.entries.len() - 1].0
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &View> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn items(&self) -> impl Iterator<Item = (&Key, &View)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// The `(key, view)` pair at frame index `n`.
    pub fn frame(&self, n: usize) -> Option<(&Key, &View)> {
        self.entries.get(n).map(|(k, v)| (k, v))
    }

    pub fn view(&self, n: usize) -> Option<&View> {
        self.entries.get(n).map(|(_, v)| v)
    }

    /// Bounds of the stack, taken from its top view.
    pub fn bounds(&self) -> Option<Bounds> {
        self.entries.last().and_then(|(_, v)| v.bounds())
    }

    pub fn title(&self) -> Option<&str> {
        self.top().title()
    }

    pub fn style_group(&self) -> &str {
        self.top().style_group()
    }

    /// Axis labels declared by the top view.
    pub fn labels(&self) -> (Option<&str>, Option<&str>) {
        let metadata = self.top().metadata();
        (metadata.xlabel.as_deref(), metadata.ylabel.as_deref())
    }

    /// Split a stack of overlays into one homogeneous stack per layer.
    ///
    /// Each returned stack has the same keys and dimensions as this one.
    /// Fails if this is not an overlay stack or its overlays disagree on
    /// the number or kinds of layers.
    pub fn split(&self) -> DataViewResult<Vec<Stack>> {
        let mut layered: Vec<Vec<(Key, View)>> = Vec::new();
        for (index, (key, view)) in self.entries.iter().enumerate() {
            let overlay = match view {
                View::SheetOverlay(overlay) | View::DataOverlay(overlay) => overlay,
                other => {
                    return Err(DataViewError::structure(format!(
                        "only overlay stacks can be split, found {}",
                        other.kind()
                    )));
                }
            };
            if index == 0 {
                layered = vec![Vec::with_capacity(self.entries.len()); overlay.len()];
            } else if overlay.len() != layered.len() {
                return Err(DataViewError::structure(format!(
                    "overlay at key {} has {} layers, expected {}",
                    key,
                    overlay.len(),
                    layered.len()
                )));
            }
            for (layer, entries) in overlay.layers().iter().zip(layered.iter_mut()) {
                entries.push((key.clone(), layer.clone()));
            }
        }

        layered
            .into_iter()
            .map(|entries| {
                let kind = entries
                    .first()
                    .map(|(_, view)| view.kind())
                    .ok_or_else(|| DataViewError::structure("overlay layer has no frames"))?;
                if let Some((key, view)) = entries.iter().find(|(_, view)| view.kind() != kind) {
                    return Err(DataViewError::structure(format!(
                        "layer kind changes from {} to {} at key {}",
                        kind,
                        view.kind(),
                        key
                    )));
                }
                Ok(Stack {
                    kind,
                    dimension_labels: self.dimension_labels.clone(),
                    entries,
                })
            })
            .collect()
    }

    /// The stack with every view restricted to its region of interest.
    pub fn roi(&self) -> Stack {
        Stack {
            kind: self.kind,
            dimension_labels: self.dimension_labels.clone(),
            entries: self
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), v.roi()))
                .collect(),
        }
    }
}

impl From<View> for Stack {
    fn from(view: View) -> Self {
        Stack::from_view(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{Bounds, DataCurves, Overlay, SheetPoints, SheetView};
    use ndarray::{Array2, array};

    fn unit() -> Bounds {
        Bounds::new(0.0, 0.0, 1.0, 1.0)
    }

    fn sheet(value: f64) -> SheetView {
        SheetView::new(Array2::from_elem((2, 2), value), unit())
    }

    #[test]
    fn test_key_equality_matches_ordering() {
        let nan = Key::new([1.0, f64::NAN]);
        assert_eq!(nan, nan.clone());
        assert_eq!(nan.cmp(&nan.clone()), Ordering::Equal);

        let (neg, pos) = (Key::scalar(-0.0), Key::scalar(0.0));
        assert_ne!(neg, pos);
        assert_eq!(neg.cmp(&pos), Ordering::Less);
        assert_ne!(Key::new([1.0]), Key::new([1.0, 2.0]));
    }

    #[test]
    fn test_entries_sorted_by_key() {
        let stack = Stack::from_items(
            vec!["time"],
            vec![(2.0, sheet(2.0)), (0.0, sheet(0.0)), (1.0, sheet(1.0))],
        )
        .expect("valid stack");

        let keys: Vec<f64> = stack.keys().map(|k| k.values()[0]).collect();
        assert_eq!(keys, vec![0.0, 1.0, 2.0]);
        match stack.top() {
            View::Sheet(top) => assert_eq!(top.max(), 2.0),
            other => panic!("unexpected top {:?}", other.kind()),
        }
    }

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut stack = Stack::from_items(vec!["time"], vec![(0.0, sheet(0.0))]).expect("valid");
        stack.insert(0.0, sheet(5.0)).expect("same key");
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_rejects_mixed_kinds() {
        let mut stack = Stack::from_items(vec!["time"], vec![(0.0, sheet(0.0))]).expect("valid");
        let points = SheetPoints::new(array![[0.5, 0.5]], unit()).expect("valid points");
        let err = stack.insert(1.0, points).expect_err("kind mismatch");
        assert!(matches!(err, DataViewError::Structure(_)));
    }

    #[test]
    fn test_rejects_incompatible_bounds() {
        let mut stack = Stack::from_items(vec!["time"], vec![(0.0, sheet(0.0))]).expect("valid");
        let other = SheetView::new(Array2::zeros((2, 2)), Bounds::new(0.0, 0.0, 2.0, 2.0));
        assert!(stack.insert(1.0, other).is_err());
    }

    #[test]
    fn test_rejects_wrong_key_arity() {
        let mut stack = Stack::from_items(vec!["time"], vec![(0.0, sheet(0.0))]).expect("valid");
        assert!(stack.insert([1.0, 2.0], sheet(1.0)).is_err());
    }

    #[test]
    fn test_split_overlay_stack() {
        let curve = |offset: f64| {
            DataCurves::new(vec![array![[0.0, offset], [1.0, offset + 1.0]]]).expect("valid")
        };
        let overlay = |t: f64| {
            Overlay::new(vec![curve(t).into(), curve(t + 10.0).into()]).expect("valid overlay")
        };
        let stack = Stack::from_items(vec!["time"], vec![(0.0, overlay(0.0)), (1.0, overlay(1.0))])
            .expect("valid");

        let layers = stack.split().expect("homogeneous overlays");
        assert_eq!(layers.len(), 2);
        for layer in &layers {
            assert_eq!(layer.kind(), ViewKind::DataCurves);
            assert_eq!(layer.len(), 2);
            assert_eq!(layer.dimension_labels(), stack.dimension_labels());
        }
    }

    #[test]
    fn test_split_rejects_ragged_overlays() {
        let curve = DataCurves::new(vec![array![[0.0, 0.0], [1.0, 1.0]]]).expect("valid");
        let one = Overlay::new(vec![curve.clone().into()]).expect("valid");
        let two = Overlay::new(vec![curve.clone().into(), curve.into()]).expect("valid");
        let stack = Stack::from_items(vec!["time"], vec![(0.0, one), (1.0, two)]).expect("valid");
        assert!(stack.split().is_err());
    }

    #[test]
    fn test_key_ordering_is_lexicographic() {
        assert!(Key::new(vec![0.0, 5.0]) < Key::new(vec![1.0, 0.0]));
        assert!(Key::new(vec![1.0, 0.0]) < Key::new(vec![1.0, 0.5]));
        assert_eq!(Key::scalar(3.0).to_string(), "(3)");
    }
}
