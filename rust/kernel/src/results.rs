// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion output: shapes with their style and placement.

use crate::placement::Placement;
use crate::shape::Shape;

/// Surface colour resolved from an `IfcSurfaceStyle`
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceStyle {
    /// Style entity id
    pub id: u32,
    pub name: Option<String>,
    /// RGB in 0..1
    pub rgb: Option<[f64; 3]>,
    /// 0 opaque, 1 fully transparent
    pub transparency: f64,
}

impl SurfaceStyle {
    /// RGBA with alpha derived from transparency
    pub fn rgba(&self) -> Option<[f64; 4]> {
        self.rgb
            .map(|[r, g, b]| [r, g, b, (1.0 - self.transparency).clamp(0.0, 1.0)])
    }
}

/// One shape produced from a representation item
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    /// Representation item the shape came from
    pub item_id: u32,
    pub shape: Shape,
    pub style: Option<SurfaceStyle>,
    /// Placement still to be applied to `shape`; `None` when the shape is
    /// already in its final frame
    pub placement: Option<Placement>,
}

impl ConversionResult {
    pub fn new(item_id: u32, shape: Shape) -> Self {
        Self {
            item_id,
            shape,
            style: None,
            placement: None,
        }
    }

    pub fn with_style(mut self, style: Option<SurfaceStyle>) -> Self {
        self.style = style;
        self
    }

    /// Effective placement, identity when absent
    pub fn placement_or_identity(&self) -> Placement {
        self.placement.unwrap_or_default()
    }

    /// Shape with its placement applied
    pub fn placed_shape(&self) -> Shape {
        match &self.placement {
            Some(placement) => self.shape.transformed(placement),
            None => self.shape.clone(),
        }
    }

    /// Prepend a placement: `outer * self.placement`
    pub fn place_in(&mut self, outer: &Placement) {
        self.placement = Some(*outer * self.placement_or_identity());
    }
}

/// Ordered results for one source entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionResults(Vec<ConversionResult>);

impl ConversionResults {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, result: ConversionResult) {
        self.0.push(result);
    }

    pub fn extend(&mut self, other: ConversionResults) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConversionResult> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ConversionResult> {
        self.0.iter_mut()
    }

    pub fn as_slice(&self) -> &[ConversionResult] {
        &self.0
    }

    /// Total volume of all placed shapes
    pub fn total_volume(&self) -> f64 {
        self.0.iter().map(|r| r.placed_shape().volume()).sum()
    }
}

impl From<Vec<ConversionResult>> for ConversionResults {
    fn from(results: Vec<ConversionResult>) -> Self {
        Self(results)
    }
}

impl IntoIterator for ConversionResults {
    type Item = ConversionResult;
    type IntoIter = std::vec::IntoIter<ConversionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConversionResults {
    type Item = &'a ConversionResult;
    type IntoIter = std::slice::Iter<'a, ConversionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<ConversionResult> for ConversionResults {
    fn from_iter<I: IntoIterator<Item = ConversionResult>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
