// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subtraction of IfcOpeningElement voids from their host product.

use super::Kernel;
use crate::nef::NefPolyhedron;
use crate::placement::Placement;
use crate::results::{ConversionResult, ConversionResults};
use crate::shape::Shape;
use crate::{Error, Result};
use ifc_brep_core::DecodedEntity;

/// Opening shape already moved into the host product's frame
struct Cutter {
    opening_id: u32,
    shape: Shape,
}

impl Kernel<'_> {
    /// Cut openings out of a product's shapes
    ///
    /// `openings` are IfcRelVoidsElement ids, subtracted one after another
    /// in the given order. `entity_shapes` are the host's results in its own
    /// frame and `entity_trsf` is the host's object placement. Openings that
    /// fail to convert or to subtract are skipped with a warning. The
    /// returned results are in the host frame and carry no placement.
    pub fn convert_openings(
        &self,
        entity: &DecodedEntity,
        openings: &[u32],
        entity_shapes: &ConversionResults,
        entity_trsf: &Placement,
    ) -> Result<ConversionResults> {
        if openings.len() > self.settings.max_openings {
            tracing::warn!(
                id = entity.id,
                openings = openings.len(),
                limit = self.settings.max_openings,
                "Too many openings, returning host uncut"
            );
            return Ok(entity_shapes
                .iter()
                .map(|r| ConversionResult::new(r.item_id, r.placed_shape()).with_style(r.style.clone()))
                .collect());
        }

        let to_host = entity_trsf.inverse().ok_or_else(|| {
            Error::degenerate(format!("{} #{} has a singular placement", entity.ifc_type, entity.id))
        })?;

        let mut cutters = Vec::new();
        for &relation in openings {
            match self.opening_cutters(relation, &to_host) {
                Ok(shapes) => cutters.extend(shapes),
                Err(e) => {
                    tracing::warn!(host = entity.id, relation, error = %e, "Skipping opening that failed to convert");
                }
            }
        }

        let mut results = ConversionResults::new();
        for host in entity_shapes.iter() {
            let mut shape = host.placed_shape();
            for cutter in &cutters {
                match self.subtract(&shape, &cutter.shape) {
                    Ok(cut) => shape = cut,
                    Err(e) => {
                        tracing::warn!(
                            host = entity.id,
                            item = host.item_id,
                            opening = cutter.opening_id,
                            error = %e,
                            "Opening not subtracted"
                        );
                    }
                }
            }
            results.push(ConversionResult::new(host.item_id, shape).with_style(host.style.clone()));
        }

        tracing::debug!(id = entity.id, openings = cutters.len(), "Subtracted openings");
        Ok(results)
    }

    /// Shapes of the opening related by an IfcRelVoidsElement, in the host
    /// frame
    fn opening_cutters(&self, relation_id: u32, to_host: &Placement) -> Result<Vec<Cutter>> {
        let relation = self.source.decode_by_id(relation_id)?;
        let opening = self.resolve(&relation, 5, "RelatedOpeningElement")?;
        let (results, opening_trsf) = self.product_local(&opening)?;
        let into_host = *to_host * opening_trsf;

        Ok(results
            .iter()
            .map(|r| Cutter {
                opening_id: opening.id,
                shape: r.shape.transformed(&(into_host * r.placement_or_identity())),
            })
            .filter(|c| !c.shape.is_empty())
            .collect())
    }

    /// `host - opening`, rejecting results that are not a usable solid
    fn subtract(&self, host: &Shape, opening: &Shape) -> Result<Shape> {
        let precision = self.settings.precision;
        let a = NefPolyhedron::from_shape(host, precision)?;
        let b = NefPolyhedron::from_shape(opening, precision)?;
        let cut = a.difference(&b).to_shape(self.settings.weld_tolerance);

        if cut.facet_count() < 4 || !cut.is_finite() || cut.volume() <= precision {
            return Err(Error::BooleanFailure(format!(
                "difference left {} facets",
                cut.facet_count()
            )));
        }
        Ok(cut)
    }
}
