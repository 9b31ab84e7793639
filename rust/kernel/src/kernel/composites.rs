// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Containers of several items: representations, mapped items, surface
//! models and products.

use super::{shape_type, Kernel, ShapeType};
use crate::placement::Placement;
use crate::results::{ConversionResult, ConversionResults};
use crate::{Error, Result};
use ifc_brep_core::{DecodedEntity, IfcType};

/// Representation identifiers that never carry body geometry
const NON_BODY_REPRESENTATIONS: &[&str] = &["Axis", "FootPrint", "Box", "Annotation", "Profile"];

impl Kernel<'_> {
    pub(super) fn convert_composite(&self, entity: &DecodedEntity) -> Result<ConversionResults> {
        match entity.ifc_type {
            IfcType::IfcShapeRepresentation => {
                let items = self.resolve_list(entity, 3, "Items")?;
                self.convert_items(entity, &items)
            }
            IfcType::IfcProductDefinitionShape => self.convert_product_definition(entity),
            IfcType::IfcMappedItem => self.convert_mapped_item(entity),
            IfcType::IfcShellBasedSurfaceModel | IfcType::IfcFaceBasedSurfaceModel => {
                self.convert_surface_model(entity)
            }
            IfcType::IfcConnectedFaceSet => {
                let shape = self.face_set(entity)?;
                Ok(self.single_result(entity, shape))
            }
            ty if ty.is_product() => self.convert_product(entity),
            _ => Err(Error::UnsupportedEntity {
                id: entity.id,
                ifc_type: entity.ifc_type,
            }),
        }
    }

    /// Convert every item, skipping the ones that fail
    ///
    /// Fails when there were items and none of them converted.
    fn convert_items(&self, parent: &DecodedEntity, items: &[DecodedEntity]) -> Result<ConversionResults> {
        let mut results = ConversionResults::new();
        for item in items {
            if shape_type(item) == ShapeType::Unknown {
                tracing::warn!(parent = parent.id, id = item.id, ifc_type = %item.ifc_type, "Skipping unsupported item");
                continue;
            }
            match self.convert_shape(item) {
                Ok(converted) => results.extend(converted),
                Err(e) => {
                    tracing::warn!(parent = parent.id, id = item.id, error = %e, "Skipping item that failed to convert");
                }
            }
        }
        if results.is_empty() && !items.is_empty() {
            return Err(Error::degenerate(format!(
                "none of the {} items of {} #{} converted",
                items.len(),
                parent.ifc_type,
                parent.id
            )));
        }
        Ok(results)
    }

    /// IfcProductDefinitionShape: Name, Description, Representations
    ///
    /// Body representations win; without any, every representation that is
    /// not a known non-body kind is used.
    fn convert_product_definition(&self, entity: &DecodedEntity) -> Result<ConversionResults> {
        let representations = self.resolve_list(entity, 2, "Representations")?;
        let identifier = |r: &DecodedEntity| r.get_string(1).unwrap_or_default().to_owned();

        let body: Vec<DecodedEntity> = representations
            .iter()
            .filter(|r| identifier(*r).eq_ignore_ascii_case("Body"))
            .cloned()
            .collect();
        let chosen = if body.is_empty() {
            representations
                .into_iter()
                .filter(|r| {
                    let id = identifier(r);
                    !NON_BODY_REPRESENTATIONS
                        .iter()
                        .any(|skip| id.eq_ignore_ascii_case(skip))
                })
                .collect()
        } else {
            body
        };

        self.convert_items(entity, &chosen)
    }

    /// IfcMappedItem: MappingSource, MappingTarget
    ///
    /// Results of the mapped representation are placed by
    /// `MappingTarget * MappingOrigin`.
    fn convert_mapped_item(&self, entity: &DecodedEntity) -> Result<ConversionResults> {
        let source = self.resolve(entity, 0, "MappingSource")?;
        let origin = match self.resolve_optional(&source, 0)? {
            Some(origin) => self.convert_placement(&origin)?,
            None => Placement::identity(),
        };
        let target = match self.resolve_optional(entity, 1)? {
            Some(target) => self.convert_placement(&target)?,
            None => Placement::identity(),
        };
        let mapped = self.resolve(&source, 1, "MappedRepresentation")?;

        let mut results = self.convert_shape(&mapped)?;
        let transform = target * origin;
        let style = self.style_for(entity.id);
        for result in results.iter_mut() {
            result.place_in(&transform);
            if result.style.is_none() {
                result.style = style.clone();
            }
        }
        Ok(results)
    }

    /// One result per shell of a surface model
    fn convert_surface_model(&self, entity: &DecodedEntity) -> Result<ConversionResults> {
        let style = self.style_for(entity.id);
        let shells = self.resolve_list(entity, 0, "Boundary")?;
        let mut results = ConversionResults::new();
        for shell in &shells {
            match self.face_set(shell) {
                Ok(shape) => {
                    results.push(ConversionResult::new(shell.id, shape).with_style(style.clone()))
                }
                Err(e) => {
                    tracing::warn!(model = entity.id, shell = shell.id, error = %e, "Skipping shell");
                }
            }
        }
        if results.is_empty() && !shells.is_empty() {
            return Err(Error::degenerate(format!(
                "no shell of {} #{} converted",
                entity.ifc_type, entity.id
            )));
        }
        Ok(results)
    }

    /// Product geometry in world coordinates with its openings cut
    fn convert_product(&self, product: &DecodedEntity) -> Result<ConversionResults> {
        let (mut results, placement) = self.product_local(product)?;

        if product.ifc_type != IfcType::IfcOpeningElement && !results.is_empty() {
            let openings = self.source.voids_of(product.id);
            if !openings.is_empty() {
                results = self.convert_openings(product, &openings, &results, &placement)?;
            }
        }

        for result in results.iter_mut() {
            result.place_in(&placement);
        }
        tracing::debug!(id = product.id, ifc_type = %product.ifc_type, shapes = results.len(), "Converted product");
        Ok(results)
    }

    /// Product geometry in the product's own frame, and that frame
    ///
    /// A product without a representation has no geometry. One whose
    /// representation yields nothing is an error.
    pub(super) fn product_local(&self, product: &DecodedEntity) -> Result<(ConversionResults, Placement)> {
        let placement = self.product_placement(product)?;
        let results = match self.resolve_optional(product, 6)? {
            Some(representation) => {
                let results = self.convert_shape(&representation)?;
                if results.is_empty() {
                    return Err(Error::degenerate(format!(
                        "{} #{} has a representation without usable geometry",
                        product.ifc_type, product.id
                    )));
                }
                results
            }
            None => ConversionResults::new(),
        };
        Ok((results, placement))
    }
}
