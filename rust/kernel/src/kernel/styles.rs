// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface colours attached to representation items through IfcStyledItem.

use super::Kernel;
use crate::results::SurfaceStyle;
use crate::Result;
use ifc_brep_core::{DecodedEntity, IfcType};

impl Kernel<'_> {
    /// Style of a representation item, if it carries a surface style
    ///
    /// Lookup errors are logged and treated as unstyled.
    pub(super) fn style_for(&self, item_id: u32) -> Option<SurfaceStyle> {
        let styled_item = self.source.style_of(item_id)?;
        match self.resolve_style(styled_item) {
            Ok(style) => style,
            Err(e) => {
                tracing::debug!(item = item_id, styled_item, error = %e, "Ignoring unreadable style");
                None
            }
        }
    }

    /// IfcStyledItem: Item, Styles, Name
    fn resolve_style(&self, styled_item: u32) -> Result<Option<SurfaceStyle>> {
        let styled = self.source.decode_by_id(styled_item)?;
        let styles = match styled.get(1) {
            Some(attr) => self.source.resolve_ref_list(attr)?,
            None => return Ok(None),
        };

        for style in styles {
            let surface = match style.ifc_type {
                IfcType::IfcSurfaceStyle => Some(style),
                // IFC2x3 wraps styles in an assignment
                IfcType::IfcPresentationStyleAssignment => self
                    .resolve_list(&style, 0, "Styles")?
                    .into_iter()
                    .find(|s| s.ifc_type == IfcType::IfcSurfaceStyle),
                _ => None,
            };
            if let Some(surface) = surface {
                return self.surface_style(&surface).map(Some);
            }
        }
        Ok(None)
    }

    /// IfcSurfaceStyle: Name, Side, Styles
    fn surface_style(&self, surface: &DecodedEntity) -> Result<SurfaceStyle> {
        let mut style = SurfaceStyle {
            id: surface.id,
            name: surface.get_string(0).map(str::to_owned),
            rgb: None,
            transparency: 0.0,
        };

        for element in self.resolve_list(surface, 2, "Styles")? {
            if !matches!(
                element.ifc_type,
                IfcType::IfcSurfaceStyleShading | IfcType::IfcSurfaceStyleRendering
            ) {
                continue;
            }
            if let Some(colour) = self.resolve_optional(&element, 0)? {
                style.rgb = colour_rgb(&colour);
            }
            style.transparency = element.get_float(1).unwrap_or(0.0).clamp(0.0, 1.0);
            break;
        }
        Ok(style)
    }
}

/// IfcColourRgb: Name, Red, Green, Blue
fn colour_rgb(colour: &DecodedEntity) -> Option<[f64; 3]> {
    if colour.ifc_type != IfcType::IfcColourRgb {
        return None;
    }
    Some([
        colour.get_float(1)?.clamp(0.0, 1.0),
        colour.get_float(2)?.clamp(0.0, 1.0),
        colour.get_float(3)?.clamp(0.0, 1.0),
    ])
}
