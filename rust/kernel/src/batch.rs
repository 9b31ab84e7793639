// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parallel conversion of many products.

use crate::kernel::Kernel;
use crate::results::ConversionResults;
use crate::settings::KernelSettings;
use crate::Result;
use ifc_brep_core::EntitySource;
use rayon::prelude::*;
use std::time::Instant;

/// Convert products in parallel, one [`Kernel`] per rayon worker
///
/// The output has one entry per id, in input order. A failing product only
/// affects its own entry.
pub fn convert_products_parallel<S>(
    source: &S,
    ids: &[u32],
    settings: &KernelSettings,
) -> Vec<Result<ConversionResults>>
where
    S: EntitySource + Sync,
{
    let start = Instant::now();
    tracing::info!(products = ids.len(), "Converting products");

    let results: Vec<Result<ConversionResults>> = ids
        .par_iter()
        .map_init(
            || Kernel::with_settings(source, settings.clone()),
            |kernel, &id| {
                let converted = kernel.convert_shapes_by_id(id);
                if let Err(e) = &converted {
                    tracing::debug!(id, error = %e, "Product failed to convert");
                }
                converted
            },
        )
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    tracing::info!(
        products = ids.len(),
        failed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Converted products"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use approx::assert_relative_eq;
    use ifc_brep_core::{EntityStore, IfcType};

    #[test]
    fn test_results_follow_input_order() {
        let mut store = EntityStore::new();
        let mut ids = Vec::new();
        for i in 1..=8 {
            let size = i as f64;
            let item = store.add_rectangle_extrusion(size, 1.0, 1.0, [0.0; 3]);
            let shape = store.add_body_representation(&[item]);
            ids.push(store.add_product(IfcType::IfcSlab, None, Some(shape)));
        }
        ids.push(9999);

        let results = convert_products_parallel(&store, &ids, &KernelSettings::default());
        assert_eq!(results.len(), ids.len());
        for (i, result) in results.iter().take(8).enumerate() {
            let volume = result.as_ref().unwrap().total_volume();
            assert_relative_eq!(volume, (i + 1) as f64, epsilon = 1e-9);
        }
        assert!(matches!(
            results[8],
            Err(Error::CoreError(ifc_brep_core::Error::EntityNotFound(9999)))
        ));
    }

    #[test]
    fn test_product_without_usable_geometry_counts_as_failure() {
        let mut store = EntityStore::new();
        let flat = store.add_rectangle_extrusion(1.0, 1.0, 0.0, [0.0; 3]);
        let shape = store.add_body_representation(&[flat]);
        let wall = store.add_product(IfcType::IfcWall, None, Some(shape));

        let results = convert_products_parallel(&store, &[wall], &KernelSettings::default());
        assert!(matches!(results[0], Err(Error::DegenerateGeometry(_))));
    }
}
