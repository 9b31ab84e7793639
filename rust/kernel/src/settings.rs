// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Kernel tolerances and limits, optionally loaded from environment variables.

/// Tolerances and limits used by a [`crate::Kernel`].
#[derive(Debug, Clone, PartialEq)]
pub struct KernelSettings {
    /// Absolute per-coordinate tolerance for point equality and identity checks.
    pub precision: f64,
    /// Maximum distance of a loop point from the loop's plane.
    pub planarity_tolerance: f64,
    /// Maximum chord deviation when sampling circles.
    pub deflection_tolerance: f64,
    /// Lower bound on segments per full circle.
    pub min_circle_segments: usize,
    /// Upper bound on segments per full circle.
    pub max_circle_segments: usize,
    /// Hosts with more void relations than this are returned uncut.
    pub max_openings: usize,
    /// Distance under which vertices are merged after a boolean operation.
    pub weld_tolerance: f64,
}

impl Default for KernelSettings {
    fn default() -> Self {
        Self {
            precision: 1e-9,
            planarity_tolerance: 1e-6,
            deflection_tolerance: 1e-3,
            min_circle_segments: 12,
            max_circle_segments: 256,
            max_openings: 64,
            weld_tolerance: 1e-6,
        }
    }
}

impl KernelSettings {
    /// Load settings from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            precision: env_or("IFC_BREP_PRECISION", defaults.precision),
            planarity_tolerance: env_or(
                "IFC_BREP_PLANARITY_TOLERANCE",
                defaults.planarity_tolerance,
            ),
            deflection_tolerance: env_or(
                "IFC_BREP_DEFLECTION_TOLERANCE",
                defaults.deflection_tolerance,
            ),
            max_openings: env_or("IFC_BREP_MAX_OPENINGS", defaults.max_openings),
            ..defaults
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = KernelSettings::default();
        assert_eq!(settings.precision, 1e-9);
        assert_eq!(settings.max_openings, 64);
        assert!(settings.min_circle_segments < settings.max_circle_segments);
    }

    #[test]
    fn test_env_fallback_on_garbage() {
        assert_eq!(env_or("IFC_BREP_TEST_UNSET_VARIABLE", 7usize), 7);
        std::env::set_var("IFC_BREP_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("IFC_BREP_TEST_GARBAGE", 0.5f64), 0.5);
        std::env::set_var("IFC_BREP_TEST_VALUE", " 12 ");
        assert_eq!(env_or("IFC_BREP_TEST_VALUE", 3usize), 12);
    }

    #[test]
    fn test_from_env_reads_overrides() {
        std::env::set_var("IFC_BREP_MAX_OPENINGS", "3");
        std::env::set_var("IFC_BREP_PRECISION", "1e-6");
        std::env::set_var("IFC_BREP_PLANARITY_TOLERANCE", "loose");
        std::env::remove_var("IFC_BREP_DEFLECTION_TOLERANCE");

        let settings = KernelSettings::from_env();
        let defaults = KernelSettings::default();
        assert_eq!(settings.max_openings, 3);
        assert_eq!(settings.precision, 1e-6);
        assert_eq!(settings.planarity_tolerance, defaults.planarity_tolerance);
        assert_eq!(settings.deflection_tolerance, defaults.deflection_tolerance);
        assert_eq!(settings.weld_tolerance, defaults.weld_tolerance);
    }
}
