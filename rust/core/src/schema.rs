// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC Schema Types
//!
//! Fast type checking using an enum instead of string comparison.

use std::fmt;

/// IFC entity types understood by the conversion kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IfcType {
    // Building elements
    IfcWall,
    IfcWallStandardCase,
    IfcSlab,
    IfcBeam,
    IfcColumn,
    IfcRoof,
    IfcPlate,
    IfcMember,
    IfcCovering,
    IfcFooting,
    IfcBuildingElementProxy,

    // Openings and fillings
    IfcDoor,
    IfcWindow,
    IfcOpeningElement,

    // Relationships
    IfcRelVoidsElement,

    // Representation
    IfcProductDefinitionShape,
    IfcShapeRepresentation,
    IfcRepresentationMap,
    IfcMappedItem,

    // Presentation
    IfcStyledItem,
    IfcPresentationStyleAssignment,
    IfcSurfaceStyle,
    IfcSurfaceStyleShading,
    IfcSurfaceStyleRendering,
    IfcColourRgb,

    // Placement
    IfcLocalPlacement,
    IfcAxis2Placement2D,
    IfcAxis2Placement3D,
    IfcCartesianTransformationOperator3D,
    IfcCartesianPoint,
    IfcDirection,

    // Curves
    IfcPolyline,
    IfcCircle,
    IfcIndexedPolyCurve,
    IfcCartesianPointList2D,
    IfcCartesianPointList3D,

    // Topology
    IfcPolyLoop,
    IfcFaceBound,
    IfcFaceOuterBound,
    IfcFace,
    IfcConnectedFaceSet,
    IfcClosedShell,
    IfcOpenShell,

    // Solids
    IfcFacetedBrep,
    IfcExtrudedAreaSolid,
    IfcBooleanResult,
    IfcBooleanClippingResult,
    IfcHalfSpaceSolid,
    IfcPlane,

    // Surface models
    IfcShellBasedSurfaceModel,
    IfcFaceBasedSurfaceModel,

    // Profiles
    IfcArbitraryClosedProfileDef,
    IfcArbitraryProfileDefWithVoids,
    IfcRectangleProfileDef,
    IfcCircleProfileDef,

    /// Fallback for unknown types, keeps a hash of the type name
    Unknown(u16),
}

impl IfcType {
    /// Parse IFC type from an upper or mixed case STEP type name
    pub fn from_name(s: &str) -> Self {
        let upper = s.to_ascii_uppercase();
        match upper.as_str() {
            "IFCWALL" => Self::IfcWall,
            "IFCWALLSTANDARDCASE" => Self::IfcWallStandardCase,
            "IFCSLAB" => Self::IfcSlab,
            "IFCBEAM" => Self::IfcBeam,
            "IFCCOLUMN" => Self::IfcColumn,
            "IFCROOF" => Self::IfcRoof,
            "IFCPLATE" => Self::IfcPlate,
            "IFCMEMBER" => Self::IfcMember,
            "IFCCOVERING" => Self::IfcCovering,
            "IFCFOOTING" => Self::IfcFooting,
            "IFCBUILDINGELEMENTPROXY" => Self::IfcBuildingElementProxy,

            "IFCDOOR" => Self::IfcDoor,
            "IFCWINDOW" => Self::IfcWindow,
            "IFCOPENINGELEMENT" => Self::IfcOpeningElement,

            "IFCRELVOIDSELEMENT" => Self::IfcRelVoidsElement,

            "IFCPRODUCTDEFINITIONSHAPE" => Self::IfcProductDefinitionShape,
            "IFCSHAPEREPRESENTATION" => Self::IfcShapeRepresentation,
            "IFCREPRESENTATIONMAP" => Self::IfcRepresentationMap,
            "IFCMAPPEDITEM" => Self::IfcMappedItem,

            "IFCSTYLEDITEM" => Self::IfcStyledItem,
            "IFCPRESENTATIONSTYLEASSIGNMENT" => Self::IfcPresentationStyleAssignment,
            "IFCSURFACESTYLE" => Self::IfcSurfaceStyle,
            "IFCSURFACESTYLESHADING" => Self::IfcSurfaceStyleShading,
            "IFCSURFACESTYLERENDERING" => Self::IfcSurfaceStyleRendering,
            "IFCCOLOURRGB" => Self::IfcColourRgb,

            "IFCLOCALPLACEMENT" => Self::IfcLocalPlacement,
            "IFCAXIS2PLACEMENT2D" => Self::IfcAxis2Placement2D,
            "IFCAXIS2PLACEMENT3D" => Self::IfcAxis2Placement3D,
            "IFCCARTESIANTRANSFORMATIONOPERATOR3D" => Self::IfcCartesianTransformationOperator3D,
            "IFCCARTESIANPOINT" => Self::IfcCartesianPoint,
            "IFCDIRECTION" => Self::IfcDirection,

            "IFCPOLYLINE" => Self::IfcPolyline,
            "IFCCIRCLE" => Self::IfcCircle,
            "IFCINDEXEDPOLYCURVE" => Self::IfcIndexedPolyCurve,
            "IFCCARTESIANPOINTLIST2D" => Self::IfcCartesianPointList2D,
            "IFCCARTESIANPOINTLIST3D" => Self::IfcCartesianPointList3D,

            "IFCPOLYLOOP" => Self::IfcPolyLoop,
            "IFCFACEBOUND" => Self::IfcFaceBound,
            "IFCFACEOUTERBOUND" => Self::IfcFaceOuterBound,
            "IFCFACE" => Self::IfcFace,
            "IFCCONNECTEDFACESET" => Self::IfcConnectedFaceSet,
            "IFCCLOSEDSHELL" => Self::IfcClosedShell,
            "IFCOPENSHELL" => Self::IfcOpenShell,

            "IFCFACETEDBREP" => Self::IfcFacetedBrep,
            "IFCEXTRUDEDAREASOLID" => Self::IfcExtrudedAreaSolid,
            "IFCBOOLEANRESULT" => Self::IfcBooleanResult,
            "IFCBOOLEANCLIPPINGRESULT" => Self::IfcBooleanClippingResult,
            "IFCHALFSPACESOLID" => Self::IfcHalfSpaceSolid,
            "IFCPLANE" => Self::IfcPlane,

            "IFCSHELLBASEDSURFACEMODEL" => Self::IfcShellBasedSurfaceModel,
            "IFCFACEBASEDSURFACEMODEL" => Self::IfcFaceBasedSurfaceModel,

            "IFCARBITRARYCLOSEDPROFILEDEF" => Self::IfcArbitraryClosedProfileDef,
            "IFCARBITRARYPROFILEDEFWITHVOIDS" => Self::IfcArbitraryProfileDefWithVoids,
            "IFCRECTANGLEPROFILEDEF" => Self::IfcRectangleProfileDef,
            "IFCCIRCLEPROFILEDEF" => Self::IfcCircleProfileDef,

            _ => Self::Unknown(name_hash(&upper)),
        }
    }

    /// STEP type name in upper case
    pub fn name(&self) -> &'static str {
        match self {
            Self::IfcWall => "IFCWALL",
            Self::IfcWallStandardCase => "IFCWALLSTANDARDCASE",
            Self::IfcSlab => "IFCSLAB",
            Self::IfcBeam => "IFCBEAM",
            Self::IfcColumn => "IFCCOLUMN",
            Self::IfcRoof => "IFCROOF",
            Self::IfcPlate => "IFCPLATE",
            Self::IfcMember => "IFCMEMBER",
            Self::IfcCovering => "IFCCOVERING",
            Self::IfcFooting => "IFCFOOTING",
            Self::IfcBuildingElementProxy => "IFCBUILDINGELEMENTPROXY",
            Self::IfcDoor => "IFCDOOR",
            Self::IfcWindow => "IFCWINDOW",
            Self::IfcOpeningElement => "IFCOPENINGELEMENT",
            Self::IfcRelVoidsElement => "IFCRELVOIDSELEMENT",
            Self::IfcProductDefinitionShape => "IFCPRODUCTDEFINITIONSHAPE",
            Self::IfcShapeRepresentation => "IFCSHAPEREPRESENTATION",
            Self::IfcRepresentationMap => "IFCREPRESENTATIONMAP",
            Self::IfcMappedItem => "IFCMAPPEDITEM",
            Self::IfcStyledItem => "IFCSTYLEDITEM",
            Self::IfcPresentationStyleAssignment => "IFCPRESENTATIONSTYLEASSIGNMENT",
            Self::IfcSurfaceStyle => "IFCSURFACESTYLE",
            Self::IfcSurfaceStyleShading => "IFCSURFACESTYLESHADING",
            Self::IfcSurfaceStyleRendering => "IFCSURFACESTYLERENDERING",
            Self::IfcColourRgb => "IFCCOLOURRGB",
            Self::IfcLocalPlacement => "IFCLOCALPLACEMENT",
            Self::IfcAxis2Placement2D => "IFCAXIS2PLACEMENT2D",
            Self::IfcAxis2Placement3D => "IFCAXIS2PLACEMENT3D",
            Self::IfcCartesianTransformationOperator3D => "IFCCARTESIANTRANSFORMATIONOPERATOR3D",
            Self::IfcCartesianPoint => "IFCCARTESIANPOINT",
            Self::IfcDirection => "IFCDIRECTION",
            Self::IfcPolyline => "IFCPOLYLINE",
            Self::IfcCircle => "IFCCIRCLE",
            Self::IfcIndexedPolyCurve => "IFCINDEXEDPOLYCURVE",
            Self::IfcCartesianPointList2D => "IFCCARTESIANPOINTLIST2D",
            Self::IfcCartesianPointList3D => "IFCCARTESIANPOINTLIST3D",
            Self::IfcPolyLoop => "IFCPOLYLOOP",
            Self::IfcFaceBound => "IFCFACEBOUND",
            Self::IfcFaceOuterBound => "IFCFACEOUTERBOUND",
            Self::IfcFace => "IFCFACE",
            Self::IfcConnectedFaceSet => "IFCCONNECTEDFACESET",
            Self::IfcClosedShell => "IFCCLOSEDSHELL",
            Self::IfcOpenShell => "IFCOPENSHELL",
            Self::IfcFacetedBrep => "IFCFACETEDBREP",
            Self::IfcExtrudedAreaSolid => "IFCEXTRUDEDAREASOLID",
            Self::IfcBooleanResult => "IFCBOOLEANRESULT",
            Self::IfcBooleanClippingResult => "IFCBOOLEANCLIPPINGRESULT",
            Self::IfcHalfSpaceSolid => "IFCHALFSPACESOLID",
            Self::IfcPlane => "IFCPLANE",
            Self::IfcShellBasedSurfaceModel => "IFCSHELLBASEDSURFACEMODEL",
            Self::IfcFaceBasedSurfaceModel => "IFCFACEBASEDSURFACEMODEL",
            Self::IfcArbitraryClosedProfileDef => "IFCARBITRARYCLOSEDPROFILEDEF",
            Self::IfcArbitraryProfileDefWithVoids => "IFCARBITRARYPROFILEDEFWITHVOIDS",
            Self::IfcRectangleProfileDef => "IFCRECTANGLEPROFILEDEF",
            Self::IfcCircleProfileDef => "IFCCIRCLEPROFILEDEF",
            Self::Unknown(_) => "UNKNOWN",
        }
    }

    /// Check if this is a product type that carries a shape representation
    pub fn is_product(&self) -> bool {
        matches!(
            self,
            Self::IfcWall
                | Self::IfcWallStandardCase
                | Self::IfcSlab
                | Self::IfcBeam
                | Self::IfcColumn
                | Self::IfcRoof
                | Self::IfcPlate
                | Self::IfcMember
                | Self::IfcCovering
                | Self::IfcFooting
                | Self::IfcBuildingElementProxy
                | Self::IfcDoor
                | Self::IfcWindow
                | Self::IfcOpeningElement
        )
    }
}

/// Fold a type name into 16 bits for `IfcType::Unknown`
fn name_hash(name: &str) -> u16 {
    name.bytes()
        .fold(0u16, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u16))
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
