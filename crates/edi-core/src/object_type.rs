//! The closed set of record type tags.
//!
//! Every record stored in a pool carries one [`ObjectType`]. The tag picks
//! the typed arena at allocation time and is embedded in the record's
//! [`ObjectId`](crate::ObjectId) so resolution can be sanity-checked.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseObjectTypeError;

macro_rules! object_types {
    ($( $(#[$meta:meta])* $variant:ident = $value:literal $(=> $name:literal)? ),+ $(,)?) => {
        /// Record kind tag.
        ///
        /// Discriminants are stable and fit in a byte; 0 is reserved so a
        /// zeroed tag never decodes to a real kind.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum ObjectType {
            $( $(#[$meta])* $variant = $value, )+
        }

        impl ObjectType {
            /// Every tag, in discriminant order.
            pub const ALL: &'static [ObjectType] = &[ $( ObjectType::$variant, )+ ];

            /// Decode a tag from its discriminant.
            pub fn from_u8(value: u8) -> Option<Self> {
                match value {
                    $( $value => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Upper-case display name used by format readers and writers.
            ///
            /// Kinds without a format-level name report `"UNKNOWN"`.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => object_types!(@name $($name)?), )+
                }
            }
        }
    };
    (@name $name:literal) => { $name };
    (@name) => { "UNKNOWN" };
}

object_types! {
    // Design hierarchy
    /// A cell: top design, hierarchical sub-cell or leaf master.
    Cell = 1 => "DESIGN",
    /// Per-cell hierarchical data block.
    HierData = 2,
    /// Floorplan of a cell.
    Floorplan = 3,
    /// Site pattern of a cell.
    CellSitePattern = 4,
    /// Foreign cell reference.
    Foreign = 5,
    /// Density constraint.
    Density = 6,
    /// Per-layer density constraint.
    DensityLayer = 7,
    /// Cell terminal.
    Term = 8 => "PORT",
    /// Bus of terminals.
    Bus = 9,
    /// Terminal shape.
    Port = 10 => "PORTSHAPE",
    /// Cell instance.
    Inst = 11 => "INST",
    /// Instance pin.
    Pin = 12 => "PIN",
    /// Pin antenna area.
    PinAntennaArea = 13,
    /// Signal net.
    Net = 14 => "NET",
    /// Special (power/ground) net.
    SpecialNet = 15 => "SPECIALNET",
    /// Routed wire segment.
    Wire = 16,
    /// Special wire segment.
    SpecialWire = 17,
    /// Via placement.
    Via = 18 => "VIA",
    // Technology
    /// Technology library root.
    Tech = 19,
    /// Technology units.
    Units = 20,
    /// Routing, cut or masterslice layer.
    Layer = 21 => "LAYER",
    /// Layer minimum area rule.
    LayerMinArea = 22,
    /// Via master definition.
    ViaMaster = 23,
    /// Via generation rule.
    ViaRule = 24 => "VIARULE",
    /// Non-default routing rule.
    NonDefaultRule = 25 => "NONDEFAULTRULE",
    /// Placement site.
    Site = 26,
    /// Placement row.
    Row = 27 => "ROW",
    /// Routing track.
    Track = 28,
    /// Global routing cell grid.
    GcellGrid = 29,
    /// Metal fill.
    Fill = 30,
    /// Scan chain.
    ScanChain = 31,
    /// Placement region.
    Region = 32 => "REGION",
    /// Physical constraint.
    PhysicalConstraint = 33,
    /// Grid.
    Grid = 34,
    /// Shape.
    Shape = 35,
    /// Per-layer geometry.
    LayerGeometry = 36,
    /// Geometry.
    Geometry = 37,
    /// Marker.
    Marker = 38,
    /// Group of instances.
    Group = 39 => "GROUP",
    // Timing
    /// Timing library root.
    Timing = 40,
    /// Clock.
    Clock = 41,
    /// Analysis view.
    AnalysisView = 42,
    /// Analysis corner.
    AnalysisCorner = 43,
    /// Analysis mode.
    AnalysisMode = 44,
    /// Timing library.
    TLib = 45,
    /// Timing cell.
    TCell = 46,
    /// Timing terminal.
    TTerm = 47,
    /// Timing power/ground terminal.
    TPgTerm = 48,
    /// Arc.
    Arc = 49,
    /// Timing design.
    Design = 50 => "DESIGN",
    /// Library set.
    LibSet = 51,
    /// Operating conditions.
    OperatingConditions = 52,
    /// Timing units.
    TUnits = 53,
    /// Process/voltage/temperature point.
    TPvt = 54,
    /// Wire load table.
    WireLoadTable = 55,
    /// Wire load model.
    WireLoad = 56,
    /// Wire load for area.
    WireLoadForArea = 57,
    /// Wire load selection.
    WireLoadSelection = 58,
    /// Table axis.
    TableAxis = 59,
    /// Table template.
    TableTemplate = 60,
    /// Timing table.
    TimingTable = 61,
    /// Scale factors.
    ScaleFactors = 62,
    /// Timing function.
    TFunction = 63,
    /// Timing arc.
    TimingArc = 64,
    /// Timing arc data.
    TimingArcData = 65,
    /// Design parasitics.
    DesignParasitics = 66,
    /// Net parasitics.
    NetParasitics = 67,
    /// Parasitic node.
    ParasiticNode = 68,
    /// Sequential timing data.
    TimingSequential = 69,
    // Misc
    /// Property definition.
    PropertyDefinition = 70,
    /// Property value.
    Property = 71,
    /// Pool-resident dynamic array.
    Array = 72,
    /// Segment of a dynamic array.
    ArraySegment = 73,
    /// Format library.
    Library = 74 => "LIBRARY",
    /// Format macro.
    Macro = 75 => "MACRO",
    /// Format component.
    Component = 76 => "COMPONENT",
    /// Format component pin.
    ComponentPin = 77 => "COMPONENTPIN",
}

impl ObjectType {
    /// Discriminant of this tag.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            "UNKNOWN" => write!(f, "{self:?}"),
            name => f.write_str(name),
        }
    }
}

impl FromStr for ObjectType {
    type Err = ParseObjectTypeError;

    /// Case-insensitive lookup by display name. When two kinds share a
    /// name, the one with the lower discriminant wins.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name() != "UNKNOWN" && t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseObjectTypeError {
                input: s.to_string(),
            })
    }
}

impl TryFrom<u8> for ObjectType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_tag() {
        assert_eq!(ObjectType::from_u8(0), None);
        assert_eq!(ObjectType::try_from(0u8), Err(0));
    }

    #[test]
    fn discriminants_decode_back() {
        for &t in ObjectType::ALL {
            assert_eq!(ObjectType::from_u8(t.as_u8()), Some(t));
        }
    }

    #[test]
    fn discriminants_are_dense() {
        for (i, &t) in ObjectType::ALL.iter().enumerate() {
            assert_eq!(t.as_u8() as usize, i + 1);
        }
    }

    #[test]
    fn format_names() {
        assert_eq!(ObjectType::Cell.name(), "DESIGN");
        assert_eq!(ObjectType::Term.name(), "PORT");
        assert_eq!(ObjectType::Port.name(), "PORTSHAPE");
        assert_eq!(ObjectType::Wire.name(), "UNKNOWN");
    }

    #[test]
    fn display_falls_back_to_variant_name() {
        assert_eq!(ObjectType::Inst.to_string(), "INST");
        assert_eq!(ObjectType::Wire.to_string(), "Wire");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("inst".parse::<ObjectType>(), Ok(ObjectType::Inst));
        assert_eq!("SpecialNet".parse::<ObjectType>(), Ok(ObjectType::SpecialNet));
    }

    #[test]
    fn parse_shared_name_prefers_lower_discriminant() {
        assert_eq!("design".parse::<ObjectType>(), Ok(ObjectType::Cell));
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "unknown".parse::<ObjectType>().unwrap_err();
        assert_eq!(err.input, "unknown");
        assert!("WIRE".parse::<ObjectType>().is_err());
    }
}
