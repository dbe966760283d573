//! Scope-owner records: cells and libraries.
//!
//! Domain records live above this crate. The records here are the ones
//! the database itself creates when it opens a scope.

use std::fmt;

use edi_core::{impl_record, ObjectHeader, ObjectId, ObjectIndex, Record};

use crate::symbol::SymbolIndex;

/// A record that can own a storage scope.
///
/// The database records the scope's hierarchy index on the owner when the
/// scope is opened.
pub trait ScopeOwner: Record {
    /// Hierarchy index of the scope this record owns, or
    /// [`ObjectIndex::INVALID`] if it owns none.
    fn hier_index(&self) -> ObjectIndex;

    /// Record the hierarchy index of the scope this record owns.
    fn set_hier_index(&mut self, index: ObjectIndex);
}

/// Role of a cell in the design hierarchy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellType {
    /// Shares the scope of the cell that contains it.
    #[default]
    Leaf,
    /// A sub-cell with a scope of its own.
    Hier,
    /// The design's top cell.
    Top,
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf => write!(f, "leaf"),
            Self::Hier => write!(f, "hier"),
            Self::Top => write!(f, "top"),
        }
    }
}

/// A design cell.
#[derive(Clone, Debug, Default)]
pub struct Cell {
    header: ObjectHeader,
    cell_type: CellType,
    hier_index: ObjectIndex,
    name: Option<SymbolIndex>,
    cells: Option<ObjectId>,
}

impl Cell {
    /// Role of this cell.
    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    pub(crate) fn set_cell_type(&mut self, cell_type: CellType) {
        self.cell_type = cell_type;
    }

    /// Whether this cell owns a scope.
    pub fn is_hier(&self) -> bool {
        matches!(self.cell_type, CellType::Hier | CellType::Top)
    }

    /// Interned name, in the symbol table of the scope the cell owns or,
    /// for a leaf cell, the scope it lives in.
    pub fn name(&self) -> Option<SymbolIndex> {
        self.name
    }

    pub(crate) fn set_name(&mut self, name: SymbolIndex) {
        self.name = Some(name);
    }

    /// Id array of child cells, once the first child has been added.
    pub fn cells(&self) -> Option<ObjectId> {
        self.cells
    }

    pub(crate) fn set_cells(&mut self, array: ObjectId) {
        self.cells = Some(array);
    }
}

impl_record!(Cell);

impl ScopeOwner for Cell {
    fn hier_index(&self) -> ObjectIndex {
        self.hier_index
    }

    fn set_hier_index(&mut self, index: ObjectIndex) {
        self.hier_index = index;
    }
}

/// Technology library root.
#[derive(Clone, Debug, Default)]
pub struct Tech {
    header: ObjectHeader,
    hier_index: ObjectIndex,
    /// Id array of the library's layers, once the first is added.
    pub layers: Option<ObjectId>,
}

impl_record!(Tech);

impl ScopeOwner for Tech {
    fn hier_index(&self) -> ObjectIndex {
        self.hier_index
    }

    fn set_hier_index(&mut self, index: ObjectIndex) {
        self.hier_index = index;
    }
}

/// Timing library root.
#[derive(Clone, Debug, Default)]
pub struct Timing {
    header: ObjectHeader,
    hier_index: ObjectIndex,
    /// Id array of the library's timing models, once the first is added.
    pub models: Option<ObjectId>,
}

impl_record!(Timing);

impl ScopeOwner for Timing {
    fn hier_index(&self) -> ObjectIndex {
        self.hier_index
    }

    fn set_hier_index(&mut self, index: ObjectIndex) {
        self.hier_index = index;
    }
}
