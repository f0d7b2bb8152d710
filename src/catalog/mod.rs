//! Catalog for managing routine declarations.

mod routine;

pub use routine::{RoutineCatalog, RoutineDeclaration, RoutineParameter};
