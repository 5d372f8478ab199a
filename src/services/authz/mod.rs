pub mod gate;
pub mod operation;
pub mod params;
pub mod role_table;

pub use gate::{Attribution, Gate, OperationRequest, ValidatedJob};
pub use operation::OperationTag;
pub use params::ValidatedParameters;
pub use role_table::{RoleRequirementTable, RoleTableError};
