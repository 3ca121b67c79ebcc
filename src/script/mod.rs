pub mod conversion;
pub mod definition;
pub mod editor;
pub mod naming;
pub mod rules;
pub mod snapshot;
pub mod store;
pub mod validate;

pub use conversion::*;
pub use definition::*;
pub use editor::*;
pub use rules::*;
pub use snapshot::*;
pub use store::*;
pub use validate::*;
