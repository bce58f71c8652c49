pub mod catalog;
pub mod error;
pub mod matcher;
pub mod model;

pub use catalog::{DeviceCatalog, StaticCatalog};
pub use error::{CatalogError, CatalogResult, MediaError, MediaResult};
pub use matcher::{MatchKind, MediaMatcher, MediaSelection};
pub use model::{DeviceProfile, Margins, MediaCandidate, PageSize};
