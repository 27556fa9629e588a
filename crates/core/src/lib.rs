pub mod cache;
pub mod config;
pub mod cursor;
pub mod locator;
pub mod logging;
pub mod moniker;
pub mod observability;
pub mod occurrence;
pub mod resolver;
pub mod store;
pub mod symbol_names;
pub mod translate;
pub mod util;

pub use config::CodeNavConfig;
pub use locator::{CodeNavService, LocatorSettings};
pub use observability::Operations;
pub use store::SqliteStore;
pub use translate::IdentityTranslator;
