pub mod document;
pub mod location;
pub mod moniker;
pub mod position;
pub mod upload;

pub use document::*;
pub use location::*;
pub use moniker::*;
pub use position::*;
pub use upload::*;
