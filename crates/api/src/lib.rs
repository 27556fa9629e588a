pub mod error;
pub mod models;
pub mod navigation;
pub mod services;

pub use error::{CodeNavError, Result};
pub use models::*;
pub use navigation::{
    CodeNavigator, DiagnosticPage, Hover, LocationPage, PageRequest, PositionalRequest, RequestContext,
};
pub use services::{
    BulkLocationQuery, CodeIntelStore, MonikerUploadQuery, PositionTranslator, UploadBatch,
    UploadService,
};
