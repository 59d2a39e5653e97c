pub mod session_materializer;

pub use session_materializer::{MaterializationReport, MaterializerSettings, SessionMaterializer};
