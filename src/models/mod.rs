pub mod analysis_types;
pub mod image_types;
pub mod session_types;
