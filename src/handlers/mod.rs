pub mod chat;
pub mod health; // Threshold-based health verdict
pub mod prompts;
pub mod scan;

pub use chat::ChatHandler;
pub use scan::ScanHandler;
