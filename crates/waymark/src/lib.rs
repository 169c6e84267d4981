// Waymark - convention-based route discovery
// Scans api and page folders into route entries, keeps them current and
// exports a manifest for code generation.

pub mod config;
pub mod manifest;
pub mod registry;
pub mod scanner;

// Re-export project-level types
pub use config::{Config, CoreMiddleware, CONFIG_FILE};
pub use manifest::{core_stack, Manifest};
pub use registry::{RegistryDiff, RouteId, RouteRegistry};
pub use scanner::{scan, scan_folder, ScanError, ScanReport};

// Re-export the route and stack crates
pub use waymark_router;
pub use waymark_stack;
