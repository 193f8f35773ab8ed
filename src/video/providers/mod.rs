//! Remote generation services.

mod veo;

pub use veo::{GeminiVeoService, DEFAULT_BASE_URL};
