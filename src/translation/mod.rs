/*!
 * Translation service for subtitle translation using AI providers.
 *
 * This module contains the core functionality for translating subtitles
 * using various AI providers. It is split into several submodules:
 *
 * - `core`: The `Translator` seam and the provider-backed service
 * - `batch`: Batch processing of translations
 * - `prompts`: Numbered request building and response parsing
 */

// Re-export main types for easier usage
pub use self::batch::{BatchReport, BatchTranslator};
pub use self::core::{TranslationService, Translator};

// Submodules
pub mod batch;
pub mod core;
pub mod prompts;
