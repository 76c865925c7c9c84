/*!
 * # subreflow - sentence-aware subtitle merging, translation and timing reflow
 *
 * A Rust library that turns a fragmented SRT track into a translated one whose
 * captions follow sentences and whose timing follows the translated text.
 *
 * ## Pipeline
 *
 * Parser → Sanitizer → Sentence merge → Batch translation → Timing reflow → Serializer
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timecode`: `HH:MM:SS,mmm` codec
 * - `subtitle_processor`: SRT parsing, serialization and the entry model
 * - `sanitizer`: markup and annotation cleanup
 * - `merge`: the sentence-boundary merge engine
 * - `translation`: AI-powered translation services:
 *   - `translation::core`: the `Translator` seam and provider-backed service
 *   - `translation::batch`: batching, alignment and fallback
 *   - `translation::prompts`: numbered request and reply handling
 * - `reflow`: duration rescaling after translation
 * - `ass_export`: bilingual ASS script writer
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for various LLM providers:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::mock`: in-process mock
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(non_snake_case)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod ass_export;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod merge;
pub mod providers;
pub mod reflow;
pub mod sanitizer;
pub mod subtitle_processor;
pub mod timecode;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, PipelineOutcome, RunOptions};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use translation::{BatchReport, BatchTranslator, TranslationService, Translator};
pub use language_utils::{language_codes_match, normalize_to_part2t, get_language_name};
pub use errors::{AppError, ProviderError, SubtitleError, TranslationError};
