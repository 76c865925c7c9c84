use anyhow::{anyhow, Result};
use async_trait::async_trait;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::ass_export;
use crate::file_utils::FileManager;
use crate::merge;
use crate::reflow;
use crate::sanitizer;
use crate::subtitle_processor::{self, SubtitleCollection, SubtitleEntry};
use crate::errors::TranslationError;
use crate::translation::{BatchReport, BatchTranslator, TranslationService, Translator};

// @module: Application controller for the subtitle pipeline

/// Per-run switches that are not part of the configuration file
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    // @field: Stop after merge, writing the cleaned source captions
    pub skip_translation: bool,

    // @field: Also write a two-track ASS script here (single-file runs)
    pub bilingual_ass: Option<PathBuf>,

    // @field: Draw indicatif progress bars
    pub show_progress: bool,
}

/// Result of running the pipeline over one collection
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Sanitized and merged source captions that were sent for translation
    pub source: SubtitleCollection,

    /// Translated captions with reflowed timing
    pub translated: SubtitleCollection,

    /// Batch statistics of the translation step
    pub report: BatchReport,
}

/// What a folder run did with the files it found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Stands in for the provider on skip-translation runs
struct Untranslated;

#[async_trait]
impl Translator for Untranslated {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, TranslationError> {
        Ok(texts.to_vec())
    }
}

/// Main application controller for subtitle processing
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Run switches
    options: RunOptions,

    // @field: Shared with the Ctrl-C handler
    cancel_flag: Arc<AtomicBool>,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a controller, rejecting an invalid configuration up front
    pub fn with_config(config: Config) -> Result<Self> {
        Self::new(config, RunOptions::default())
    }

    /// Create a controller for the given run switches
    ///
    /// Provider credentials are only required when the run translates.
    pub fn new(config: Config, options: RunOptions) -> Result<Self> {
        config.validate_settings()?;
        if !options.skip_translation {
            config.validate_credentials()?;
        }
        Ok(Self {
            config,
            options,
            cancel_flag: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Replace the run switches
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// The configuration this controller runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Flag that stops translation between batches once set
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel_flag)
    }

    /// Build the provider-backed translator for this configuration
    pub fn build_translation_service(&self) -> Result<TranslationService> {
        self.config.validate_credentials()?;
        let service = TranslationService::new(
            self.config.translation.clone(),
            &self.config.source_language,
            &self.config.target_language,
        )?;
        Ok(service.with_cancel_flag(self.cancel_flag()))
    }

    /// Sanitize every entry, drop the ones left empty, then merge sentence fragments
    pub fn prepare_entries(&self, entries: &[SubtitleEntry]) -> Vec<SubtitleEntry> {
        let mut cleaned: Vec<SubtitleEntry> = entries
            .iter()
            .filter_map(|entry| {
                let text = sanitizer::sanitize(&entry.text);
                if text.is_empty() {
                    debug!("Dropping entry {} with no text left after cleanup", entry.index);
                    return None;
                }
                let mut cleaned = entry.clone();
                cleaned.text = text;
                Some(cleaned)
            })
            .collect();
        subtitle_processor::renumber(&mut cleaned);

        if !self.config.merge.enabled {
            return cleaned;
        }

        let merged = merge::merge_entries(&cleaned, &self.config.merge);
        info!("Merged {} captions into {}", cleaned.len(), merged.len());
        merged
    }

    /// Run sanitize, merge, translate and reflow over an in-memory collection
    pub async fn process_collection<T: Translator>(
        &self,
        collection: &SubtitleCollection,
        translator: &T,
        progress_callback: impl Fn(usize, usize),
    ) -> PipelineOutcome {
        let source = SubtitleCollection::with_entries(
            collection.source_file.clone(),
            self.prepare_entries(&collection.entries),
        );

        if self.options.skip_translation {
            return PipelineOutcome {
                translated: source.clone(),
                source,
                report: BatchReport::default(),
            };
        }

        let texts: Vec<String> = source.entries.iter().map(|e| e.text.clone()).collect();
        let batch_translator = BatchTranslator::from_config(translator, &self.config.translation.common)
            .with_cancel_flag(self.cancel_flag());
        let (translations, report) = batch_translator
            .translate_all_with_progress(&texts, progress_callback)
            .await;

        if report.failed_batches > 0 {
            warn!(
                "{} of {} batches kept their source text after errors",
                report.failed_batches, report.total_batches
            );
        }

        let translated = SubtitleCollection::with_entries(
            collection.source_file.clone(),
            reflow::reflow_entries(&source.entries, &translations, &self.config.reflow),
        );

        PipelineOutcome {
            source,
            translated,
            report,
        }
    }

    /// Default output path: `<stem>.<target_language>.srt` next to the input
    pub fn default_output_path(&self, input_file: &Path) -> PathBuf {
        let dir = input_file.parent().unwrap_or_else(|| Path::new(""));
        FileManager::generate_output_path(input_file, dir, &self.config.target_language, "srt")
    }

    /// Run the main workflow on one subtitle file with the configured provider
    ///
    /// Returns the written path, or `None` when an existing output was left alone.
    pub async fn run(&self, input_file: PathBuf, output_file: Option<PathBuf>, force_overwrite: bool) -> Result<Option<PathBuf>> {
        if self.options.skip_translation {
            return self
                .run_with_translator(input_file, output_file, force_overwrite, &Untranslated)
                .await;
        }
        let service = self.build_translation_service()?;
        self.run_with_translator(input_file, output_file, force_overwrite, &service).await
    }

    /// Run the main workflow on one subtitle file with the given translator
    pub async fn run_with_translator<T: Translator>(
        &self,
        input_file: PathBuf,
        output_file: Option<PathBuf>,
        force_overwrite: bool,
        translator: &T,
    ) -> Result<Option<PathBuf>> {
        let multi_progress = self.multi_progress();
        let ass_path = self.options.bilingual_ass.clone();
        self.run_file(&input_file, output_file, force_overwrite, translator, &multi_progress, ass_path.as_deref())
            .await
    }

    async fn run_file<T: Translator>(
        &self,
        input_file: &Path,
        output_file: Option<PathBuf>,
        force_overwrite: bool,
        translator: &T,
        multi_progress: &MultiProgress,
        ass_path: Option<&Path>,
    ) -> Result<Option<PathBuf>> {
        let start_time = Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let output_path = output_file.unwrap_or_else(|| self.default_output_path(input_file));
        if output_path.exists() && !force_overwrite {
            warn!(
                "Skipping {}, output already exists (use -f to force overwrite)",
                output_path.display()
            );
            return Ok(None);
        }

        let collection = SubtitleCollection::from_file(input_file)?;
        info!("Loaded {} captions from {}", collection.len(), input_file.display());

        let progress_bar = self.translation_progress_bar(multi_progress);
        let pb = progress_bar.clone();
        let outcome = self
            .process_collection(&collection, translator, move |completed, total| {
                pb.set_length(total as u64);
                pb.set_position(completed as u64);
            })
            .await;
        progress_bar.finish_and_clear();

        outcome.translated.write_to_srt(&output_path)?;

        if let Some(ass_path) = ass_path {
            let script = ass_export::build_bilingual_ass(&outcome.source.entries, &outcome.translated.entries);
            FileManager::write_to_file(ass_path, &script)?;
            info!("Bilingual script: {}", ass_path.display());
        }

        info!(
            "Success: {} ({} captions, {})",
            output_path.display(),
            outcome.translated.len(),
            Self::format_duration(start_time.elapsed())
        );
        Ok(Some(output_path))
    }

    /// Run the workflow in folder mode with the configured provider
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderSummary> {
        if self.options.skip_translation {
            return self
                .run_folder_with_translator(input_dir, force_overwrite, &Untranslated)
                .await;
        }
        let service = self.build_translation_service()?;
        self.run_folder_with_translator(input_dir, force_overwrite, &service).await
    }

    /// Run the workflow on every `.srt` file beneath a directory
    ///
    /// Files already named for the target language are skipped, and a failing
    /// file is logged and counted without stopping the others.
    pub async fn run_folder_with_translator<T: Translator>(
        &self,
        input_dir: PathBuf,
        force_overwrite: bool,
        translator: &T,
    ) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let target_language = &self.config.target_language;
        let subtitle_files: Vec<PathBuf> = FileManager::find_files(&input_dir, "srt")?
            .into_iter()
            .filter(|path| !FileManager::has_language_suffix(path, target_language))
            .collect();

        if subtitle_files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }

        let multi_progress = self.multi_progress();
        let folder_pb = if self.options.show_progress {
            multi_progress.add(ProgressBar::new(subtitle_files.len() as u64))
        } else {
            ProgressBar::hidden()
        };
        folder_pb.set_style(Self::bar_style("files"));
        folder_pb.set_message("Processing files");

        let mut summary = FolderSummary::default();

        for subtitle_file in &subtitle_files {
            let file_name = subtitle_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self
                .run_file(subtitle_file, None, force_overwrite, translator, &multi_progress, None)
                .await
            {
                Ok(Some(_)) => summary.processed += 1,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");
        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors ({})",
            summary.processed,
            summary.skipped,
            summary.failed,
            Self::format_duration(start_time.elapsed())
        );

        Ok(summary)
    }

    fn multi_progress(&self) -> MultiProgress {
        let multi_progress = MultiProgress::new();
        if !self.options.show_progress {
            multi_progress.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        }
        multi_progress
    }

    fn translation_progress_bar(&self, multi_progress: &MultiProgress) -> ProgressBar {
        if self.options.skip_translation || !self.options.show_progress {
            return ProgressBar::hidden();
        }
        let progress_bar = multi_progress.add(ProgressBar::new(0));
        progress_bar.set_style(Self::bar_style("batches"));
        progress_bar.set_message(format!(
            "{} - {}",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model()
        ));
        progress_bar
    }

    fn bar_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
                unit
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
