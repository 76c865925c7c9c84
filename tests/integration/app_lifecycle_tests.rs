/*!
 * File-level tests of the controller: single files, folders and extra outputs
 */

use anyhow::Result;
use std::fs;

use subreflow::app_config::TranslationProvider;
use subreflow::app_controller::{Controller, FolderSummary, RunOptions};
use subreflow::subtitle_processor::SubtitleCollection;

use crate::common::mock_translators::PrefixTranslator;
use crate::common::{create_temp_dir, create_test_file, create_test_subtitle, fast_config, init_test_logger};

fn quiet_controller() -> Controller {
    init_test_logger();
    Controller::with_config(fast_config()).unwrap().with_options(RunOptions {
        show_progress: false,
        ..RunOptions::default()
    })
}

/// Test that a single file run writes `<stem>.<target>.srt` next to the input
#[tokio::test]
async fn test_run_withSingleFile_shouldWriteDefaultOutput() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let input = create_test_subtitle(temp_dir.path(), "talk.srt")?;
    let controller = quiet_controller();

    let written = controller
        .run_with_translator(input, None, false, &PrefixTranslator::new("zh:"))
        .await?;

    let expected = temp_dir.path().join("talk.zh.srt");
    assert_eq!(written.as_deref(), Some(expected.as_path()));

    let output = SubtitleCollection::from_file(&expected)?;
    assert_eq!(output.len(), 3);
    assert_eq!(output.entries[0].text, "zh:So I was thinking we could go tomorrow.");
    Ok(())
}

/// Test an explicit output path
#[tokio::test]
async fn test_run_withExplicitOutput_shouldWriteThere() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let input = create_test_subtitle(temp_dir.path(), "talk.srt")?;
    let output = temp_dir.path().join("out/translated.srt");

    let written = quiet_controller()
        .run_with_translator(input, Some(output.clone()), false, &PrefixTranslator::new(""))
        .await?;

    assert_eq!(written, Some(output.clone()));
    assert!(output.exists());
    Ok(())
}

/// Test that an existing output is left alone unless forced
#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let input = create_test_subtitle(temp_dir.path(), "talk.srt")?;
    let existing = create_test_file(temp_dir.path(), "talk.zh.srt", "keep me")?;
    let controller = quiet_controller();
    let translator = PrefixTranslator::new("");

    let written = controller.run_with_translator(input.clone(), None, false, &translator).await?;
    assert!(written.is_none());
    assert_eq!(fs::read_to_string(&existing)?, "keep me");

    let written = controller.run_with_translator(input, None, true, &translator).await?;
    assert_eq!(written, Some(existing.clone()));
    assert!(fs::read_to_string(&existing)?.starts_with("1\n00:00:01,000"));
    Ok(())
}

/// Test that a missing input is an error
#[tokio::test]
async fn test_run_withMissingInput_shouldFail() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let result = quiet_controller()
        .run_with_translator(temp_dir.path().join("nope.srt"), None, false, &PrefixTranslator::new(""))
        .await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("does not exist"));
    Ok(())
}

/// Test that the bilingual script is written beside the SRT output
#[tokio::test]
async fn test_run_withBilingualAss_shouldWriteBothTracks() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let input = create_test_subtitle(temp_dir.path(), "talk.srt")?;
    let ass_path = temp_dir.path().join("talk.ass");
    let controller = Controller::with_config(fast_config())?.with_options(RunOptions {
        bilingual_ass: Some(ass_path.clone()),
        ..RunOptions::default()
    });

    controller
        .run_with_translator(input, None, false, &PrefixTranslator::new("ZH "))
        .await?;

    let script = fs::read_to_string(&ass_path)?;
    assert_eq!(script.matches("Dialogue:").count(), 6);
    assert!(script.contains("Dialogue: 0,0:00:05.00,0:00:06.00,Source,,0,0,0,,Okay!"));
    assert!(script.contains(",Translation,,0,0,0,,ZH Okay!"));
    Ok(())
}

/// Test a folder run that skips files already named for the target language
#[tokio::test]
async fn test_run_folder_shouldProcessSourcesOnly() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let nested = temp_dir.path().join("s01");
    fs::create_dir_all(&nested)?;
    create_test_subtitle(temp_dir.path(), "e01.srt")?;
    create_test_subtitle(&nested, "e02.srt")?;
    create_test_file(temp_dir.path(), "old.zh.srt", "stale")?;
    create_test_file(temp_dir.path(), "readme.txt", "ignored")?;
    let controller = quiet_controller();
    let translator = PrefixTranslator::new("");

    let summary = controller
        .run_folder_with_translator(temp_dir.path().to_path_buf(), false, &translator)
        .await?;
    assert_eq!(summary, FolderSummary { processed: 2, skipped: 0, failed: 0 });
    assert!(temp_dir.path().join("e01.zh.srt").exists());
    assert!(nested.join("e02.zh.srt").exists());
    assert_eq!(fs::read_to_string(temp_dir.path().join("old.zh.srt"))?, "stale");

    // Second pass finds existing outputs
    let summary = controller
        .run_folder_with_translator(temp_dir.path().to_path_buf(), false, &translator)
        .await?;
    assert_eq!(summary, FolderSummary { processed: 0, skipped: 2, failed: 0 });
    Ok(())
}

/// Test a skip-translation run driven from a plain test thread
#[test]
fn test_run_withSkipTranslation_shouldWriteMergedSource() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let input = create_test_subtitle(temp_dir.path(), "talk.srt")?;
    let controller = Controller::with_config(fast_config())?.with_options(RunOptions {
        skip_translation: true,
        ..RunOptions::default()
    });

    let written = tokio_test::block_on(async {
        controller
            .run_with_translator(input, None, false, &PrefixTranslator::new("never "))
            .await
    })?;

    let content = fs::read_to_string(written.unwrap())?;
    assert_eq!(
        content,
        "1\n00:00:01,000 --> 00:00:03,500\nSo I was thinking we could go tomorrow.\n\n\
         2\n00:00:05,000 --> 00:00:06,000\nOkay!\n\n\
         3\n00:00:06,200 --> 00:00:08,000\nMaybe after lunch?\n"
    );
    Ok(())
}

/// Test that an empty folder is reported
#[tokio::test]
async fn test_run_folder_withNoSubtitles_shouldFail() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    create_test_file(temp_dir.path(), "notes.txt", "")?;

    let result = quiet_controller()
        .run_folder_with_translator(temp_dir.path().to_path_buf(), false, &PrefixTranslator::new(""))
        .await;

    assert!(result.is_err());
    Ok(())
}

/// Test that a hosted provider without a key is rejected up front
#[test]
fn test_with_config_withMissingApiKey_shouldFail() {
    let mut config = fast_config();
    config.translation.provider = TranslationProvider::OpenAI;
    assert!(Controller::with_config(config.clone()).is_err());

    config.translation.active_provider_config_mut().api_key = "sk-test".to_string();
    let controller = Controller::with_config(config).unwrap();
    assert!(controller.build_translation_service().is_ok());
}

/// Test that a skip-translation run needs no provider credentials
#[tokio::test]
async fn test_run_withSkipTranslationAndMissingApiKey_shouldWriteMergedSource() -> Result<()> {
    init_test_logger();
    let temp_dir = create_temp_dir()?;
    let input = create_test_subtitle(temp_dir.path(), "talk.srt")?;
    let mut config = fast_config();
    config.translation.provider = TranslationProvider::OpenAI;
    let options = RunOptions {
        skip_translation: true,
        ..RunOptions::default()
    };

    assert!(Controller::new(config.clone(), RunOptions::default()).is_err());
    let controller = Controller::new(config, options)?;
    assert!(controller.build_translation_service().is_err());

    let written = controller.run(input, None, false).await?;
    let output = SubtitleCollection::from_file(&written.unwrap())?;
    assert_eq!(output.len(), 3);
    assert_eq!(output.entries[0].text, "So I was thinking we could go tomorrow.");
    assert_eq!(output.entries[2].text, "Maybe after lunch?");

    let summary = controller.run_folder(temp_dir.path().to_path_buf(), true).await?;
    assert_eq!(summary, FolderSummary { processed: 1, skipped: 0, failed: 0 });
    Ok(())
}

/// Test the default output naming
#[test]
fn test_default_output_path_shouldUseTargetLanguage() {
    let mut config = fast_config();
    config.target_language = "fr".to_string();
    let controller = Controller::with_config(config).unwrap();

    let path = controller.default_output_path(std::path::Path::new("/media/show/ep1.srt"));
    assert_eq!(path, std::path::Path::new("/media/show/ep1.fr.srt"));
}
