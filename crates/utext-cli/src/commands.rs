use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;
use utext_config::Config;
use utext_core::{covered_area, normalize};
use utext_extract::{HttpFetcher, OcrEngine, OcrError, OcrOutput, SourceExtractor};
use utext_speech::PlaybackSynchronizer;
use utext_types::{
    HighlightEvent, ImageData, SourceType, TextBuilder, TextDetectionResult, TextMetadata,
    UiNode, UniversalText,
};

use crate::cli::Command;
use crate::paced::PacedEngine;

const WORD_DURATION: Duration = Duration::from_millis(250);

/// The command line has no recogniser; image sources report this as an error
struct NoOcrEngine;

#[async_trait]
impl OcrEngine for NoOcrEngine {
    async fn recognize(&self, _image: &ImageData, _language: &str) -> Result<OcrOutput, OcrError> {
        Err(OcrError::Engine("no OCR engine is bundled with the CLI".into()))
    }

    fn name(&self) -> &str {
        "none"
    }
}

pub async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    let extractor = SourceExtractor::new(Arc::new(NoOcrEngine), Arc::new(HttpFetcher::new()))
        .with_accessibility_limits(&config.accessibility);

    match command {
        Command::Tree { path } => {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let root: UiNode = serde_json::from_str(&json)
                .with_context(|| format!("{} is not a UI node dump", path.display()))?;
            let result = extractor.extract_from_accessibility(Some(&root));
            print_normalized(detected(result)?, &config)
        }
        Command::Fetch { url } => {
            let result = extractor.extract_from_web(&url, &config.web).await;
            print_normalized(detected(result)?, &config)
        }
        Command::Normalize { files, tokenize } => {
            let mut config = config;
            if let Some(mode) = tokenize {
                config.normalization.tokenize_by = mode.into();
            }
            let sources = files
                .iter()
                .map(|path| read_plain_text(path))
                .collect::<anyhow::Result<Vec<_>>>()?;
            print_normalized(sources, &config)
        }
        Command::Speak { path, rate } => {
            let text = normalize(&[read_plain_text(&path)?], &config.normalization);
            speak(&text, rate, &config).await
        }
    }
}

/// Success as a one-element list, Empty as none, Error as `Err`
fn detected(result: TextDetectionResult) -> anyhow::Result<Vec<UniversalText>> {
    match result {
        TextDetectionResult::Success(text) => Ok(vec![text]),
        TextDetectionResult::Empty => {
            tracing::warn!("No text found");
            Ok(Vec::new())
        }
        TextDetectionResult::Error { message, cause } => match cause {
            Some(cause) => bail!("{message}: {cause}"),
            None => bail!("{message}"),
        },
    }
}

fn print_normalized(sources: Vec<UniversalText>, config: &Config) -> anyhow::Result<()> {
    let text = normalize(&sources, &config.normalization);
    tracing::info!(
        "Normalized {} sources into {} tokens",
        sources.len(),
        text.tokens.len()
    );
    if let Some(area) = covered_area(&text) {
        tracing::info!(
            "Text covers {}x{} at ({}, {})",
            area.width(),
            area.height(),
            area.left,
            area.top
        );
    }
    println!("{}", serde_json::to_string_pretty(&text)?);
    Ok(())
}

fn read_plain_text(path: &Path) -> anyhow::Result<UniversalText> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let text = plain_text(&contents, SourceType::Web);
    Ok(text.with_metadata(TextMetadata {
        title: path.file_name().map(|n| n.to_string_lossy().into_owned()),
        confidence: Some(1.0),
        ..TextMetadata::default()
    }))
}

/// Line-preserving tokens for text that has no layout
fn plain_text(contents: &str, source_type: SourceType) -> UniversalText {
    let mut builder = TextBuilder::new(source_type);
    for line in contents.lines() {
        for word in line.split_whitespace() {
            builder.push_word(word, None, 1.0);
        }
        builder.end_line();
    }
    builder.finish()
}

async fn speak(text: &UniversalText, rate: Option<f32>, config: &Config) -> anyhow::Result<()> {
    let sync = PlaybackSynchronizer::new(PacedEngine::new(WORD_DURATION), config.speech.clone());
    let mut stream = match rate {
        Some(rate) => sync.speak_with_highlight(text, rate, config.speech.pitch),
        None => sync.speak(text),
    };

    loop {
        let event = tokio::select! {
            event = stream.next() => event,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping speech");
                sync.stop();
                continue;
            }
        };

        let Some(event) = event else {
            break;
        };
        let done = event.is_terminal();
        print_event(event)?;
        if done {
            break;
        }
    }
    Ok(())
}

fn print_event(event: HighlightEvent) -> anyhow::Result<()> {
    match event {
        HighlightEvent::TokenHighlight { token, progress } => {
            println!("{:>5}  {:<24} {:>3.0}%", token.index, token.text, progress * 100.0);
        }
        HighlightEvent::SentenceHighlight(tokens) => {
            let sentence: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
            println!("-- {}", sentence.join(" "));
        }
        HighlightEvent::Error(message) => bail!("speech failed: {message}"),
        other => println!("[{other:?}]"),
    }
    Ok(())
}
