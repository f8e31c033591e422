use utext_types::{SourceType, TextMetadata, UniversalText};

/// Concatenate several texts into one.
///
/// Raw texts are joined with `\n`. Token indices are kept as they were in
/// their source (reorder afterwards if contiguous ranks are needed), while
/// spans are shifted so they still point into the merged raw text.
pub fn merge(sources: &[UniversalText]) -> UniversalText {
    match sources {
        [] => return UniversalText::empty(SourceType::Hybrid),
        [single] => return single.clone(),
        _ => {}
    }

    let mut raw_text = String::new();
    let mut tokens = Vec::with_capacity(sources.iter().map(|s| s.tokens.len()).sum());

    for (i, source) in sources.iter().enumerate() {
        if i > 0 {
            raw_text.push('\n');
        }
        let base = raw_text.len();
        raw_text.push_str(&source.raw_text);
        tokens.extend(source.tokens.iter().map(|token| {
            let span = token.span.map(|span| span.shifted(base));
            token.clone().with_span(span)
        }));
    }

    let first_type = sources[0].source_type;
    let source_type = if sources.iter().all(|s| s.source_type == first_type) {
        first_type
    } else {
        SourceType::Hybrid
    };

    tracing::debug!(
        "[NORMALIZE] Merged {} sources into {} tokens ({source_type})",
        sources.len(),
        tokens.len()
    );

    UniversalText::new(raw_text, tokens, source_type).with_metadata(merge_metadata(sources))
}

/// First non-empty value wins, confidences are averaged
fn merge_metadata(sources: &[UniversalText]) -> TextMetadata {
    let mut merged = TextMetadata::default();
    for source in sources {
        let meta = &source.metadata;
        merged.title = merged.title.or_else(|| meta.title.clone());
        merged.url = merged.url.or_else(|| meta.url.clone());
        merged.language = merged.language.or_else(|| meta.language.clone());
        merged.page = merged.page.or(meta.page);
    }

    let confidences: Vec<f32> = sources.iter().filter_map(|s| s.metadata.confidence).collect();
    if !confidences.is_empty() {
        merged.confidence = Some(confidences.iter().sum::<f32>() / confidences.len() as f32);
    }

    let durations: Vec<_> = sources
        .iter()
        .filter_map(|s| s.metadata.capture_duration)
        .collect();
    if !durations.is_empty() {
        merged.capture_duration = Some(durations.into_iter().sum());
    }

    merged
}
