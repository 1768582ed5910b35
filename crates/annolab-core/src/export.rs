//! Rasa NLU training-data export
//!
//! Converts the annotation collection into Rasa's NLU markup: examples
//! grouped by intent, entity spans inlined as `[span](label)`. The
//! output is the `data/nlu.yml` a Rasa trainer consumes.

use crate::types::{Annotation, EntitySpan};
use annolab_store::{StoreError, WorkspacePaths};
use indexmap::IndexMap;
use std::path::PathBuf;

/// Intent used for annotations without one
const FALLBACK_INTENT: &str = "unknown_intent";

/// Render the annotation collection as Rasa NLU markup
///
/// Annotations with empty text are skipped; intents keep first-seen
/// order; entity spans are applied in `start` order and overlapping
/// spans are dropped.
#[must_use]
pub fn rasa_nlu_markup(annotations: &[Annotation]) -> String {
    let mut intents: IndexMap<&str, Vec<String>> = IndexMap::new();
    for ann in annotations {
        let text = ann.text.trim();
        if text.is_empty() {
            continue;
        }
        let intent = if ann.intent.is_empty() {
            FALLBACK_INTENT
        } else {
            &ann.intent
        };
        intents
            .entry(intent)
            .or_default()
            .push(mark_entities(text, &ann.entities));
    }

    let mut out = String::from("version: \"3.1\"\nnlu:\n");
    for (intent, examples) in &intents {
        out.push_str("- intent: ");
        out.push_str(intent);
        out.push_str("\n  examples: |\n");
        for example in examples {
            out.push_str("    - ");
            out.push_str(example);
            out.push('\n');
        }
    }
    out
}

/// Write the markup to the workspace's `data/nlu.yml`
///
/// # Errors
/// Returns [`StoreError::Write`] when the file cannot be written.
pub fn write_rasa_nlu(paths: &WorkspacePaths, annotations: &[Annotation]) -> Result<PathBuf, StoreError> {
    let target = paths.rasa_nlu_file();
    let data_dir = paths.data_dir();
    std::fs::create_dir_all(&data_dir).map_err(|source| StoreError::Write {
        path: data_dir,
        source,
    })?;
    std::fs::write(&target, rasa_nlu_markup(annotations)).map_err(|source| StoreError::Write {
        path: target.clone(),
        source,
    })?;
    tracing::debug!(path = %target.display(), examples = annotations.len(), "wrote Rasa NLU export");
    Ok(target)
}

/// Inline entity spans into `text` using `[span](label)` markup
///
/// Span offsets are character offsets; out-of-range offsets are clamped.
fn mark_entities(text: &str, entities: &[EntitySpan]) -> String {
    if entities.is_empty() {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len() as i64;
    let mut spans: Vec<&EntitySpan> = entities.iter().collect();
    spans.sort_by_key(|e| e.start);

    let mut out = String::new();
    let mut cursor = 0usize;
    for span in spans {
        let start = span.start.clamp(0, len) as usize;
        let end = span.end.clamp(span.start.clamp(0, len), len) as usize;
        if start < cursor {
            continue;
        }
        out.extend(&chars[cursor..start]);
        out.push('[');
        out.extend(&chars[start..end]);
        out.push_str("](");
        out.push_str(&span.label);
        out.push(')');
        cursor = end;
    }
    out.extend(&chars[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_example_has_no_markup() {
        assert_eq!(mark_entities("hello there", &[]), "hello there");
    }

    #[test]
    fn single_entity_is_marked() {
        let out = mark_entities("fly to Paris", &[EntitySpan::new(7, 12, "city")]);
        assert_eq!(out, "fly to [Paris](city)");
    }

    #[test]
    fn entities_are_applied_in_start_order() {
        let spans = vec![EntitySpan::new(16, 21, "city"), EntitySpan::new(7, 12, "city")];
        let out = mark_entities("fly to Paris or Tokyo", &spans);
        assert_eq!(out, "fly to [Paris](city) or [Tokyo](city)");
    }

    #[test]
    fn out_of_range_spans_are_clamped() {
        let out = mark_entities("hi", &[EntitySpan::new(-3, 99, "blob")]);
        assert_eq!(out, "[hi](blob)");
    }

    #[test]
    fn multibyte_text_uses_character_offsets() {
        let out = mark_entities("voler à Paris", &[EntitySpan::new(8, 13, "city")]);
        assert_eq!(out, "voler à [Paris](city)");
    }

    #[test]
    fn markup_groups_by_intent_in_first_seen_order() {
        let annotations = vec![
            Annotation::new("hello", "greet", vec![]),
            Annotation::new("bye", "farewell", vec![]),
            Annotation::new("hi there", "greet", vec![]),
        ];
        let out = rasa_nlu_markup(&annotations);
        assert_eq!(
            out,
            "version: \"3.1\"\nnlu:\n\
             - intent: greet\n  examples: |\n    - hello\n    - hi there\n\
             - intent: farewell\n  examples: |\n    - bye\n"
        );
    }

    #[test]
    fn empty_text_is_skipped_and_missing_intent_falls_back() {
        let annotations = vec![
            Annotation::new("   ", "greet", vec![]),
            Annotation::new("whatever", "", vec![]),
        ];
        let out = rasa_nlu_markup(&annotations);
        assert!(out.contains("- intent: unknown_intent"));
        assert!(!out.contains("- intent: greet"));
    }
}
