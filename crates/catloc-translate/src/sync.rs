//! Fan-out of one source-locale translation into missing target locales.
//!
//! Per-locale requests are mutually independent and read-only against the
//! provider, so they run on scoped threads and are all joined before any
//! result is merged anywhere. Persistence is the caller's business: this
//! module only returns field values to fold into an aggregate.

use std::collections::BTreeMap;
use std::thread;

use catloc_core::Locale;
use catloc_domain::{ContentKind, LocalizedText};

use crate::{TranslateError, Translator};

/// Structural delimiter for [`SyncMode::Batched`]: several fields travel in
/// one provider call, joined by this token, and the response is split back
/// into the same number of segments.
pub const BATCH_DELIMITER: &str = "|||";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// One provider call per non-blank source field.
    #[default]
    PerField,
    /// One provider call per locale, fields joined by [`BATCH_DELIMITER`].
    Batched,
}

/// Translate `source` into every locale of `targets`.
///
/// Precondition: every mandatory source field is non-blank. A blank one
/// short-circuits with [`TranslateError::BlankSource`] for all targets and
/// zero provider calls. Failure for one locale never prevents another from
/// completing; each entry of the returned map stands on its own.
pub fn synchronize<K: ContentKind>(
    translator: &dyn Translator,
    source_locale: Locale,
    source: &K::Text,
    targets: &[Locale],
    mode: SyncMode,
) -> BTreeMap<Locale, Result<K::Text, TranslateError>> {
    let mut out = BTreeMap::new();
    for field in K::Text::MANDATORY {
        if source.field(field).unwrap_or("").trim().is_empty() {
            for &target in targets {
                out.insert(target, Err(TranslateError::BlankSource(field)));
            }
            return out;
        }
    }

    thread::scope(|scope| {
        let handles: Vec<_> = targets
            .iter()
            .map(|&target| {
                let handle = scope
                    .spawn(move || translate_into::<K>(translator, source_locale, source, target, mode));
                (target, handle)
            })
            .collect();
        for (target, handle) in handles {
            let result = handle.join().unwrap_or(Err(TranslateError::WorkerPanic));
            tracing::debug!(
                event = "sync_locale_done",
                target = %target,
                ok = result.is_ok()
            );
            out.insert(target, result);
        }
    });
    out
}

fn translate_into<K: ContentKind>(
    translator: &dyn Translator,
    source_locale: Locale,
    source: &K::Text,
    target: Locale,
    mode: SyncMode,
) -> Result<K::Text, TranslateError> {
    // Blank optional fields are not sent; per-field structure is preserved
    // instead of round-tripping one concatenated blob.
    let fields: Vec<(&'static str, &str)> = K::Text::FIELDS
        .iter()
        .filter_map(|&field| source.field(field).map(|value| (field, value)))
        .filter(|(_, value)| !value.trim().is_empty())
        .collect();

    let mut text = K::Text::default();
    match mode {
        SyncMode::PerField => {
            for (field, value) in fields {
                let translated = translator.translate(value, source_locale, target)?;
                text.set_field(field, translated);
            }
        }
        SyncMode::Batched => {
            let joined = fields
                .iter()
                .map(|(_, value)| *value)
                .collect::<Vec<_>>()
                .join(BATCH_DELIMITER);
            let translated = translator.translate(&joined, source_locale, target)?;
            let segments: Vec<&str> = translated.split(BATCH_DELIMITER).collect();
            if segments.len() != fields.len() {
                return Err(TranslateError::SegmentMismatch {
                    sent: fields.len(),
                    got: segments.len(),
                });
            }
            for ((field, _), segment) in fields.iter().zip(segments) {
                text.set_field(field, segment.trim().to_string());
            }
        }
    }
    Ok(text)
}

/// Merge synchronizer successes into an existing translation set: create the
/// locale entry if absent, overwrite the fields that actually came back
/// translated, leave everything else untouched. Returns the per-locale
/// errors for the caller to present (retry, skip, or block submission).
pub fn fold_translations<K: ContentKind>(
    translations: &mut BTreeMap<Locale, K::Text>,
    results: BTreeMap<Locale, Result<K::Text, TranslateError>>,
) -> Vec<(Locale, TranslateError)> {
    let mut errors = Vec::new();
    for (locale, result) in results {
        match result {
            Ok(translated) => {
                let entry = translations.entry(locale).or_default();
                for field in K::Text::FIELDS {
                    if let Some(value) = translated.field(field) {
                        if !value.trim().is_empty() {
                            entry.set_field(field, value.to_string());
                        }
                    }
                }
            }
            Err(err) => errors.push((locale, err)),
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use catloc_domain::{CategoryKind, CategoryText, DeepTalkKind, DeepTalkText};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test double: uppercases input, counts calls, optionally fails one
    /// target locale.
    struct ScriptedTranslator {
        calls: AtomicUsize,
        fail_for: Option<Locale>,
        response: Option<&'static str>,
    }

    impl ScriptedTranslator {
        fn new() -> Self {
            ScriptedTranslator {
                calls: AtomicUsize::new(0),
                fail_for: None,
                response: None,
            }
        }

        fn count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Translator for ScriptedTranslator {
        fn translate(
            &self,
            text: &str,
            _source: Locale,
            target: Locale,
        ) -> Result<String, TranslateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_for == Some(target) {
                return Err(TranslateError::Provider {
                    status: 503,
                    message: "unavailable".into(),
                });
            }
            match self.response {
                Some(fixed) => Ok(fixed.to_string()),
                None => Ok(text.to_uppercase()),
            }
        }
    }

    fn source_text() -> CategoryText {
        CategoryText {
            name: "Retos".into(),
            description: String::new(),
        }
    }

    #[test]
    fn blank_source_fails_every_target_with_zero_calls() {
        let translator = ScriptedTranslator::new();
        let blank = CategoryText::default();
        let results = synchronize::<CategoryKind>(
            &translator,
            Locale::Es,
            &blank,
            &[Locale::En, Locale::Pt],
            SyncMode::PerField,
        );
        assert_eq!(results.len(), 2);
        for result in results.values() {
            assert!(matches!(result, Err(TranslateError::BlankSource("name"))));
        }
        assert_eq!(translator.count(), 0);
    }

    #[test]
    fn one_failing_locale_leaves_the_other_intact() {
        let mut translator = ScriptedTranslator::new();
        translator.fail_for = Some(Locale::Pt);
        let results = synchronize::<CategoryKind>(
            &translator,
            Locale::Es,
            &source_text(),
            &[Locale::En, Locale::Pt],
            SyncMode::PerField,
        );
        assert!(matches!(
            results[&Locale::Pt],
            Err(TranslateError::Provider { status: 503, .. })
        ));
        let en = results[&Locale::En].as_ref().unwrap();
        assert_eq!(en.name, "RETOS");
    }

    #[test]
    fn blank_optional_fields_are_not_sent() {
        let translator = ScriptedTranslator::new();
        let results = synchronize::<CategoryKind>(
            &translator,
            Locale::Es,
            &source_text(),
            &[Locale::En],
            SyncMode::PerField,
        );
        // description is blank, so only name travels
        assert_eq!(translator.count(), 1);
        let en = results[&Locale::En].as_ref().unwrap();
        assert_eq!(en.description, "");
    }

    #[test]
    fn batched_mode_is_one_call_split_back_per_field() {
        let translator = ScriptedTranslator::new();
        let source = DeepTalkText {
            prompt: "¿Qué te asusta?".into(),
            follow_up: Some("¿Por qué?".into()),
        };
        let results = synchronize::<DeepTalkKind>(
            &translator,
            Locale::Es,
            &source,
            &[Locale::En],
            SyncMode::Batched,
        );
        assert_eq!(translator.count(), 1);
        let en = results[&Locale::En].as_ref().unwrap();
        assert_eq!(en.prompt, "¿QUÉ TE ASUSTA?");
        assert_eq!(en.follow_up.as_deref(), Some("¿POR QUÉ?"));
    }

    #[test]
    fn batched_segment_mismatch_is_reported() {
        let mut translator = ScriptedTranslator::new();
        translator.response = Some("all glued together");
        let source = DeepTalkText {
            prompt: "Uno".into(),
            follow_up: Some("Dos".into()),
        };
        let results = synchronize::<DeepTalkKind>(
            &translator,
            Locale::Es,
            &source,
            &[Locale::En],
            SyncMode::Batched,
        );
        assert!(matches!(
            results[&Locale::En],
            Err(TranslateError::SegmentMismatch { sent: 2, got: 1 })
        ));
    }

    #[test]
    fn fold_overwrites_translated_fields_only() {
        let mut translations: BTreeMap<Locale, CategoryText> = BTreeMap::new();
        translations.insert(
            Locale::En,
            CategoryText {
                name: "Old".into(),
                description: "Keep me".into(),
            },
        );
        let mut results: BTreeMap<Locale, Result<CategoryText, TranslateError>> = BTreeMap::new();
        results.insert(
            Locale::En,
            Ok(CategoryText {
                name: "Dares".into(),
                description: String::new(),
            }),
        );
        results.insert(
            Locale::Pt,
            Err(TranslateError::Provider {
                status: 500,
                message: "boom".into(),
            }),
        );
        let errors = fold_translations::<CategoryKind>(&mut translations, results);
        assert_eq!(translations[&Locale::En].name, "Dares");
        assert_eq!(translations[&Locale::En].description, "Keep me");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, Locale::Pt);
    }
}
