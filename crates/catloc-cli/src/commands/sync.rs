use catloc_core::{Locale, ParentId};
use catloc_domain::ContentKind;
use catloc_store::RestStore;
use catloc_translate::{RestTranslator, SyncMode};

#[allow(clippy::too_many_arguments)]
pub fn run_sync(
    kind: String,
    id: String,
    source: Option<String>,
    targets: Option<String>,
    batch: bool,
    dry_run: bool,
    format: String,
    use_color: bool,
) -> color_eyre::Result<()> {
    tracing::debug!(event = "sync_args", kind = %kind, id = %id, source = ?source, targets = ?targets, batch = batch, dry_run = dry_run);

    let cfg = super::load_cfg();

    let Some(base_url) = cfg.store.as_ref().and_then(|s| s.base_url.clone()) else {
        crate::ui_err!("store-not-configured");
        std::process::exit(2);
    };
    let store = RestStore::new(base_url, cfg.store.as_ref().and_then(|s| s.api_key.clone()));

    let Some(endpoint) = cfg.translate.as_ref().and_then(|t| t.endpoint.clone()) else {
        crate::ui_err!("translate-not-configured");
        std::process::exit(2);
    };
    let translator = RestTranslator::new(
        endpoint,
        cfg.translate.as_ref().and_then(|t| t.api_key.clone()),
    );

    let source_locale = resolve_locale(source.as_deref().or(cfg.source_locale.as_deref()));
    let targets = targets.as_deref().map(parse_locales);
    let batched = batch
        || cfg
            .translate
            .as_ref()
            .and_then(|t| t.batch_fields)
            .unwrap_or(false);
    let mode = if batched {
        SyncMode::Batched
    } else {
        SyncMode::PerField
    };

    let id = ParentId::new(id);
    match kind.as_str() {
        "category" => sync_one::<catloc_domain::CategoryKind>(
            &store, &translator, &id, source_locale, targets, mode, dry_run, &format, use_color,
        ),
        "card" => sync_one::<catloc_domain::CardKind>(
            &store, &translator, &id, source_locale, targets, mode, dry_run, &format, use_color,
        ),
        "daily_tip" => sync_one::<catloc_domain::DailyTipKind>(
            &store, &translator, &id, source_locale, targets, mode, dry_run, &format, use_color,
        ),
        "deep_talk" => sync_one::<catloc_domain::DeepTalkKind>(
            &store, &translator, &id, source_locale, targets, mode, dry_run, &format, use_color,
        ),
        other => {
            crate::ui_err!("unknown-kind", kind = other.to_string());
            std::process::exit(2);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn sync_one<K: ContentKind>(
    store: &RestStore,
    translator: &RestTranslator,
    id: &ParentId,
    source_locale: Locale,
    targets: Option<Vec<Locale>>,
    mode: SyncMode,
    dry_run: bool,
    format: &str,
    use_color: bool,
) -> color_eyre::Result<()> {
    let stored = catloc_services::load_aggregate::<K, _>(store, id)?;
    let mut aggregate = stored.aggregate;

    let Some(source) = aggregate.translations.get(&source_locale).cloned() else {
        crate::ui_err!("sync-source-missing", locale = source_locale.code());
        std::process::exit(1);
    };

    let targets = targets.unwrap_or_else(|| aggregate.missing_locales());
    if targets.is_empty() {
        crate::ui_info!("sync-nothing-to-do");
        return Ok(());
    }
    tracing::debug!(event = "sync_targets", kind = %K::KIND, id = %id, targets = targets.len());

    let results =
        catloc_translate::synchronize::<K>(translator, source_locale, &source, &targets, mode);
    let errors = catloc_translate::fold_translations::<K>(&mut aggregate.translations, results);

    let failed: Vec<Locale> = errors.iter().map(|(locale, _)| *locale).collect();
    let synthesized: Vec<Locale> = targets
        .iter()
        .copied()
        .filter(|t| !failed.contains(t))
        .collect();

    if format == "json" {
        #[derive(serde::Serialize)]
        struct Out<'a> {
            schema_version: u32,
            kind: &'a str,
            id: &'a str,
            mode: &'a str,
            source: &'a str,
            synthesized: Vec<&'a str>,
            failed: Vec<(String, String)>,
        }
        let out = Out {
            schema_version: crate::OUTPUT_SCHEMA_VERSION,
            kind: K::KIND.as_str(),
            id: id.as_str(),
            mode: if dry_run { "dry_run" } else { "sync" },
            source: source_locale.code(),
            synthesized: synthesized.iter().map(|l| l.code()).collect(),
            failed: errors
                .iter()
                .map(|(l, e)| (l.code().to_string(), e.to_string()))
                .collect(),
        };
        serde_json::to_writer(std::io::stdout().lock(), &out)?;
    } else {
        for (locale, error) in &errors {
            crate::ui_warn!(
                "sync-locale-failed",
                locale = locale.code(),
                message = error.to_string()
            );
        }
        for locale in &synthesized {
            if use_color {
                use owo_colors::OwoColorize;
                println!("✔ {}", locale.code().green());
            } else {
                println!("✔ {}", locale.code());
            }
        }
    }

    if synthesized.is_empty() {
        crate::ui_err!("sync-all-failed");
        std::process::exit(1);
    }

    if dry_run {
        crate::ui_info!("sync-dry-run");
        return Ok(());
    }

    catloc_services::update_aggregate::<K, _>(store, id, &aggregate)?;
    crate::ui_ok!(
        "sync-saved",
        id = id.as_str().to_string(),
        count = (aggregate.translations.len() as i64)
    );
    Ok(())
}

fn resolve_locale(code: Option<&str>) -> Locale {
    match code {
        Some(code) => match Locale::from_code(code) {
            Some(locale) => locale,
            None => {
                crate::ui_err!("bad-locale", code = code.to_string());
                std::process::exit(2);
            }
        },
        None => Locale::default_locale(),
    }
}

fn parse_locales(csv: &str) -> Vec<Locale> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|code| match Locale::from_code(code) {
            Some(locale) => locale,
            None => {
                crate::ui_err!("bad-locale", code = code.to_string());
                std::process::exit(2);
            }
        })
        .collect()
}
