use catloc_core::ParentId;
use catloc_domain::ContentKind;
use catloc_store::{CatalogStore, RestStore};

pub fn run_delete(kind: String, id: String, yes: bool) -> color_eyre::Result<()> {
    tracing::debug!(event = "delete_args", kind = %kind, id = %id, yes = yes);

    let cfg = super::load_cfg();
    let Some(base_url) = cfg.store.as_ref().and_then(|s| s.base_url.clone()) else {
        crate::ui_err!("store-not-configured");
        std::process::exit(2);
    };
    let store = RestStore::new(base_url, cfg.store.as_ref().and_then(|s| s.api_key.clone()));
    let id = ParentId::new(id);

    match kind.as_str() {
        "category" => delete_one::<catloc_domain::CategoryKind>(&store, &id, yes),
        "card" => delete_one::<catloc_domain::CardKind>(&store, &id, yes),
        "daily_tip" => delete_one::<catloc_domain::DailyTipKind>(&store, &id, yes),
        "deep_talk" => delete_one::<catloc_domain::DeepTalkKind>(&store, &id, yes),
        other => {
            crate::ui_err!("unknown-kind", kind = other.to_string());
            std::process::exit(2);
        }
    }
}

fn delete_one<K: ContentKind>(store: &RestStore, id: &ParentId, yes: bool) -> color_eyre::Result<()> {
    if !yes {
        let dependents = store.count_dependents::<K>(id)?;
        crate::ui_warn!(
            "delete-dependents",
            id = id.as_str().to_string(),
            count = (dependents as i64)
        );
        crate::ui_info!("delete-refused");
        std::process::exit(2);
    }

    let dependents = catloc_services::delete_aggregate::<K, _>(store, id)?;
    crate::ui_ok!(
        "delete-done",
        id = id.as_str().to_string(),
        count = (dependents as i64)
    );
    Ok(())
}
