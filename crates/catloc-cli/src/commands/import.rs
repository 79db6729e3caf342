use catloc_domain::ImportFailure;
use catloc_services::ImportOptions;
use catloc_store::RestStore;

pub fn run_import(
    file: std::path::PathBuf,
    delimiter: Option<char>,
    dry_run: bool,
    format: String,
    use_color: bool,
) -> color_eyre::Result<()> {
    tracing::debug!(event = "import_args", file = ?file, delimiter = ?delimiter, dry_run = dry_run, format = %format);

    let cfg = super::load_cfg();
    let delimiter = delimiter
        .or(cfg.import.as_ref().and_then(|i| i.delimiter))
        .unwrap_or(',');
    let opts = ImportOptions { delimiter };

    let text = std::fs::read_to_string(&file)?;

    if dry_run {
        let plan = match catloc_services::plan_file_import(&text, &opts) {
            Ok(plan) => plan,
            Err(err) => {
                crate::ui_err!("import-rejected", message = err.to_string());
                std::process::exit(1);
            }
        };
        if format == "json" {
            serde_json::to_writer(std::io::stdout().lock(), &plan)?;
        } else {
            crate::ui_info!("import-dry-run");
            crate::ui_out!(
                "import-plan-summary",
                valid = (plan.valid_rows as i64),
                total = (plan.total_rows as i64)
            );
            print_failures(&plan.issues, use_color);
        }
        if plan.valid_rows == 0 {
            std::process::exit(1);
        }
        return Ok(());
    }

    let Some(base_url) = cfg.store.as_ref().and_then(|s| s.base_url.clone()) else {
        crate::ui_err!("store-not-configured");
        std::process::exit(2);
    };
    let api_key = cfg.store.as_ref().and_then(|s| s.api_key.clone());
    let store = RestStore::new(base_url, api_key);

    let outcome = match catloc_services::run_file_import(&store, &text, &opts) {
        Ok(outcome) => outcome,
        Err(err) => {
            crate::ui_err!("import-rejected", message = err.to_string());
            std::process::exit(1);
        }
    };

    if format == "json" {
        serde_json::to_writer(std::io::stdout().lock(), &outcome)?;
    } else if outcome.failures.is_empty() {
        crate::ui_ok!("import-clean", succeeded = (outcome.succeeded as i64));
    } else {
        crate::ui_warn!(
            "import-partial",
            succeeded = (outcome.succeeded as i64),
            attempted = (outcome.attempted as i64)
        );
        print_failures(&outcome.failures, use_color);
    }

    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_failures(failures: &[ImportFailure], use_color: bool) {
    for f in failures {
        if use_color {
            use owo_colors::OwoColorize;
            println!("✖ [{}] {}", f.line.to_string().magenta(), f.message.red());
        } else {
            println!("✖ [{}] {}", f.line, f.message);
        }
    }
}
