pub fn run_template(
    out: Option<std::path::PathBuf>,
    delimiter: Option<char>,
) -> color_eyre::Result<()> {
    tracing::debug!(event = "template_args", out = ?out, delimiter = ?delimiter);

    let cfg = super::load_cfg();
    let delimiter = delimiter
        .or(cfg.import.as_ref().and_then(|i| i.delimiter))
        .unwrap_or(',');
    if !delimiter.is_ascii() {
        crate::ui_err!("bad-delimiter", delimiter = delimiter.to_string());
        std::process::exit(2);
    }

    match out {
        Some(path) => {
            let file = std::fs::File::create(&path)?;
            catloc_services::write_template_csv(file, delimiter)?;
            crate::ui_ok!("template-saved", path = path.display().to_string());
        }
        None => {
            let stdout = std::io::stdout();
            let lock = stdout.lock();
            catloc_services::write_template_csv(lock, delimiter)?;
        }
    }
    Ok(())
}
