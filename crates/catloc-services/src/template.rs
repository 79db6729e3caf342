//! Companion example-file generator for the bulk importer. The produced
//! file demonstrates every column and must round-trip through
//! [`crate::run_file_import`] with 100% row success.

use std::io::Write;

use catloc_core::Locale;
use color_eyre::eyre::{eyre, Result};

/// Sample rows: (id, icon, is_premium, is_active, es, en, pt). The trailing
/// locales stay blank to show that optional locale columns may be omitted.
const SAMPLE_ROWS: &[(&str, &str, &str, &str, &str, &str, &str)] = &[
    (
        "A1",
        "🎯",
        "false",
        "true",
        "Cuenta tu mayor secreto",
        "Tell your biggest secret",
        "Conta o teu maior segredo",
    ),
    (
        "A1",
        "🔥",
        "true",
        "true",
        "Baila durante un minuto",
        "Dance for one minute",
        "",
    ),
    (
        "A2",
        "",
        "false",
        "1",
        "Di un cumplido a cada persona",
        "Give everyone a compliment",
        "",
    ),
];

/// Only single-byte (ASCII) delimiters are accepted; the importer splits on
/// whatever char it is given, so a substituted one would not re-read.
pub fn write_template_csv<W: Write>(writer: W, delimiter: char) -> Result<()> {
    if !delimiter.is_ascii() {
        return Err(eyre!(
            "unsupported delimiter `{delimiter}`: must be a single ASCII character"
        ));
    }
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .from_writer(writer);

    let mut header = vec![
        "id".to_string(),
        "icon".to_string(),
        "is_premium".to_string(),
        "is_active".to_string(),
    ];
    header.extend(Locale::all().map(|locale| format!("content_{}", locale.code())));
    wtr.write_record(&header)?;

    for (id, icon, premium, active, es, en, pt) in SAMPLE_ROWS {
        let mut record = vec![*id, *icon, *premium, *active, *es, *en, *pt];
        // blanks for the locales past pt
        record.resize(header.len(), "");
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// The template as an in-memory string (stdout printing, tests).
pub fn template_csv(delimiter: char) -> Result<String> {
    let mut buf = Vec::new();
    write_template_csv(&mut buf, delimiter)?;
    Ok(String::from_utf8(buf)?)
}
