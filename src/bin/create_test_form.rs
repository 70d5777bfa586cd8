use std::process;

use pdf_form_fixture::fixture::{self, V1_FILENAME};
use pdf_form_fixture::forms::FieldKind;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run() -> std::io::Result<()> {
    // Assemble in memory and write in one shot, so a failed run
    // leaves no partial file behind.
    let bytes = fixture::build_with_field_api(Vec::new())?;
    std::fs::write(V1_FILENAME, &bytes)?;

    println!("Created: {}", V1_FILENAME);
    println!();
    println!("Form fields available:");
    for field in fixture::fixture_fields() {
        let kind = match field.kind {
            FieldKind::Text { multiline: false } => "text",
            FieldKind::Text { multiline: true } => "multiline text",
            FieldKind::Checkbox => "checkbox",
        };
        println!("  - {} ({})", field.name, kind);
    }
    Ok(())
}
