use std::process;

use pdf_form_fixture::fixture::{self, V2_FILENAME};
use pdf_form_fixture::forms::FieldKind;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run() -> std::io::Result<()> {
    // Same form as create-test-form, but the widget annotations are
    // assembled as raw dictionaries and spliced into the document's
    // object tree directly.
    let bytes = fixture::build_with_raw_objects(Vec::new())?;
    std::fs::write(V2_FILENAME, &bytes)?;

    println!("Created: {}", V2_FILENAME);
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
