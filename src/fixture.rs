//! The fixed employee-information form used as a fixture by
//! form-filling tests: one US-Letter page, nine single-line text
//! fields, one checkbox, and one multi-line notes field, at constant
//! coordinates.
//!
//! Two builders produce it. `build_with_field_api` goes through the
//! document's field helper; `build_with_raw_objects` assembles the
//! widget dictionaries by hand and splices them into the page and
//! field arrays itself. Both yield the same field set in the same
//! order.

use std::io::{self, Write};

use crate::document::PdfDocument;
use crate::forms::{FieldDescriptor, FieldKind, Rect, FF_MULTILINE, FLAG_PRINT};
use crate::fonts::BuiltinFont;
use crate::objects::PdfObject;

/// Output filename of the field-API variant.
pub const V1_FILENAME: &str = "test-form-with-fields.pdf";
/// Output filename of the raw-object variant.
pub const V2_FILENAME: &str = "test-form-with-fields-v2.pdf";

/// US Letter, in points.
pub const PAGE_WIDTH: f64 = 612.0;
pub const PAGE_HEIGHT: f64 = 792.0;

const LEFT_MARGIN: f64 = 50.0;
const FIELD_COLUMN_X: f64 = 200.0;
const ROW_STEP: f64 = 40.0;
const FIELD_HEIGHT: f64 = 20.0;
const CHECKBOX_SIZE: f64 = 15.0;
const FIRST_ROW_Y: f64 = PAGE_HEIGHT - 120.0;

struct TextRow {
    name: &'static str,
    label: &'static str,
    width: f64,
}

const TEXT_ROWS: [TextRow; 9] = [
    TextRow { name: "Name", label: "Full Name:", width: 300.0 },
    TextRow { name: "Email", label: "Email Address:", width: 300.0 },
    TextRow { name: "Phone", label: "Phone Number:", width: 300.0 },
    TextRow { name: "DateOfBirth", label: "Date of Birth:", width: 150.0 },
    TextRow { name: "EmployeeID", label: "Employee ID:", width: 150.0 },
    TextRow { name: "Department", label: "Department:", width: 300.0 },
    TextRow { name: "Position", label: "Position:", width: 300.0 },
    TextRow { name: "StartDate", label: "Start Date:", width: 150.0 },
    TextRow { name: "Salary", label: "Salary:", width: 150.0 },
];

// Row positions walk down from FIRST_ROW_Y in ROW_STEP increments;
// the checkbox sits an extra 20pt below the last text row and the
// notes block 60pt below that.
fn text_row_y(index: usize) -> f64 {
    FIRST_ROW_Y - index as f64 * ROW_STEP
}

fn checkbox_y() -> f64 {
    text_row_y(TEXT_ROWS.len()) - 20.0
}

fn notes_y() -> f64 {
    checkbox_y() - 60.0
}

/// The 11 field descriptors of the fixture, in the order consumers
/// enumerate them: the nine text rows, the Active checkbox, and the
/// multi-line Notes field.
pub fn fixture_fields() -> Vec<FieldDescriptor> {
    let mut fields: Vec<FieldDescriptor> = TEXT_ROWS
        .iter()
        .enumerate()
        .map(|(i, row)| {
            FieldDescriptor::text(
                row.name,
                Rect::new(FIELD_COLUMN_X, text_row_y(i), row.width, FIELD_HEIGHT),
            )
        })
        .collect();
    fields.push(FieldDescriptor::checkbox(
        "Active",
        FIELD_COLUMN_X,
        checkbox_y(),
        CHECKBOX_SIZE,
        false,
    ));
    fields.push(FieldDescriptor::multiline_text(
        "Notes",
        Rect::new(LEFT_MARGIN, notes_y(), 500.0, 60.0),
    ));
    fields
}

/// Draw the static page content: title, subtitle, row labels, and the
/// two footer lines. Labels sit 5pt above their field's baseline.
fn render_static_content<W: Write>(doc: &mut PdfDocument<W>) {
    doc.set_font(BuiltinFont::HelveticaBold, 24.0);
    doc.draw_text("Employee Information Form", LEFT_MARGIN, PAGE_HEIGHT - 50.0);

    doc.set_font(BuiltinFont::Helvetica, 12.0);
    doc.draw_text("Please fill out all fields below:", LEFT_MARGIN, PAGE_HEIGHT - 80.0);

    doc.set_font(BuiltinFont::HelveticaBold, 11.0);
    for (i, row) in TEXT_ROWS.iter().enumerate() {
        doc.draw_text(row.label, LEFT_MARGIN, text_row_y(i) + 5.0);
    }
    doc.draw_text("Active Employee:", LEFT_MARGIN, checkbox_y() + 5.0);
    doc.draw_text("Additional Notes:", LEFT_MARGIN, notes_y() + 80.0);

    doc.set_font(BuiltinFont::HelveticaOblique, 9.0);
    doc.draw_text(
        "This is a test form for API testing purposes",
        LEFT_MARGIN,
        50.0,
    );
    doc.draw_text(
        "Field names: Name, Email, Phone, DateOfBirth, EmployeeID, Department, \
         Position, StartDate, Salary, Active, Notes",
        LEFT_MARGIN,
        35.0,
    );
}

fn begin_fixture<W: Write>(writer: W) -> io::Result<PdfDocument<W>> {
    let mut doc = PdfDocument::new(writer)?;
    doc.set_info("Title", "Employee Information Form");
    doc.set_info("Creator", "pdf-form-fixture");
    doc.begin_page(PAGE_WIDTH, PAGE_HEIGHT);
    render_static_content(&mut doc);
    Ok(doc)
}

/// Variant 1: attach every field through the document's form-field
/// helper.
pub fn build_with_field_api<W: Write>(writer: W) -> io::Result<W> {
    let mut doc = begin_fixture(writer)?;
    for field in fixture_fields() {
        doc.add_field(&field)?;
    }
    doc.end_page()?;
    doc.end_document()
}

/// Variant 2: construct each widget annotation dictionary directly
/// and append it to the page's annotation array and the shared field
/// array, one descriptor per call, preserving order.
pub fn build_with_raw_objects<W: Write>(writer: W) -> io::Result<W> {
    let mut doc = begin_fixture(writer)?;
    for field in fixture_fields() {
        let dict = match field.kind {
            FieldKind::Text { multiline } => raw_text_field(&field.name, field.rect, multiline),
            FieldKind::Checkbox => raw_checkbox_field(&field.name, field.rect),
        };
        let id = doc.add_object(&dict)?;
        doc.annotate_current_page(id);
        doc.register_form_field(id);
    }
    doc.end_page()?;
    doc.end_document()
}

/// Minimal text-field widget: type tag, name, empty value, rectangle,
/// print flag.
fn raw_text_field(name: &str, rect: Rect, multiline: bool) -> PdfObject {
    let mut dict = PdfObject::dict(vec![
        ("Type", PdfObject::name("Annot")),
        ("Subtype", PdfObject::name("Widget")),
        ("FT", PdfObject::name("Tx")),
        ("T", PdfObject::string(name)),
        ("V", PdfObject::string("")),
        ("Rect", PdfObject::number_array(rect.corners())),
        ("F", PdfObject::Integer(FLAG_PRINT)),
    ]);
    if multiline {
        dict.insert("Ff", PdfObject::Integer(FF_MULTILINE));
    }
    dict
}

/// Minimal checkbox widget, default unchecked.
fn raw_checkbox_field(name: &str, rect: Rect) -> PdfObject {
    PdfObject::dict(vec![
        ("Type", PdfObject::name("Annot")),
        ("Subtype", PdfObject::name("Widget")),
        ("FT", PdfObject::name("Btn")),
        ("T", PdfObject::string(name)),
        ("V", PdfObject::name("Off")),
        ("AS", PdfObject::name("Off")),
        ("Rect", PdfObject::number_array(rect.corners())),
        ("F", PdfObject::Integer(FLAG_PRINT)),
    ])
}
