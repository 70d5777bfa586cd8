use pdf_form_fixture::fixture::{
    build_with_field_api, build_with_raw_objects, PAGE_HEIGHT, PAGE_WIDTH, V1_FILENAME,
};
use pdf_form_fixture::{FieldKind, FieldValue, PdfReader};

const EXPECTED_NAMES: [&str; 11] = [
    "Name",
    "Email",
    "Phone",
    "DateOfBirth",
    "EmployeeID",
    "Department",
    "Position",
    "StartDate",
    "Salary",
    "Active",
    "Notes",
];

fn check_field_contract(bytes: Vec<u8>) {
    let reader = PdfReader::from_bytes(bytes).unwrap();
    assert_eq!(reader.pdf_version(), "1.7");
    assert_eq!(reader.page_count(), 1);

    let fields = reader.form_fields().unwrap();
    assert_eq!(fields.len(), 11);

    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, EXPECTED_NAMES);

    for field in &fields[..9] {
        assert_eq!(field.kind, FieldKind::Text { multiline: false });
        assert_eq!(field.value, FieldValue::Text(String::new()));
    }
    assert_eq!(fields[9].kind, FieldKind::Checkbox);
    assert_eq!(fields[9].value, FieldValue::Checked(false));
    assert_eq!(fields[10].kind, FieldKind::Text { multiline: true });
    assert_eq!(fields[10].value, FieldValue::Text(String::new()));

    for field in &fields {
        let [x1, y1, x2, y2] = field.rect;
        assert!(x2 > x1 && y2 > y1, "degenerate rect for {}", field.name);
        assert!(
            x1 >= 0.0 && y1 >= 0.0 && x2 <= PAGE_WIDTH && y2 <= PAGE_HEIGHT,
            "rect for {} outside the page",
            field.name
        );
    }
}

#[test]
fn field_api_variant_meets_contract() {
    check_field_contract(build_with_field_api(Vec::new()).unwrap());
}

#[test]
fn raw_object_variant_meets_contract() {
    check_field_contract(build_with_raw_objects(Vec::new()).unwrap());
}

#[test]
fn repeated_runs_are_byte_identical() {
    assert_eq!(
        build_with_field_api(Vec::new()).unwrap(),
        build_with_field_api(Vec::new()).unwrap()
    );
    assert_eq!(
        build_with_raw_objects(Vec::new()).unwrap(),
        build_with_raw_objects(Vec::new()).unwrap()
    );
}

#[test]
fn static_content_is_drawn() {
    let bytes = build_with_field_api(Vec::new()).unwrap();
    let output = String::from_utf8_lossy(&bytes);
    assert!(output.contains("(Employee Information Form) Tj"));
    assert!(output.contains("(Please fill out all fields below:) Tj"));
    assert!(output.contains("(Full Name:) Tj"));
    assert!(output.contains("(Additional Notes:) Tj"));
    assert!(output.contains("(This is a test form for API testing purposes) Tj"));
    // Title bold 24pt, labels bold 11pt, footer oblique 9pt.
    assert!(output.contains("/F2 24 Tf"));
    assert!(output.contains("/F2 11 Tf"));
    assert!(output.contains("/F3 9 Tf"));
}

#[test]
fn notes_rectangle_is_larger() {
    let fields = PdfReader::from_bytes(build_with_field_api(Vec::new()).unwrap())
        .unwrap()
        .form_fields()
        .unwrap();
    let notes = fields.last().unwrap();
    assert_eq!(notes.width(), 500.0);
    assert_eq!(notes.height(), 60.0);
    // Every other field is a 20pt row or the 15pt checkbox.
    for field in &fields[..10] {
        assert!(field.height() < notes.height());
    }
}

#[test]
fn written_file_opens_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(V1_FILENAME);

    let bytes = build_with_field_api(Vec::new()).unwrap();
    std::fs::write(&path, &bytes).unwrap();

    let reader = PdfReader::open(&path).unwrap();
    assert_eq!(reader.page_count(), 1);
    assert_eq!(reader.form_fields().unwrap().len(), 11);
}

/// The two construction strategies must be interchangeable: same
/// names, kinds, and default values, in the same order.
#[test]
fn variants_agree_on_field_set() {
    let v1 = PdfReader::from_bytes(build_with_field_api(Vec::new()).unwrap())
        .unwrap()
        .form_fields()
        .unwrap();
    let v2 = PdfReader::from_bytes(build_with_raw_objects(Vec::new()).unwrap())
        .unwrap()
        .form_fields()
        .unwrap();

    assert_eq!(v1.len(), v2.len());
    for (a, b) in v1.iter().zip(&v2) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.value, b.value);
        assert_eq!(a.rect, b.rect);
    }
}
