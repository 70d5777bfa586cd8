use crate::objects::PdfObject;

/// Annotation flag bit 3: the widget is included when the page prints.
pub const FLAG_PRINT: i64 = 4;

/// Field flag bit 13 (`/Ff`): a text field accepts multiple lines.
pub const FF_MULTILINE: i64 = 1 << 12;

/// Default appearance string shared by all text fields. `/Helv` is
/// resolved through the AcroForm resource dictionary.
pub const TEXT_FIELD_DA: &str = "/Helv 11 Tf 0 g";

/// Field rectangle in page coordinates (bottom-left origin), stored as
/// position plus extent rather than the corner pair PDF serializes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }

    /// The `[x1 y1 x2 y2]` corner form used by `/Rect`.
    pub fn corners(&self) -> [f64; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }
}

/// What sort of interactive field a descriptor stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text { multiline: bool },
    Checkbox,
}

/// Kind-matched default value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Checked(bool),
}

/// Describes one interactive form field: its name (unique per document,
/// by caller's convention), kind, placement, default value, and
/// annotation flags.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub rect: Rect,
    pub default: FieldValue,
    pub flags: i64,
}

impl FieldDescriptor {
    /// Single-line text field with an empty default.
    pub fn text(name: &str, rect: Rect) -> Self {
        FieldDescriptor {
            name: name.to_string(),
            kind: FieldKind::Text { multiline: false },
            rect,
            default: FieldValue::Text(String::new()),
            flags: FLAG_PRINT,
        }
    }

    /// Multi-line text field with an empty default.
    pub fn multiline_text(name: &str, rect: Rect) -> Self {
        FieldDescriptor {
            kind: FieldKind::Text { multiline: true },
            ..Self::text(name, rect)
        }
    }

    /// Checkbox field. `size` is both width and height.
    pub fn checkbox(name: &str, x: f64, y: f64, size: f64, checked: bool) -> Self {
        FieldDescriptor {
            name: name.to_string(),
            kind: FieldKind::Checkbox,
            rect: Rect::new(x, y, size, size),
            default: FieldValue::Checked(checked),
            flags: FLAG_PRINT,
        }
    }

    /// Build the widget annotation dictionary for this field:
    /// the field entries (`/FT /T /V /Ff`), the annotation entries
    /// (`/Type /Subtype /Rect /F`), and the border cosmetics the
    /// original fixture forces on every field.
    pub fn widget_dict(&self) -> PdfObject {
        let mut dict = PdfObject::dict(vec![
            ("Type", PdfObject::name("Annot")),
            ("Subtype", PdfObject::name("Widget")),
        ]);

        match &self.kind {
            FieldKind::Text { multiline } => {
                dict.insert("FT", PdfObject::name("Tx"));
                dict.insert("T", PdfObject::string(&self.name));
                let text = match &self.default {
                    FieldValue::Text(s) => s.as_str(),
                    FieldValue::Checked(_) => "",
                };
                dict.insert("V", PdfObject::string(text));
                if *multiline {
                    dict.insert("Ff", PdfObject::Integer(FF_MULTILINE));
                }
                dict.insert("DA", PdfObject::string(TEXT_FIELD_DA));
            }
            FieldKind::Checkbox => {
                dict.insert("FT", PdfObject::name("Btn"));
                dict.insert("T", PdfObject::string(&self.name));
                let state = match self.default {
                    FieldValue::Checked(true) => "Yes",
                    _ => "Off",
                };
                dict.insert("V", PdfObject::name(state));
                dict.insert("AS", PdfObject::name(state));
            }
        }

        dict.insert("Rect", PdfObject::number_array(self.rect.corners()));
        dict.insert("F", PdfObject::Integer(self.flags));

        // Black border on white background, solid 1pt line.
        dict.insert(
            "MK",
            PdfObject::dict(vec![
                ("BC", PdfObject::array(vec![PdfObject::Real(0.0)])),
                ("BG", PdfObject::array(vec![PdfObject::Real(1.0)])),
            ]),
        );
        dict.insert(
            "BS",
            PdfObject::dict(vec![
                ("W", PdfObject::Real(1.0)),
                ("S", PdfObject::name("S")),
            ]),
        );

        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_of(obj: &PdfObject) -> &str {
        match obj {
            PdfObject::Name(s) => s,
            _ => panic!("expected Name"),
        }
    }

    #[test]
    fn rect_corners() {
        let r = Rect::new(200.0, 292.0, 15.0, 15.0);
        assert_eq!(r.corners(), [200.0, 292.0, 215.0, 307.0]);
    }

    #[test]
    fn text_field_defaults() {
        let f = FieldDescriptor::text("Email", Rect::new(200.0, 632.0, 300.0, 20.0));
        assert_eq!(f.kind, FieldKind::Text { multiline: false });
        assert_eq!(f.default, FieldValue::Text(String::new()));
        assert_eq!(f.flags, FLAG_PRINT);
    }

    #[test]
    fn text_widget_dict_entries() {
        let f = FieldDescriptor::text("Email", Rect::new(200.0, 632.0, 300.0, 20.0));
        let dict = f.widget_dict();
        assert_eq!(name_of(dict.get("FT").unwrap()), "Tx");
        assert_eq!(name_of(dict.get("Subtype").unwrap()), "Widget");
        assert!(matches!(dict.get("T"), Some(PdfObject::LiteralString(s)) if s == "Email"));
        assert!(matches!(dict.get("V"), Some(PdfObject::LiteralString(s)) if s.is_empty()));
        assert!(matches!(dict.get("F"), Some(PdfObject::Integer(4))));
        assert!(dict.get("Ff").is_none());
        assert!(dict.get("DA").is_some());
    }

    #[test]
    fn multiline_sets_field_flag() {
        let f = FieldDescriptor::multiline_text("Notes", Rect::new(50.0, 232.0, 500.0, 60.0));
        let dict = f.widget_dict();
        assert!(matches!(dict.get("Ff"), Some(PdfObject::Integer(v)) if *v == FF_MULTILINE));
    }

    #[test]
    fn unchecked_checkbox_is_off() {
        let f = FieldDescriptor::checkbox("Active", 200.0, 292.0, 15.0, false);
        let dict = f.widget_dict();
        assert_eq!(name_of(dict.get("FT").unwrap()), "Btn");
        assert_eq!(name_of(dict.get("V").unwrap()), "Off");
        assert_eq!(name_of(dict.get("AS").unwrap()), "Off");
    }

    #[test]
    fn checked_checkbox_is_yes() {
        let f = FieldDescriptor::checkbox("Active", 200.0, 292.0, 15.0, true);
        let dict = f.widget_dict();
        assert_eq!(name_of(dict.get("V").unwrap()), "Yes");
    }

    #[test]
    fn checkbox_rect_is_square() {
        let f = FieldDescriptor::checkbox("Active", 200.0, 292.0, 15.0, false);
        assert_eq!(f.rect.width, f.rect.height);
    }
}
