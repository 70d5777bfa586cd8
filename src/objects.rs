/// Indirect object identifier: (object number, generation number).
/// Freshly generated documents only ever use generation 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId(pub u32, pub u16);

/// Dictionary entries as ordered key-value pairs. A `Vec` rather than a
/// map keeps serialization order deterministic, which in turn keeps
/// repeated runs of a generator byte-identical.
pub type DictEntries = Vec<(String, PdfObject)>;

/// The PDF object types of PDF 32000-1:2008 section 7.3.
#[derive(Debug, Clone)]
pub enum PdfObject {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    /// Name object, stored without the leading `/`.
    Name(String),
    /// Literal string, stored without the enclosing parens and unescaped.
    LiteralString(String),
    Array(Vec<PdfObject>),
    Dictionary(DictEntries),
    Stream { dict: DictEntries, data: Vec<u8> },
    Reference(ObjId),
}

impl PdfObject {
    pub fn name(s: &str) -> Self {
        PdfObject::Name(s.to_string())
    }

    pub fn string(s: &str) -> Self {
        PdfObject::LiteralString(s.to_string())
    }

    pub fn reference(id: ObjId) -> Self {
        PdfObject::Reference(id)
    }

    pub fn array(items: Vec<PdfObject>) -> Self {
        PdfObject::Array(items)
    }

    /// Array of four numbers, the shape `/Rect` and `/MediaBox` take.
    pub fn number_array(values: [f64; 4]) -> Self {
        PdfObject::Array(values.iter().map(|&v| PdfObject::Real(v)).collect())
    }

    pub fn dict(entries: Vec<(&str, PdfObject)>) -> Self {
        PdfObject::Dictionary(own_entries(entries))
    }

    pub fn stream(dict_entries: Vec<(&str, PdfObject)>, data: Vec<u8>) -> Self {
        PdfObject::Stream {
            dict: own_entries(dict_entries),
            data,
        }
    }

    /// For dictionary objects, append an entry in place. No-op for
    /// other variants.
    pub fn insert(&mut self, key: &str, value: PdfObject) {
        if let PdfObject::Dictionary(entries) = self {
            entries.push((key.to_string(), value));
        }
    }

    /// For dictionary objects, look up the first entry with `key`.
    pub fn get(&self, key: &str) -> Option<&PdfObject> {
        match self {
            PdfObject::Dictionary(entries) => entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

fn own_entries(entries: Vec<(&str, PdfObject)>) -> DictEntries {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obj_id_equality() {
        assert_eq!(ObjId(1, 0), ObjId(1, 0));
        assert_ne!(ObjId(1, 0), ObjId(2, 0));
    }

    #[test]
    fn name_constructor() {
        match PdfObject::name("Annot") {
            PdfObject::Name(s) => assert_eq!(s, "Annot"),
            _ => panic!("expected Name"),
        }
    }

    #[test]
    fn dict_preserves_entry_order() {
        let obj = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::reference(ObjId(2, 0))),
            ("AcroForm", PdfObject::reference(ObjId(9, 0))),
        ]);
        match obj {
            PdfObject::Dictionary(entries) => {
                let keys: Vec<&str> =
                    entries.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, ["Type", "Pages", "AcroForm"]);
            }
            _ => panic!("expected Dictionary"),
        }
    }

    #[test]
    fn insert_appends_to_dictionary() {
        let mut obj = PdfObject::dict(vec![("FT", PdfObject::name("Tx"))]);
        obj.insert("T", PdfObject::string("Name"));
        match &obj {
            PdfObject::Dictionary(entries) => assert_eq!(entries.len(), 2),
            _ => panic!("expected Dictionary"),
        }
        assert!(matches!(obj.get("T"), Some(PdfObject::LiteralString(s)) if s == "Name"));
    }

    #[test]
    fn number_array_has_four_reals() {
        match PdfObject::number_array([200.0, 292.0, 215.0, 307.0]) {
            PdfObject::Array(items) => {
                assert_eq!(items.len(), 4);
                assert!(matches!(items[0], PdfObject::Real(v) if v == 200.0));
            }
            _ => panic!("expected Array"),
        }
    }

    #[test]
    fn stream_keeps_data() {
        let data = b"BT /F1 11 Tf ET".to_vec();
        match PdfObject::stream(vec![], data.clone()) {
            PdfObject::Stream { dict, data: d } => {
                assert!(dict.is_empty());
                assert_eq!(d, data);
            }
            _ => panic!("expected Stream"),
        }
    }
}
