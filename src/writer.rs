use std::io::{self, Write};

use crate::objects::{DictEntries, ObjId, PdfObject};

/// Low-level PDF binary writer. Serializes indirect objects to any
/// `Write` target while tracking byte offsets for the xref table.
pub struct PdfWriter<W: Write> {
    writer: W,
    offset: usize,
    xref_entries: Vec<(u32, usize)>,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(writer: W) -> Self {
        PdfWriter {
            writer,
            offset: 0,
            xref_entries: Vec::new(),
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.offset += data.len();
        Ok(())
    }

    /// Write the PDF 1.7 header and the binary-detection comment.
    pub fn write_header(&mut self) -> io::Result<()> {
        self.write_bytes(b"%PDF-1.7\n")?;
        // Four bytes >= 128 so transfer tools treat the file as binary.
        self.write_bytes(b"%\xe2\xe3\xcf\xd3\n")
    }

    /// Write an indirect object, recording its byte offset for the xref.
    pub fn write_object(&mut self, id: ObjId, obj: &PdfObject) -> io::Result<()> {
        self.xref_entries.push((id.0, self.offset));
        let mut body = Vec::new();
        encode_object(obj, &mut body);
        self.write_bytes(format!("{} {} obj\n", id.0, id.1).as_bytes())?;
        self.write_bytes(&body)?;
        self.write_bytes(b"\nendobj\n")
    }

    /// Write the xref table, trailer, startxref, and %%EOF.
    pub fn write_xref_and_trailer(
        &mut self,
        root_id: ObjId,
        info_id: Option<ObjId>,
    ) -> io::Result<()> {
        let xref_offset = self.offset;

        self.xref_entries.sort_by_key(|&(num, _)| num);
        let max_obj = self.xref_entries.last().map(|&(num, _)| num).unwrap_or(0);
        let size = max_obj + 1;

        self.write_bytes(format!("xref\n0 {}\n", size).as_bytes())?;

        // Object 0 is the head of the free list. Entries are exactly
        // 20 bytes including the CRLF.
        self.write_bytes(b"0000000000 65535 f\r\n")?;

        let mut offsets = std::collections::HashMap::new();
        for &(num, off) in &self.xref_entries {
            offsets.insert(num, off);
        }
        for obj_num in 1..size {
            match offsets.get(&obj_num) {
                Some(&off) => {
                    self.write_bytes(format!("{:010} 00000 n\r\n", off).as_bytes())?
                }
                // Gaps in the object number sequence become free entries.
                None => self.write_bytes(b"0000000000 00000 f\r\n")?,
            }
        }

        self.write_bytes(
            format!("trailer\n<< /Size {} /Root {} {} R", size, root_id.0, root_id.1)
                .as_bytes(),
        )?;
        if let Some(info) = info_id {
            self.write_bytes(format!(" /Info {} {} R", info.0, info.1).as_bytes())?;
        }
        self.write_bytes(b" >>\n")?;
        self.write_bytes(format!("startxref\n{}\n%%EOF\n", xref_offset).as_bytes())
    }

    /// Return the inner writer, consuming this PdfWriter.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Serialize a PdfObject to its PDF text representation.
fn encode_object(obj: &PdfObject, out: &mut Vec<u8>) {
    match obj {
        PdfObject::Null => out.extend_from_slice(b"null"),
        PdfObject::Boolean(true) => out.extend_from_slice(b"true"),
        PdfObject::Boolean(false) => out.extend_from_slice(b"false"),
        PdfObject::Integer(n) => out.extend_from_slice(n.to_string().as_bytes()),
        PdfObject::Real(v) => out.extend_from_slice(format_real(*v).as_bytes()),
        PdfObject::Name(name) => {
            out.push(b'/');
            out.extend_from_slice(name.as_bytes());
        }
        PdfObject::LiteralString(s) => {
            out.push(b'(');
            out.extend_from_slice(escape_pdf_string(s).as_bytes());
            out.push(b')');
        }
        PdfObject::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b' ');
                }
                encode_object(item, out);
            }
            out.push(b']');
        }
        PdfObject::Dictionary(entries) => encode_dict(entries, None, out),
        PdfObject::Stream { dict, data } => {
            encode_dict(dict, Some(data.len()), out);
            out.extend_from_slice(b"\nstream\n");
            out.extend_from_slice(data);
            out.extend_from_slice(b"\nendstream");
        }
        PdfObject::Reference(id) => {
            out.extend_from_slice(format!("{} {} R", id.0, id.1).as_bytes());
        }
    }
}

/// `stream_len`, when given, appends the mandatory /Length entry.
fn encode_dict(entries: &DictEntries, stream_len: Option<usize>, out: &mut Vec<u8>) {
    out.extend_from_slice(b"<<");
    for (key, val) in entries {
        out.extend_from_slice(b" /");
        out.extend_from_slice(key.as_bytes());
        out.push(b' ');
        encode_object(val, out);
    }
    if let Some(len) = stream_len {
        out.extend_from_slice(format!(" /Length {}", len).as_bytes());
    }
    out.extend_from_slice(b" >>");
}

/// Escape the characters with special meaning in a PDF literal string.
pub fn escape_pdf_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '(' => result.push_str("\\("),
            ')' => result.push_str("\\)"),
            _ => result.push(c),
        }
    }
    result
}

/// Format a float for PDF output: no trailing zeros, no scientific
/// notation.
pub(crate) fn format_real(v: f64) -> String {
    if v == v.floor() && v.abs() < 1e15 {
        format!("{:.1}", v)
    } else {
        let s = format!("{:.6}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(obj: &PdfObject) -> String {
        let mut out = Vec::new();
        encode_object(obj, &mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn header_bytes() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_header().unwrap();
        assert!(buf.starts_with(b"%PDF-1.7\n"));
        assert_eq!(buf[9], b'%');
        assert!(buf[10..14].iter().all(|&b| b >= 128));
    }

    #[test]
    fn encode_dictionary() {
        let obj = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::reference(ObjId(2, 0))),
        ]);
        assert_eq!(encoded(&obj), "<< /Type /Catalog /Pages 2 0 R >>");
    }

    #[test]
    fn encode_widget_rect_array() {
        let obj = PdfObject::number_array([200.0, 292.0, 215.0, 307.0]);
        assert_eq!(encoded(&obj), "[200.0 292.0 215.0 307.0]");
    }

    #[test]
    fn encode_stream_appends_length() {
        let obj = PdfObject::stream(vec![], b"BT ET".to_vec());
        let s = encoded(&obj);
        assert!(s.contains("/Length 5"));
        assert!(s.contains("stream\nBT ET\nendstream"));
    }

    #[test]
    fn literal_string_is_escaped() {
        let obj = PdfObject::string("a(b)c\\d");
        assert_eq!(encoded(&obj), "(a\\(b\\)c\\\\d)");
    }

    #[test]
    fn object_wrapper_and_xref() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_header().unwrap();
        w.write_object(ObjId(1, 0), &PdfObject::name("Catalog")).unwrap();
        w.write_xref_and_trailer(ObjId(1, 0), None).unwrap();

        let output = String::from_utf8_lossy(&buf);
        assert!(output.contains("1 0 obj\n/Catalog\nendobj\n"));
        assert!(output.contains("xref\n0 2\n"));
        assert!(output.contains("/Root 1 0 R"));
        assert!(output.contains("startxref"));
        assert!(output.ends_with("%%EOF\n"));
    }

    #[test]
    fn xref_entries_are_20_bytes() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_header().unwrap();
        w.write_object(ObjId(1, 0), &PdfObject::name("X")).unwrap();
        w.write_xref_and_trailer(ObjId(1, 0), None).unwrap();

        let marker = b"xref\n0 2\n";
        let pos = buf
            .windows(marker.len())
            .position(|w| w == marker)
            .unwrap();
        let entries = &buf[pos + marker.len()..];
        assert_eq!(&entries[18..20], b"\r\n");
        assert_eq!(&entries[38..40], b"\r\n");
    }

    #[test]
    fn gaps_become_free_entries() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_header().unwrap();
        w.write_object(ObjId(1, 0), &PdfObject::name("X")).unwrap();
        w.write_object(ObjId(3, 0), &PdfObject::name("Y")).unwrap();
        w.write_xref_and_trailer(ObjId(1, 0), None).unwrap();

        let output = String::from_utf8_lossy(&buf);
        assert!(output.contains("xref\n0 4\n"));
        // Object 2 was never written; its slot must read as free.
        assert!(output.contains("0000000000 00000 f\r\n"));
    }

    #[test]
    fn trailer_includes_info_when_present() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_header().unwrap();
        w.write_object(ObjId(1, 0), &PdfObject::name("Catalog")).unwrap();
        w.write_object(
            ObjId(2, 0),
            &PdfObject::dict(vec![("Creator", PdfObject::string("fixture"))]),
        )
        .unwrap();
        w.write_xref_and_trailer(ObjId(1, 0), Some(ObjId(2, 0))).unwrap();

        let output = String::from_utf8_lossy(&buf);
        assert!(output.contains("/Size 3"));
        assert!(output.contains("/Info 2 0 R"));
    }

    #[test]
    fn format_real_values() {
        assert_eq!(format_real(612.0), "612.0");
        assert_eq!(format_real(0.0), "0.0");
        assert_eq!(format_real(12.5), "12.5");
    }
}
