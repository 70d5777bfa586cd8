use std::collections::HashMap;
use std::io;
use std::path::Path;

use crate::forms::{FieldKind, FieldValue, FF_MULTILINE};

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors that can occur when reading a PDF file.
#[derive(Debug, PartialEq)]
pub enum PdfReadError {
    /// The bytes do not start with a valid `%PDF-` header.
    NotAPdf,
    /// The `startxref` keyword or its offset could not be found.
    StartxrefNotFound,
    /// The cross-reference table is missing or could not be parsed.
    MalformedXref,
    /// The trailer dictionary is missing or malformed.
    MalformedTrailer,
    /// The PDF uses a cross-reference stream (PDF 1.5+), which is not supported.
    XrefStreamNotSupported,
    /// An object reference could not be resolved (offset out of range or malformed).
    UnresolvableObject(u32),
    /// The page tree structure is invalid (missing /Count or /Pages).
    MalformedPageTree,
    /// The interactive-form dictionary or one of its fields is malformed.
    MalformedAcroForm,
    /// An I/O error occurred while opening a file.
    Io(String),
}

impl std::fmt::Display for PdfReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PdfReadError::NotAPdf => write!(f, "not a PDF file"),
            PdfReadError::StartxrefNotFound => write!(f, "startxref not found"),
            PdfReadError::MalformedXref => write!(f, "malformed or missing xref table"),
            PdfReadError::MalformedTrailer => write!(f, "malformed or missing trailer"),
            PdfReadError::XrefStreamNotSupported => {
                write!(f, "cross-reference streams (PDF 1.5+) are not supported")
            }
            PdfReadError::UnresolvableObject(n) => write!(f, "cannot resolve object {}", n),
            PdfReadError::MalformedPageTree => write!(f, "malformed page tree"),
            PdfReadError::MalformedAcroForm => write!(f, "malformed interactive form"),
            PdfReadError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for PdfReadError {}

impl From<io::Error> for PdfReadError {
    fn from(e: io::Error) -> Self {
        PdfReadError::Io(e.to_string())
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// One interactive field as read back from a document, in `/Fields`
/// array order.
#[derive(Debug, Clone, PartialEq)]
pub struct FormFieldInfo {
    pub name: String,
    pub kind: FieldKind,
    pub value: FieldValue,
    /// `[x1, y1, x2, y2]` in page coordinates.
    pub rect: [f64; 4],
}

impl FormFieldInfo {
    pub fn width(&self) -> f64 {
        self.rect[2] - self.rect[0]
    }

    pub fn height(&self) -> f64 {
        self.rect[3] - self.rect[1]
    }
}

/// Reads a generated PDF back for verification.
///
/// `PdfReader` parses the cross-reference table and trailer to resolve
/// objects, follows the catalog to count pages, and enumerates the
/// interactive form fields the generators attach. It exists so tests
/// can check fixture output without an external PDF library; it is not
/// a general-purpose parser.
///
/// # Limitations
/// Traditional xref tables only. Files using PDF 1.5+ cross-reference
/// streams return `PdfReadError::XrefStreamNotSupported`.
pub struct PdfReader {
    data: Vec<u8>,
    /// Maps each object number to its byte offset in `data`.
    xref: HashMap<u32, usize>,
    version: String,
    root_obj: u32,
    page_count: usize,
}

impl PdfReader {
    /// Open a PDF from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PdfReadError> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    /// Parse a PDF from raw bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, PdfReadError> {
        let version = parse_version(&data)?;
        let xref_offset = find_startxref(&data)?;
        let (xref, root_obj) = parse_xref_and_trailer(&data, xref_offset)?;

        let mut reader = PdfReader {
            data,
            xref,
            version,
            root_obj,
            page_count: 0,
        };
        reader.page_count = reader.resolve_page_count()?;
        Ok(reader)
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// PDF version string (e.g. `"1.7"`).
    pub fn pdf_version(&self) -> &str {
        &self.version
    }

    /// Enumerate the document's interactive form fields in `/Fields`
    /// array order. Returns an empty list when the catalog carries no
    /// interactive form.
    pub fn form_fields(&self) -> Result<Vec<FormFieldInfo>, PdfReadError> {
        let catalog = self.object_dict(self.root_obj)?;
        let acro_ref = match catalog.get("AcroForm") {
            Some(v) => v.clone(),
            None => return Ok(Vec::new()),
        };
        let acro_form = match self.resolve(&acro_ref)? {
            Value::Dict(d) => d,
            _ => return Err(PdfReadError::MalformedAcroForm),
        };
        let fields = match acro_form.get("Fields") {
            Some(v) => match self.resolve(v)? {
                Value::Array(items) => items,
                _ => return Err(PdfReadError::MalformedAcroForm),
            },
            None => return Ok(Vec::new()),
        };

        fields
            .iter()
            .map(|entry| {
                let dict = match self.resolve(entry)? {
                    Value::Dict(d) => d,
                    _ => return Err(PdfReadError::MalformedAcroForm),
                };
                parse_field(&dict)
            })
            .collect()
    }

    // ── Object resolution ─────────────────────────────────────────────────────

    /// Dereference an indirect reference; other values pass through.
    fn resolve(&self, value: &Value) -> Result<Value, PdfReadError> {
        match value {
            Value::Ref(num) => self.object(*num),
            other => Ok(other.clone()),
        }
    }

    /// Resolve an indirect object by number.
    fn object(&self, num: u32) -> Result<Value, PdfReadError> {
        let offset = self
            .xref
            .get(&num)
            .copied()
            .filter(|&off| off < self.data.len())
            .ok_or(PdfReadError::UnresolvableObject(num))?;

        let mut cursor = Cursor::new(&self.data[offset..]);
        cursor
            .skip_obj_header()
            .and_then(|_| cursor.parse_value())
            .ok_or(PdfReadError::UnresolvableObject(num))
    }

    fn object_dict(&self, num: u32) -> Result<HashMap<String, Value>, PdfReadError> {
        match self.object(num)? {
            Value::Dict(d) => Ok(d),
            _ => Err(PdfReadError::UnresolvableObject(num)),
        }
    }

    /// Follow the catalog → pages chain to read the `/Count` value.
    fn resolve_page_count(&self) -> Result<usize, PdfReadError> {
        let catalog = self.object_dict(self.root_obj)?;
        let pages_num = match catalog.get("Pages") {
            Some(Value::Ref(n)) => *n,
            _ => return Err(PdfReadError::MalformedPageTree),
        };
        let pages = self.object_dict(pages_num)?;
        match pages.get("Count") {
            Some(Value::Number(n)) if *n >= 0.0 => Ok(*n as usize),
            _ => Err(PdfReadError::MalformedPageTree),
        }
    }
}

/// Interpret a widget annotation dictionary as a form field.
fn parse_field(dict: &HashMap<String, Value>) -> Result<FormFieldInfo, PdfReadError> {
    let name = match dict.get("T") {
        Some(Value::Str(s)) => s.clone(),
        _ => return Err(PdfReadError::MalformedAcroForm),
    };

    let field_flags = match dict.get("Ff") {
        Some(Value::Number(n)) => *n as i64,
        _ => 0,
    };

    let (kind, value) = match dict.get("FT") {
        Some(Value::Name(ft)) if ft == "Tx" => {
            let text = match dict.get("V") {
                Some(Value::Str(s)) => s.clone(),
                _ => String::new(),
            };
            (
                FieldKind::Text {
                    multiline: field_flags & FF_MULTILINE != 0,
                },
                FieldValue::Text(text),
            )
        }
        Some(Value::Name(ft)) if ft == "Btn" => {
            let checked = matches!(dict.get("V"), Some(Value::Name(s)) if s != "Off");
            (FieldKind::Checkbox, FieldValue::Checked(checked))
        }
        _ => return Err(PdfReadError::MalformedAcroForm),
    };

    let rect = match dict.get("Rect") {
        Some(Value::Array(items)) if items.len() == 4 => {
            let mut rect = [0.0; 4];
            for (slot, item) in rect.iter_mut().zip(items) {
                match item {
                    Value::Number(n) => *slot = *n,
                    _ => return Err(PdfReadError::MalformedAcroForm),
                }
            }
            rect
        }
        _ => return Err(PdfReadError::MalformedAcroForm),
    };

    Ok(FormFieldInfo {
        name,
        kind,
        value,
        rect,
    })
}

// ── File-level parsing ────────────────────────────────────────────────────────

/// Extract the PDF version from the `%PDF-x.y` header.
fn parse_version(data: &[u8]) -> Result<String, PdfReadError> {
    if data.len() < 8 || !data.starts_with(b"%PDF-") {
        return Err(PdfReadError::NotAPdf);
    }
    let rest = &data[5..];
    let end = rest
        .iter()
        .position(|&b| b == b'\n' || b == b'\r' || b == b' ')
        .unwrap_or(rest.len());
    std::str::from_utf8(&rest[..end])
        .map(|s| s.to_string())
        .map_err(|_| PdfReadError::NotAPdf)
}

/// Scan backward from the end of the file for the `startxref` offset.
/// The last 1024 bytes cover trailing comments or whitespace.
fn find_startxref(data: &[u8]) -> Result<usize, PdfReadError> {
    let search_start = data.len().saturating_sub(1024);
    let tail = &data[search_start..];

    let keyword = b"startxref";
    let pos = tail
        .windows(keyword.len())
        .rposition(|w| w == keyword)
        .ok_or(PdfReadError::StartxrefNotFound)?;

    let mut cursor = Cursor::new(&tail[pos + keyword.len()..]);
    cursor.skip_whitespace();
    let offset = cursor
        .parse_unsigned()
        .ok_or(PdfReadError::StartxrefNotFound)?;

    if offset as usize >= data.len() {
        return Err(PdfReadError::StartxrefNotFound);
    }
    Ok(offset as usize)
}

/// Parse the xref table at `xref_offset` and the `/Root` reference
/// from the trailer that follows it.
fn parse_xref_and_trailer(
    data: &[u8],
    xref_offset: usize,
) -> Result<(HashMap<u32, usize>, u32), PdfReadError> {
    if xref_offset >= data.len() {
        return Err(PdfReadError::MalformedXref);
    }
    let section = &data[xref_offset..];

    // A cross-reference stream starts with "N 0 obj", not "xref".
    let mut probe = Cursor::new(section);
    probe.skip_whitespace();
    if !probe.rest().starts_with(b"xref") {
        return Err(PdfReadError::XrefStreamNotSupported);
    }

    let (xref, trailer_at) = parse_xref_table(section)?;
    let root = parse_trailer_root(&section[trailer_at..])?;
    Ok((xref, root))
}

/// Parse the traditional xref table. Each subsection has a header line
/// `{first_obj} {count}` followed by 20-byte fixed-width entries
/// `{offset:010} {gen:05} {n|f}\r\n`. Returns the offset map and the
/// position of the `trailer` keyword relative to the section start.
fn parse_xref_table(section: &[u8]) -> Result<(HashMap<u32, usize>, usize), PdfReadError> {
    let mut map = HashMap::new();
    let mut cursor = Cursor::new(section);
    cursor.skip_whitespace();
    if !cursor.consume(b"xref") {
        return Err(PdfReadError::MalformedXref);
    }

    loop {
        cursor.skip_whitespace();
        if cursor.rest().starts_with(b"trailer") {
            return Ok((map, cursor.position()));
        }

        let first_obj = cursor.parse_unsigned().ok_or(PdfReadError::MalformedXref)? as u32;
        cursor.skip_whitespace();
        let count = cursor.parse_unsigned().ok_or(PdfReadError::MalformedXref)? as usize;
        cursor.skip_line();

        let entry_size = 20;
        let entries = cursor.rest();
        if entries.len() < count * entry_size {
            return Err(PdfReadError::MalformedXref);
        }

        for i in 0..count {
            let entry = &entries[i * entry_size..(i + 1) * entry_size];
            let status = entry[17];
            if status == b'n' {
                let offset: usize = std::str::from_utf8(&entry[..10])
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .ok_or(PdfReadError::MalformedXref)?;
                let obj_num = first_obj + i as u32;
                if obj_num > 0 {
                    map.insert(obj_num, offset);
                }
            }
        }
        cursor.advance(count * entry_size);
    }
}

/// Extract the `/Root` object number from the trailer dictionary.
fn parse_trailer_root(trailer: &[u8]) -> Result<u32, PdfReadError> {
    let mut cursor = Cursor::new(trailer);
    if !cursor.consume(b"trailer") {
        return Err(PdfReadError::MalformedTrailer);
    }
    cursor.skip_whitespace();
    let dict = match cursor.parse_value() {
        Some(Value::Dict(d)) => d,
        _ => return Err(PdfReadError::MalformedTrailer),
    };
    match dict.get("Root") {
        Some(Value::Ref(n)) => Ok(*n),
        _ => Err(PdfReadError::MalformedTrailer),
    }
}

// ── Object syntax ─────────────────────────────────────────────────────────────

/// Parsed PDF object value. Streams are not represented; the reader
/// only inspects dictionaries, and a stream's dictionary parses before
/// the `stream` keyword is reached.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Name(String),
    Str(String),
    Array(Vec<Value>),
    Dict(HashMap<String, Value>),
    Ref(u32),
}

/// Byte cursor over PDF object syntax.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.data.len());
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\n' {
                break;
            }
        }
    }

    /// Consume a literal keyword, after optional whitespace.
    fn consume(&mut self, keyword: &[u8]) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    /// Skip the `N G obj` indirect object header.
    fn skip_obj_header(&mut self) -> Option<()> {
        self.skip_whitespace();
        self.parse_unsigned()?;
        self.skip_whitespace();
        self.parse_unsigned()?;
        if self.consume(b"obj") {
            Some(())
        } else {
            None
        }
    }

    fn parse_unsigned(&mut self) -> Option<u64> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        std::str::from_utf8(&self.data[start..self.pos])
            .ok()?
            .parse()
            .ok()
    }

    /// Parse one object value at the cursor.
    fn parse_value(&mut self) -> Option<Value> {
        self.skip_whitespace();
        match self.peek()? {
            b'<' if self.rest().starts_with(b"<<") => self.parse_dict(),
            b'<' => self.parse_hex_string(),
            b'[' => self.parse_array(),
            b'/' => self.parse_name().map(Value::Name),
            b'(' => self.parse_literal_string(),
            b't' if self.consume(b"true") => Some(Value::Bool(true)),
            b'f' if self.consume(b"false") => Some(Value::Bool(false)),
            b'n' if self.consume(b"null") => Some(Value::Null),
            b'+' | b'-' | b'.' | b'0'..=b'9' => self.parse_number_or_ref(),
            _ => None,
        }
    }

    fn parse_dict(&mut self) -> Option<Value> {
        self.advance(2); // <<
        let mut map = HashMap::new();
        loop {
            self.skip_whitespace();
            if self.rest().starts_with(b">>") {
                self.advance(2);
                return Some(Value::Dict(map));
            }
            if self.peek()? != b'/' {
                return None;
            }
            let key = self.parse_name()?;
            let value = self.parse_value()?;
            map.insert(key, value);
        }
    }

    fn parse_array(&mut self) -> Option<Value> {
        self.advance(1); // [
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek()? == b']' {
                self.advance(1);
                return Some(Value::Array(items));
            }
            items.push(self.parse_value()?);
        }
    }

    /// Name token after the `/`. Delimiters and whitespace end it.
    fn parse_name(&mut self) -> Option<String> {
        self.advance(1); // /
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || b"/[]<>()".contains(&b) {
                break;
            }
            self.pos += 1;
        }
        std::str::from_utf8(&self.data[start..self.pos])
            .ok()
            .map(|s| s.to_string())
    }

    fn parse_literal_string(&mut self) -> Option<Value> {
        self.advance(1); // (
        let mut out = String::new();
        let mut depth = 1;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'\\' => {
                    let escaped = self.peek()?;
                    self.pos += 1;
                    out.push(match escaped {
                        b'n' => '\n',
                        b'r' => '\r',
                        b't' => '\t',
                        other => other as char,
                    });
                }
                b'(' => {
                    depth += 1;
                    out.push('(');
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(Value::Str(out));
                    }
                    out.push(')');
                }
                other => out.push(other as char),
            }
        }
        None
    }

    /// Hex string `<...>`; decoded bytes taken as Latin-1.
    fn parse_hex_string(&mut self) -> Option<Value> {
        self.advance(1); // <
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'>' {
                break;
            }
            self.pos += 1;
        }
        let hex: Vec<u8> = self.data[start..self.pos]
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        self.advance(1); // >
        let mut out = String::new();
        for pair in hex.chunks(2) {
            let hi = (pair[0] as char).to_digit(16)?;
            let lo = pair
                .get(1)
                .map(|&b| (b as char).to_digit(16))
                .unwrap_or(Some(0))?;
            out.push((hi * 16 + lo) as u8 as char);
        }
        Some(Value::Str(out))
    }

    /// A number, or an indirect reference if the token stream reads
    /// `N G R`.
    fn parse_number_or_ref(&mut self) -> Option<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(b) if b.is_ascii_digit() || b == b'.') {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.data[start..self.pos]).ok()?;
        let number: f64 = text.parse().ok()?;

        // Lookahead for "G R"; rewind if it is not a reference.
        let saved = self.pos;
        if number >= 0.0 && number.fract() == 0.0 {
            self.skip_whitespace();
            if self.parse_unsigned().is_some() {
                self.skip_whitespace();
                let is_ref = self.peek() == Some(b'R')
                    && !matches!(
                        self.data.get(self.pos + 1),
                        Some(b) if b.is_ascii_alphanumeric()
                    );
                if is_ref {
                    self.pos += 1;
                    return Some(Value::Ref(number as u32));
                }
            }
        }
        self.pos = saved;
        Some(Value::Number(number))
    }
}
