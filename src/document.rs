use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::fonts::BuiltinFont;
use crate::forms::FieldDescriptor;
use crate::objects::{ObjId, PdfObject};
use crate::writer::{escape_pdf_string, PdfWriter};

const CATALOG_OBJ: ObjId = ObjId(1, 0);
const PAGES_OBJ: ObjId = ObjId(2, 0);
const FIRST_DYNAMIC_OBJ_NUM: u32 = 3;

const DEFAULT_FONT: BuiltinFont = BuiltinFont::Helvetica;
const DEFAULT_FONT_SIZE: f64 = 12.0;

/// High-level API for building PDF documents with interactive form
/// fields.
///
/// Generic over `Write` so it works with files (`BufWriter<File>`),
/// in-memory buffers (`Vec<u8>`), or any other writer.
///
/// Pages are written incrementally: `end_page()` flushes page data to
/// the writer and frees page content from memory. Font objects and the
/// interactive-form dictionary are deferred to `end_document()`, since
/// indirect references may point at objects that are written later.
///
/// Form fields can be attached two ways with identical results:
/// through [`add_field`](Self::add_field), which builds the widget
/// annotation from a [`FieldDescriptor`], or through the low-level
/// trio [`add_object`](Self::add_object) /
/// [`annotate_current_page`](Self::annotate_current_page) /
/// [`register_form_field`](Self::register_form_field) for callers that
/// assemble the annotation dictionary themselves. Either way the
/// field ends up in both the page's `/Annots` and the document's
/// shared `/Fields` array, in call order. Field-name uniqueness is the
/// caller's responsibility.
pub struct PdfDocument<W: Write> {
    writer: PdfWriter<W>,
    info: Vec<(String, String)>,
    page_obj_ids: Vec<ObjId>,
    current_page: Option<PageBuilder>,
    next_obj_num: u32,
    /// Fonts get an object id on first use; the objects themselves are
    /// written by end_document.
    fonts: BTreeMap<BuiltinFont, ObjId>,
    form_field_ids: Vec<ObjId>,
    compress_streams: bool,
    current_font: BuiltinFont,
    current_font_size: f64,
}

struct PageBuilder {
    width: f64,
    height: f64,
    content_ops: Vec<u8>,
    fonts_used: BTreeSet<BuiltinFont>,
    annot_ids: Vec<ObjId>,
}

impl PdfDocument<BufWriter<File>> {
    /// Create a new PDF document that writes to a file.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> PdfDocument<W> {
    /// Create a new PDF document that writes to the given writer.
    /// The PDF header goes out immediately.
    pub fn new(writer: W) -> io::Result<Self> {
        let mut pdf_writer = PdfWriter::new(writer);
        pdf_writer.write_header()?;

        Ok(PdfDocument {
            writer: pdf_writer,
            info: Vec::new(),
            page_obj_ids: Vec::new(),
            current_page: None,
            next_obj_num: FIRST_DYNAMIC_OBJ_NUM,
            fonts: BTreeMap::new(),
            form_field_ids: Vec::new(),
            compress_streams: false,
            current_font: DEFAULT_FONT,
            current_font_size: DEFAULT_FONT_SIZE,
        })
    }

    /// Set a document info entry (e.g. "Creator", "Title").
    pub fn set_info(&mut self, key: &str, value: &str) -> &mut Self {
        self.info.push((key.to_string(), value.to_string()));
        self
    }

    /// FlateDecode-compress page content streams. Off by default so
    /// fixture output stays readable in a text editor.
    pub fn compress_streams(&mut self, on: bool) -> &mut Self {
        self.compress_streams = on;
        self
    }

    /// Begin a new page with the given dimensions in points.
    /// If a page is currently open, it is automatically closed.
    pub fn begin_page(&mut self, width: f64, height: f64) -> &mut Self {
        if self.current_page.is_some() {
            // Auto-close previous page. Ignore write errors here;
            // end_page will catch them.
            let _ = self.end_page();
        }
        self.current_page = Some(PageBuilder {
            width,
            height,
            content_ops: Vec::new(),
            fonts_used: BTreeSet::new(),
            annot_ids: Vec::new(),
        });
        self
    }

    /// Select the font and size used by subsequent draw_text calls.
    pub fn set_font(&mut self, font: BuiltinFont, size: f64) -> &mut Self {
        self.current_font = font;
        self.current_font_size = size;
        self
    }

    /// Place text at position (x, y) in the current font. Coordinates
    /// use PDF's bottom-left origin.
    pub fn draw_text(&mut self, text: &str, x: f64, y: f64) -> &mut Self {
        let font = self.current_font;
        let size = self.current_font_size;
        let page = self
            .current_page
            .as_mut()
            .expect("draw_text called with no open page");
        page.fonts_used.insert(font);
        let ops = format!(
            "BT\n/{} {} Tf\n{} {} Td\n({}) Tj\nET\n",
            font.pdf_name(),
            format_coord(size),
            format_coord(x),
            format_coord(y),
            escape_pdf_string(text),
        );
        page.content_ops.extend_from_slice(ops.as_bytes());
        self
    }

    /// Attach a form field to the current page: builds the widget
    /// annotation from the descriptor, writes it, and appends it to
    /// the page's annotations and the document's field array.
    pub fn add_field(&mut self, field: &FieldDescriptor) -> io::Result<ObjId> {
        let id = self.add_object(&field.widget_dict())?;
        self.annotate_current_page(id);
        self.register_form_field(id);
        Ok(id)
    }

    /// Write an arbitrary indirect object, returning its assigned id.
    pub fn add_object(&mut self, obj: &PdfObject) -> io::Result<ObjId> {
        let id = self.alloc_obj_id();
        self.writer.write_object(id, obj)?;
        Ok(id)
    }

    /// Append an already-written annotation to the current page's
    /// `/Annots` array.
    pub fn annotate_current_page(&mut self, id: ObjId) {
        let page = self
            .current_page
            .as_mut()
            .expect("annotate_current_page called with no open page");
        page.annot_ids.push(id);
    }

    /// Append an already-written field annotation to the document's
    /// interactive-form `/Fields` array. The array is created on first
    /// use and shared from then on; entries keep call order.
    pub fn register_form_field(&mut self, id: ObjId) {
        self.form_field_ids.push(id);
    }

    /// End the current page. Writes the content stream and page
    /// dictionary, freeing page content from memory.
    pub fn end_page(&mut self) -> io::Result<()> {
        let page = self
            .current_page
            .take()
            .expect("end_page called with no open page");

        let content_obj = self.content_stream(page.content_ops)?;
        let content_id = self.add_object(&content_obj)?;

        let font_entries: Vec<(&str, PdfObject)> = page
            .fonts_used
            .iter()
            .map(|&font| {
                let id = font_id(&mut self.fonts, &mut self.next_obj_num, font);
                (font.pdf_name(), PdfObject::reference(id))
            })
            .collect();

        let mut page_dict = PdfObject::dict(vec![
            ("Type", PdfObject::name("Page")),
            ("Parent", PdfObject::reference(PAGES_OBJ)),
            (
                "MediaBox",
                PdfObject::number_array([0.0, 0.0, page.width, page.height]),
            ),
            ("Contents", PdfObject::reference(content_id)),
            (
                "Resources",
                PdfObject::dict(vec![("Font", PdfObject::dict(font_entries))]),
            ),
        ]);
        if !page.annot_ids.is_empty() {
            page_dict.insert(
                "Annots",
                PdfObject::Array(
                    page.annot_ids
                        .iter()
                        .map(|&id| PdfObject::reference(id))
                        .collect(),
                ),
            );
        }

        let page_id = self.add_object(&page_dict)?;
        self.page_obj_ids.push(page_id);
        Ok(())
    }

    /// Finish the document. Writes deferred font objects, the
    /// interactive-form dictionary (when any field was registered),
    /// the info dictionary, pages tree, catalog, xref table, and
    /// trailer. Consumes self.
    pub fn end_document(mut self) -> io::Result<W> {
        if self.current_page.is_some() {
            self.end_page()?;
        }

        let acro_form_id = if self.form_field_ids.is_empty() {
            None
        } else {
            // The default-appearance font for field text; widgets
            // reference it as /Helv through /DR.
            let helv_id = font_id(
                &mut self.fonts,
                &mut self.next_obj_num,
                BuiltinFont::Helvetica,
            );
            let fields = PdfObject::Array(
                self.form_field_ids
                    .iter()
                    .map(|&id| PdfObject::reference(id))
                    .collect(),
            );
            let acro_form = PdfObject::dict(vec![
                ("Fields", fields),
                // Viewers regenerate widget appearances; the fixture
                // carries no appearance streams of its own.
                ("NeedAppearances", PdfObject::Boolean(true)),
                ("DA", PdfObject::string("/Helv 0 Tf 0 g")),
                (
                    "DR",
                    PdfObject::dict(vec![(
                        "Font",
                        PdfObject::dict(vec![("Helv", PdfObject::reference(helv_id))]),
                    )]),
                ),
            ]);
            Some(self.add_object(&acro_form)?)
        };

        // Deferred font objects.
        for (&font, &id) in &self.fonts {
            let font_obj = PdfObject::dict(vec![
                ("Type", PdfObject::name("Font")),
                ("Subtype", PdfObject::name("Type1")),
                ("BaseFont", PdfObject::name(font.pdf_base_name())),
            ]);
            self.writer.write_object(id, &font_obj)?;
        }

        let info_id = if self.info.is_empty() {
            None
        } else {
            let entries: Vec<(&str, PdfObject)> = self
                .info
                .iter()
                .map(|(k, v)| (k.as_str(), PdfObject::string(v)))
                .collect();
            let id = ObjId(self.next_obj_num, 0);
            self.next_obj_num += 1;
            self.writer.write_object(id, &PdfObject::dict(entries))?;
            Some(id)
        };

        let kids: Vec<PdfObject> = self
            .page_obj_ids
            .iter()
            .map(|&id| PdfObject::reference(id))
            .collect();
        let page_count = self.page_obj_ids.len() as i64;
        let pages = PdfObject::dict(vec![
            ("Type", PdfObject::name("Pages")),
            ("Kids", PdfObject::Array(kids)),
            ("Count", PdfObject::Integer(page_count)),
        ]);
        self.writer.write_object(PAGES_OBJ, &pages)?;

        let mut catalog = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::reference(PAGES_OBJ)),
        ]);
        if let Some(id) = acro_form_id {
            catalog.insert("AcroForm", PdfObject::reference(id));
        }
        self.writer.write_object(CATALOG_OBJ, &catalog)?;

        self.writer.write_xref_and_trailer(CATALOG_OBJ, info_id)?;
        Ok(self.writer.into_inner())
    }

    fn alloc_obj_id(&mut self) -> ObjId {
        let id = ObjId(self.next_obj_num, 0);
        self.next_obj_num += 1;
        id
    }

    fn content_stream(&self, ops: Vec<u8>) -> io::Result<PdfObject> {
        if self.compress_streams {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&ops)?;
            let data = encoder.finish()?;
            Ok(PdfObject::stream(
                vec![("Filter", PdfObject::name("FlateDecode"))],
                data,
            ))
        } else {
            Ok(PdfObject::stream(vec![], ops))
        }
    }
}

/// Assign an object id to a font on first use.
fn font_id(
    fonts: &mut BTreeMap<BuiltinFont, ObjId>,
    next_obj_num: &mut u32,
    font: BuiltinFont,
) -> ObjId {
    *fonts.entry(font).or_insert_with(|| {
        let id = ObjId(*next_obj_num, 0);
        *next_obj_num += 1;
        id
    })
}

/// Format a coordinate or size for content streams: integers without a
/// decimal point, fractions trimmed.
pub(crate) fn format_coord(v: f64) -> String {
    if v == v.floor() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.4}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
