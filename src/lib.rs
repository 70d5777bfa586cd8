pub mod document;
pub mod fixture;
pub mod fonts;
pub mod forms;
pub mod objects;
pub mod reader;
pub mod writer;

pub use document::PdfDocument;
pub use fixture::{build_with_field_api, build_with_raw_objects};
pub use fonts::BuiltinFont;
pub use forms::{FieldDescriptor, FieldKind, FieldValue, Rect};
pub use reader::{FormFieldInfo, PdfReadError, PdfReader};
