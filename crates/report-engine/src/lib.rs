//! Report assembly: compliance results in, on-screen view models and
//! paginated PDFs out.
//!
//! Two layers, deliberately separated:
//!
//! - [`renderer`] maps a `RenderableResult` / `BatchResult` into a
//!   structured [`view`] model. Pure data in, pure data out: the same
//!   view model feeds both the on-screen renderer (as JSON) and the PDF
//!   builder, so formatting logic exists exactly once.
//! - [`pdf`] walks a view model and emits draw instructions onto an
//!   abstract [`canvas::PageCanvas`], inserting page breaks whenever the
//!   layout cursor would leave the printable area. [`canvas::LopdfCanvas`]
//!   turns those instructions into a downloadable PDF.

pub mod canvas;
pub mod pdf;
pub mod renderer;
pub mod view;

pub use canvas::{LopdfCanvas, PageCanvas, Rgb};
pub use pdf::{batch_report_filename, report_filename, PdfReportBuilder};
pub use renderer::{render, render_batch};
pub use view::{BatchDocView, BatchReportView, ReportView};
