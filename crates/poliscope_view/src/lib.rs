#![forbid(unsafe_code)]

pub mod detail;
pub mod diag;
pub mod env;
pub mod render;

pub use detail::{
    DeleteOutcome, DetailViewConfig, DetailViewController, FavoriteOutcome, LoadOutcome,
    LoadResolution, LoadSeq, LoadTicket, ViewSnapshot,
};
pub use diag::{DiagnosticEvent, DiagnosticKind, DiagnosticsSink, MemoryDiagnostics};
pub use env::{NavTarget, PageEnvironment, ScriptedEnvironment};
pub use render::{render_page, PageAction, PageRender, PolicyView};
