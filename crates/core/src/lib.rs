//! Core document model, undo history, mutators and exercise library for
//! rehabilitation protocol editing.

pub mod debounce;
pub mod error;
pub mod gateway;
pub mod history;
pub mod ids;
pub mod library;
pub mod mutate;
pub mod persist;
pub mod session;
pub mod types;
pub mod video;

pub use debounce::Debouncer;
pub use error::{Error, Result};
pub use gateway::{
    DuplicateGroup, EnrichmentGateway, GatewayError, GatewayResult, MergeSuggestion,
    PartialLibraryItem,
};
pub use history::History;
pub use ids::IdGenerator;
pub use library::LibraryDraft;
pub use mutate::{Direction, ItemPatch, MetadataField, SectionPatch, SlidePatch};
pub use session::{EditorSession, Outcome};
pub use types::{
    CompileMode, LibraryItem, ProtocolDocument, Section, SectionItem, SectionKind, Slide,
    SlideKind,
};
