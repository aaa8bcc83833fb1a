use crate::error::Result;
use crate::store::LibraryDocument;

/// Abstract interface for raw document I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while `MirrorStore` handles the "what" (tables, queries, invariants).
pub trait StorageBackend {
    /// Load the whole library document. A missing backing file yields an
    /// empty document, not an error.
    fn load(&self) -> Result<LibraryDocument>;

    /// Persist the whole library document.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn save(&self, doc: &LibraryDocument) -> Result<()>;
}
