use super::backend::StorageBackend;
use super::LibraryDocument;
use crate::error::{Result, VaultError};
use std::cell::RefCell;

/// In-memory backend for testing.
///
/// Uses `RefCell` for interior mutability since tunevault is
/// single-threaded. This keeps the `StorageBackend` trait on `&self`
/// without the overhead of a lock.
#[derive(Default)]
pub struct MemBackend {
    doc: RefCell<LibraryDocument>,
    simulate_write_error: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Snapshot of the last saved document, for assertions.
    pub fn saved_document(&self) -> LibraryDocument {
        self.doc.borrow().clone()
    }
}

impl StorageBackend for MemBackend {
    fn load(&self) -> Result<LibraryDocument> {
        Ok(self.doc.borrow().clone())
    }

    fn save(&self, doc: &LibraryDocument) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(VaultError::Store("Simulated write error".to_string()));
        }
        *self.doc.borrow_mut() = doc.clone();
        Ok(())
    }
}
