//! Named blob persistence for the station's configuration documents.
//!
//! The core defines *what* is read and written (`turnouts.json`,
//! `trains.json`, the descriptor XML files); how the bytes reach flash or
//! disk is the implementor's business.

/// Persistence collaborator for named text documents.
///
/// Lookups that find nothing return `Ok(None)` - a missing document is
/// normal on first boot and never an error. The associated `Error` type
/// covers genuine I/O failures only.
///
/// A `HashMap`-backed implementation for tests lives at
/// [`crate::hal::mock::MemStorage`].
pub trait Storage {
    /// I/O failure type.
    type Error;

    /// Whether a document with this name is currently stored.
    fn exists(&self, name: &str) -> bool;

    /// Read a document, `Ok(None)` when absent.
    fn read(&self, name: &str) -> Result<Option<String>, Self::Error>;

    /// Create or replace a document.
    fn write(&mut self, name: &str, contents: &str) -> Result<(), Self::Error>;

    /// Delete a document. Deleting an absent document is a no-op.
    fn remove(&mut self, name: &str) -> Result<(), Self::Error>;
}
