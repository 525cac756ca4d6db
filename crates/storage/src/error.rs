/// Errors from the object store.
///
/// SDK error chains are flattened to their display form; the operation and
/// key are what call sites act on.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to store object '{key}': {message}")]
    Put { key: String, message: String },

    #[error("Failed to delete object '{key}': {message}")]
    Delete { key: String, message: String },
}
