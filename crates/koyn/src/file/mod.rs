//! File attachments: object store boundary plus metadata bookkeeping.

mod models;
mod repository;
mod service;
pub mod store;

pub use models::{CreateFile, StoredFile};
pub use repository::FileRepository;
pub use service::FileService;
pub use store::{FsObjectStore, ObjectStore, StoredObject};
