pub mod repository;
pub mod mongo;
pub mod memory;
pub mod service;

pub use memory::MemoryRepository;
pub use mongo::MongoRepository;
pub use repository::RecordRepository;
pub use service::RecordService;
