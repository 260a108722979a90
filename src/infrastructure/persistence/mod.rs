mod in_memory_job_repository;
mod pg_pool;
mod pg_job_repository;

pub use in_memory_job_repository::InMemoryJobRepository;
pub use pg_job_repository::PgJobRepository;
pub use pg_pool::create_pool;
