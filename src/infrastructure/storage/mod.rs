mod mock_store;
mod object_store_adapter;
mod store_factory;

pub use mock_store::MockArtifactStore;
pub use object_store_adapter::ObjectStoreAdapter;
pub use store_factory::ArtifactStoreFactory;
