mod local_temp_store;

pub use local_temp_store::LocalTempFileStore;
