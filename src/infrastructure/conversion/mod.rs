mod cloudconvert_client;

pub use cloudconvert_client::{CloudConvertClient, job_payload};
