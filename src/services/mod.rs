pub mod cloudinary;
pub mod ingest;
pub mod remote;
pub mod staging;
pub mod storage;
