pub mod cluster;
pub mod gcloud;
pub mod pod;
