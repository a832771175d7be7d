pub mod health;
pub mod sign_upload_url;
pub mod sign_url;
