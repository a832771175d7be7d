//! Policy constants shared between the broker and the upload client.

/// Lifetime of every signed URL, measured from issuance.
pub const SIGNED_URL_TTL_SECS: u64 = 3600;

/// Maximum number of committed tags on a product. Overflowing adds are ignored.
pub const MAX_TAGS: usize = 3;

/// Bucket used when `S3_BUCKET` is unset.
pub const DEFAULT_BUCKET: &str = "beatvault-assets";

/// Signing region used when neither `S3_REGION` nor `AWS_REGION` is set.
pub const DEFAULT_REGION: &str = "auto";

/// Extension used for derived upload keys when the original filename has none.
pub const FALLBACK_EXTENSION: &str = "bin";
