// Central constants for credits, limits, and timeouts.
pub const DAILY_CREDIT_ALLOWANCE: i32 = 5;

/// Image slots for models that accept several reference images.
pub const MULTI_IMAGE_CAPACITY: usize = 5;
pub const SINGLE_IMAGE_CAPACITY: usize = 1;

/// Seconds the provider is asked to hold the request open before we
/// fall back to async polling (`Prefer: wait=N`).
pub const SYNC_WAIT_SECS: u32 = 55;
pub const POLL_INTERVAL_SECS: u64 = 2;
/// Upper bound on poll attempts (~5 minutes at 2s intervals). A stuck
/// provider job must not pin a worker task forever.
pub const MAX_POLL_ATTEMPTS: u32 = 150;

pub const LONG_POLL_TIMEOUT_SECS: u64 = 60;
pub const PLATFORM_HTTP_TIMEOUT_SECS: u64 = 30;
pub const STORAGE_HTTP_TIMEOUT_SECS: u64 = 30;
pub const GENERATE_HTTP_TIMEOUT_SECS: u64 = 120;
pub const POLL_HTTP_TIMEOUT_SECS: u64 = 10;

pub const BUCKET_NAME: &str = "bot-uploads";
pub const DEFAULT_LANG: &str = "en";
pub const CONFIG_DIR: &str = "config";
pub const LOCALES_DIR: &str = "locales";
