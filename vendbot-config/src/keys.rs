//! Environment / .env keys read by the loader. Aliases follow their primary key.

pub const BOT_TOKEN: &str = "BOT_TOKEN";
pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_API_URL: &str = "TELEGRAM_API_URL";
pub const TELOXIDE_API_URL: &str = "TELOXIDE_API_URL";

pub const DEPLOYMENT_STAGE: &str = "DEPLOYMENT_STAGE";
pub const ENVIRONMENT: &str = "ENVIRONMENT";
pub const APP_NAME: &str = "APP_NAME";

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const SQLITE_PATH: &str = "SQLITE_PATH";
pub const DATABASE_POOL_SIZE: &str = "DATABASE_POOL_SIZE";

pub const REDIS_URL: &str = "REDIS_URL";

pub const WEBHOOK_URL: &str = "WEBHOOK_URL";
pub const WEBHOOK_PATH: &str = "WEBHOOK_PATH";
pub const WEBHOOK_SECRET: &str = "WEBHOOK_SECRET";

pub const ADMIN_USER_ID: &str = "ADMIN_USER_ID";

pub const STORAGE_TYPE: &str = "STORAGE_TYPE";
pub const UPLOAD_DIR: &str = "UPLOAD_DIR";
pub const CLOUDINARY_URL: &str = "CLOUDINARY_URL";
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_BUCKET_NAME: &str = "AWS_BUCKET_NAME";
pub const AWS_REGION: &str = "AWS_REGION";

pub const SECRET_KEY: &str = "SECRET_KEY";

pub const LOG_LEVEL: &str = "LOG_LEVEL";
pub const LOG_FILE: &str = "LOG_FILE";
pub const LOG_JSON: &str = "LOG_JSON";
pub const SENTRY_DSN: &str = "SENTRY_DSN";

/// Every key the loader asks the environment for.
pub const ALL: &[&str] = &[
    BOT_TOKEN,
    TELEGRAM_BOT_TOKEN,
    TELEGRAM_API_URL,
    TELOXIDE_API_URL,
    DEPLOYMENT_STAGE,
    ENVIRONMENT,
    APP_NAME,
    DATABASE_URL,
    SQLITE_PATH,
    DATABASE_POOL_SIZE,
    REDIS_URL,
    WEBHOOK_URL,
    WEBHOOK_PATH,
    WEBHOOK_SECRET,
    ADMIN_USER_ID,
    STORAGE_TYPE,
    UPLOAD_DIR,
    CLOUDINARY_URL,
    AWS_ACCESS_KEY_ID,
    AWS_SECRET_ACCESS_KEY,
    AWS_BUCKET_NAME,
    AWS_REGION,
    SECRET_KEY,
    LOG_LEVEL,
    LOG_FILE,
    LOG_JSON,
    SENTRY_DSN,
];
