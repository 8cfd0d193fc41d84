// Server configuration
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "3000";
pub const DEFAULT_DATA_PATH: &str = "data";
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

// Single-user mode: every record belongs to this owner unless OWNER_ID says otherwise
pub const DEFAULT_OWNER_ID: &str = "00000000-0000-0000-0000-000000000001";

// Bill status windows
pub const DUE_SOON_WINDOW_DAYS: i64 = 7;

// Days before the due date on which a reminder goes out
pub const THREE_DAY_REMINDER: i64 = 3;
pub const ONE_DAY_REMINDER: i64 = 1;
pub const SAME_DAY_REMINDER: i64 = 0;

// Gift budget
pub const UPCOMING_GIFT_WINDOW_DAYS: i64 = 30;

// Validation limits
pub const MAX_BILL_NAME_LENGTH: usize = 255;
pub const MAX_GIFT_NAME_LENGTH: usize = 255;
pub const MAX_RECIPIENT_NAME_LENGTH: usize = 255;
pub const MAX_NOTES_LENGTH: usize = 1000;
pub const MIN_PHONE_DIGITS: usize = 7;
pub const MAX_E164_DIGITS: usize = 15;

// Profile defaults
pub const DEFAULT_COUNTRY_CODE: &str = "+1";

// Outgoing SMS text
pub const MESSAGE_SIGNATURE: &str = "- TxT M💰NEY";
pub const TEST_MESSAGE: &str =
    "🎉 Test message from TxT M💰NEY! Your SMS reminders are working correctly.";

// Error messages
pub const ERR_DATABASE_ACCESS: &str = "Database access error";
pub const ERR_DATABASE_OPERATION: &str = "Database operation failed";
pub const ERR_GATEWAY_NOT_CONFIGURED: &str = "SMS gateway credentials not configured";
pub const ERR_PHONE_NOT_CONFIGURED: &str = "User phone not configured or verified";
