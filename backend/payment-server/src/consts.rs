//! Constants of the payment server

/// Query parameter carrying the flash message text on redirects back to the
/// host platform's registration page
pub const FLASH_MESSAGE_PARAM: &str = "flash_message";

/// Query parameter carrying the flash message severity on redirects back to
/// the host platform's registration page
pub const FLASH_LEVEL_PARAM: &str = "flash_level";
