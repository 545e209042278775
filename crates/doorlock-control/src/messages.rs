//! Texts shown on the interface node's display.

pub const WELCOME_TITLE: &str = "DOOR LOCK SECURITY SYSTEM";

pub const NEW_PASSWORD_PROMPT: &str = "Please Enter A New Password:";
pub const REENTER_PASSWORD_PROMPT: &str = "Please Re-enter The Password:";
pub const ENTER_PASSWORD_PROMPT: &str = "Please Enter The Password:";

pub const MENU_OPEN_DOOR: &str = "(+): Open The Door.";
pub const MENU_CHANGE_PASSWORD: &str = "(-): Change The Password.";

pub const MISMATCH_TITLE: &str = "ERROR: Password Does Not Match.";
pub const MISMATCH_HINT: &str = "Please Try Again !";

pub const PASSWORD_CHANGED: &str = "The New Password Is Now Active:)";

pub const DOOR_OPENING: &str = "The Door is Opening...";
pub const DOOR_OPEN: &str = "The Door is Opened !";
pub const DOOR_CLOSING: &str = "The Door is Closing...";

pub const LOCKOUT_TITLE: &str = "ERROR: TOO MANY ATTEMPTS !";
pub const LOCKOUT_HINT: &str = "DOOR IS LOCKED FOR 1 MIN..";
