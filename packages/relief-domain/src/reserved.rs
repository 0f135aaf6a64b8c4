//! Parameter keys that never name a record column.

pub const AFTER: &str = "after";
pub const BEFORE: &str = "before";
pub const VERIFIED_AFTER: &str = "verified_after";
pub const LIMIT: &str = "limit";

pub const ID: &str = "id";
pub const JWT: &str = "jwt";

pub const SOURCE: &str = "source";
pub const TG_USER_ID: &str = "tg_user_id";
pub const TG_USER_HANDLE: &str = "tg_user_handle";

pub const SEARCH_KEYS: [&str; 4] = [AFTER, BEFORE, VERIFIED_AFTER, LIMIT];
pub const CONTACT_HINT_KEYS: [&str; 3] = [SOURCE, TG_USER_ID, TG_USER_HANDLE];

pub fn is_reserved(key: &str) -> bool {
	SEARCH_KEYS.contains(&key) || CONTACT_HINT_KEYS.contains(&key) || key == ID || key == JWT
}
