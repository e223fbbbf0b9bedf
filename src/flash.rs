/// One-time flash messages
///
/// A flash message is set alongside a redirect and shown exactly once on the
/// next rendered page. It is carried in a short-lived cookie: writing the
/// message sets the cookie, reading it queues its removal, so a refresh of
/// the landing page does not show the message again.
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};

/// Name of the flash cookie
pub const FLASH_COOKIE: &str = "tasklist_flash";

/// Flash message kind, mirrored as a CSS class on the rendered page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    /// Success confirmation ("Task was successfully created.")
    Notice,

    /// Gate rejection ("Login required", "Forbidden access.")
    Alert,
}

impl FlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Notice => "notice",
            FlashKind::Alert => "alert",
        }
    }
}

/// A one-time user-facing status message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Notice,
            message: message.into(),
        }
    }

    pub fn alert(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Alert,
            message: message.into(),
        }
    }
}

/// Queues a flash message for the next request
pub fn set(jar: CookieJar, flash: Flash) -> CookieJar {
    // Serialization of this struct cannot fail
    let value = serde_json::to_string(&flash).unwrap_or_default();
    let mut cookie = Cookie::new(FLASH_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    jar.add(cookie)
}

/// Takes the pending flash message, if any, clearing the cookie
///
/// Returns the updated jar (with the removal queued) and the message. The
/// jar must be returned from the handler for the removal to reach the
/// client.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    match jar.get(FLASH_COOKIE) {
        Some(cookie) => {
            let flash = serde_json::from_str::<Flash>(cookie.value()).ok();
            let mut removal = Cookie::new(FLASH_COOKIE, "");
            removal.set_path("/");
            (jar.remove(removal), flash)
        }
        None => (jar, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_round_trip() {
        let jar = CookieJar::new();
        let jar = set(jar, Flash::notice("Task was successfully created."));

        let (_jar, flash) = take(jar);
        let flash = flash.expect("Flash should be present");
        assert_eq!(flash.kind, FlashKind::Notice);
        assert_eq!(flash.message, "Task was successfully created.");
    }

    #[test]
    fn test_take_without_flash() {
        let (_jar, flash) = take(CookieJar::new());
        assert!(flash.is_none());
    }

    #[test]
    fn test_kind_as_str() {
        assert_eq!(FlashKind::Notice.as_str(), "notice");
        assert_eq!(FlashKind::Alert.as_str(), "alert");
    }
}
