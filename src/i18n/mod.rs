//! Internationalization (i18n) support for kosen-web
//!
//! All user-visible text of the site (labels, empty states, error pages)
//! is looked up through `t!`. Supported languages: Mongolian (mn, the site
//! default) and English (en).
//!
//! # Environment Variables
//!
//! - `KOSEN_LANG`: Set the preferred language (mn, en). Defaults to Mongolian.
//!
//! # Usage
//!
//! ```rust,ignore
//! use kosen_web::i18n::{t, set_locale};
//!
//! set_locale("mn");
//! let title = t!("site.contact.title");
//! ```

// Note: rust_i18n::i18n! macro is declared in lib.rs (crate root)

/// Locale used when nothing else is requested
pub const DEFAULT_LOCALE: &str = "mn";

/// Locales with a translation file under `locales/`
pub const SUPPORTED_LOCALES: &[&str] = &["mn", "en"];

/// Set the current locale for translations
///
/// # Examples
///
/// ```rust,ignore
/// use kosen_web::i18n::set_locale;
///
/// set_locale("en-US");
/// ```
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(normalize_locale(locale));
}

/// Get the current locale
pub fn current_locale() -> String {
    (*rust_i18n::locale()).to_string()
}

/// Normalize locale code to a supported locale
///
/// - mn, mn-MN, mn_MN, mongolian -> mn
/// - en, en-US, en_US, english -> en
/// - anything else -> mn
pub fn normalize_locale(locale: &str) -> &'static str {
    let lower = locale.trim().to_lowercase();

    if lower.starts_with("en") || lower == "english" {
        "en"
    } else {
        DEFAULT_LOCALE
    }
}

/// Translate a key with optional parameters
///
/// This is a re-export of rust_i18n::t! for convenience.
///
/// # Examples
///
/// ```rust,ignore
/// use kosen_web::i18n::t;
///
/// let msg = t!("errors.route.invalid_id", id = "abc");
/// ```
#[doc(inline)]
pub use rust_i18n::t;
