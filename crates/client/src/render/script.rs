//! JavaScript snippets run inside the page.
//!
//! The `*_FN` constants are function declarations for
//! [`BrowserSession::call_on`](super::BrowserSession::call_on), with `this`
//! bound to the target element. The rest are plain expressions.

/// Displayed and enabled: no `disabled` property, no `aria-disabled`, and no
/// class mentioning "disabled" (`swiper-button-disabled`).
pub const IS_CLICKABLE_FN: &str = r#"function() {
    const style = window.getComputedStyle(this);
    const shown = this.offsetParent !== null && style.visibility !== 'hidden' && style.display !== 'none';
    const classes = typeof this.className === 'string' ? this.className : (this.getAttribute('class') || '');
    return shown && !this.disabled && this.getAttribute('aria-disabled') !== 'true' && !/disabled/i.test(classes);
}"#;

/// Laid out with a non-empty box.
pub const IS_VISIBLE_FN: &str = r#"function() {
    const rect = this.getBoundingClientRect();
    return this.offsetParent !== null && rect.width > 0 && rect.height > 0;
}"#;

pub const SCROLL_INTO_VIEW_FN: &str = "function() { this.scrollIntoView({ block: 'center' }); return true; }";

/// Script-level click; survives overlays that would intercept a pointer click.
pub const CLICK_FN: &str = "function() { this.click(); return true; }";

pub const TEXT_FN: &str = "function() { return (this.innerText || this.textContent || '').trim(); }";

/// Masks `navigator.webdriver` for scripts that run after navigation.
pub const HIDE_WEBDRIVER: &str = "Object.defineProperty(navigator, 'webdriver', { get: () => undefined }); true";

pub const PAGE_HEIGHT: &str =
    "Math.max(document.body ? document.body.scrollHeight : 0, document.documentElement.scrollHeight)";

pub fn scroll_to(y: i64) -> String {
    format!("window.scrollTo(0, {y}); true")
}
