//! Locator tables for the site's interaction roles
//!
//! Role-specific selector knowledge lives here as data, ranked from most
//! to least specific, so flows stay free of selector literals. Callers may
//! prepend a configured override list for any role.

use crate::types::LocatorStrategy;

/// Prepend configured CSS overrides, when present, ahead of the defaults.
pub fn with_override(
    overrides: Option<&[String]>,
    defaults: Vec<LocatorStrategy>,
) -> Vec<LocatorStrategy> {
    match overrides {
        Some(list) if !list.is_empty() => {
            let mut cascade = vec![LocatorStrategy::CssList(list.to_vec())];
            cascade.extend(defaults);
            cascade
        }
        _ => defaults,
    }
}

/// The storefront search box.
pub fn search_box() -> Vec<LocatorStrategy> {
    vec![
        LocatorStrategy::css([
            "#search-input",
            "input[type='search']",
            "input[name='q']",
            "input[placeholder*='search']",
            "input[placeholder*='Search']",
            ".search-input",
            "#search",
        ]),
        LocatorStrategy::xpath([
            "//input[@type='search']",
            "//form//input[contains(@placeholder, 'earch')]",
        ]),
        LocatorStrategy::keywords(["search"]),
    ]
}

/// Username / email field on the login form.
pub fn login_username() -> Vec<LocatorStrategy> {
    vec![
        LocatorStrategy::css([
            "#username",
            "input[name='username']",
            "input[type='email']",
            "input[name='email']",
        ]),
        LocatorStrategy::keywords(["user", "email", "login"]),
    ]
}

/// Password field on the login form.
pub fn login_password() -> Vec<LocatorStrategy> {
    vec![LocatorStrategy::css([
        "#password",
        "input[name='password']",
        "input[type='password']",
    ])]
}

/// Login form submit button.
pub fn login_submit() -> Vec<LocatorStrategy> {
    vec![LocatorStrategy::css([
        "button[type='submit']",
        "input[type='submit']",
        ".login-btn",
        ".btn-login",
    ])]
}

/// Search form submit button.
pub fn search_submit() -> Vec<LocatorStrategy> {
    vec![LocatorStrategy::css([
        "button[type='submit']",
        ".search-btn",
        ".search-button",
        "input[type='submit']",
    ])]
}

/// Elements only rendered for an authenticated user.
pub fn logged_in_indicator() -> Vec<LocatorStrategy> {
    vec![LocatorStrategy::css([
        ".user-menu",
        ".account-menu",
        ".logout",
        ".sign-out",
        "[href*='logout']",
        "[href*='account']",
        ".user-name",
    ])]
}

/// Login failure banners.
pub fn login_error() -> Vec<LocatorStrategy> {
    vec![LocatorStrategy::css([
        ".error",
        ".alert-danger",
        ".login-error",
        ".invalid",
    ])]
}

/// First search result anchor, most to least specific: known result-card
/// containers, generic product/item/part link patterns, then any anchor in
/// a detected result list.
pub fn first_result() -> Vec<LocatorStrategy> {
    vec![
        LocatorStrategy::css([
            ".product-item a",
            ".search-result a",
            ".product-card a",
            "[data-testid='product-card'] a",
        ]),
        LocatorStrategy::css([
            "a[href*='product']",
            "a[href*='item']",
            "a[href*='part']",
        ]),
        LocatorStrategy::css([".results a", ".search-results a", "#results a"]),
    ]
}
