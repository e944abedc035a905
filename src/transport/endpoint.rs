//! Operator endpoint derivation.
//!
//! A page at `https://shop.example.com:8443/cart` reports to
//! `wss://admin.shop.example.com:8443/bridge`. Hosts that already carry the
//! `admin.` label are used as they are.

// ============================================================================
// Imports
// ============================================================================

use url::{Host, Url};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Subdomain label the operator lives under.
const ADMIN_LABEL: &str = "admin.";

/// Path of the bridge channel on the operator host.
const BRIDGE_PATH: &str = "/bridge";

// ============================================================================
// Functions
// ============================================================================

/// Derives the operator endpoint for a page URL.
///
/// # Errors
///
/// - [`Error::Url`] if `page_url` does not parse
/// - [`Error::Config`] if the page has no domain host (`about:blank`,
///   `file:` URLs, IP literals)
pub fn operator_url(page_url: &str) -> Result<Url> {
    let page = Url::parse(page_url)?;

    let host = match page.host() {
        Some(Host::Domain(domain)) if !domain.is_empty() => domain,
        Some(Host::Ipv4(_) | Host::Ipv6(_)) => {
            return Err(Error::config(format!(
                "cannot derive an operator host from IP address in {page_url}"
            )));
        }
        _ => {
            return Err(Error::config(format!(
                "page URL has no host to derive an operator endpoint from: {page_url}"
            )));
        }
    };

    let host = if host.starts_with(ADMIN_LABEL) {
        host.to_string()
    } else {
        format!("{ADMIN_LABEL}{host}")
    };

    let endpoint = match page.port() {
        Some(port) => format!("wss://{host}:{port}{BRIDGE_PATH}"),
        None => format!("wss://{host}{BRIDGE_PATH}"),
    };

    Ok(Url::parse(&endpoint)?)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_prefixes_admin_label() {
        let url = operator_url("https://shop.example.com/cart?x=1").expect("derive");
        assert_eq!(url.as_str(), "wss://admin.shop.example.com/bridge");
    }

    #[test]
    fn test_keeps_existing_admin_label() {
        let url = operator_url("https://admin.example.com/").expect("derive");
        assert_eq!(url.as_str(), "wss://admin.example.com/bridge");
    }

    #[test]
    fn test_keeps_explicit_port() {
        let url = operator_url("http://shop.test:8080/").expect("derive");
        assert_eq!(url.as_str(), "wss://admin.shop.test:8080/bridge");
    }

    #[test]
    fn test_default_port_is_dropped() {
        let url = operator_url("https://shop.example.com:443/").expect("derive");
        assert_eq!(url.port(), None);
    }

    #[test]
    fn test_pages_without_host() {
        let err = operator_url("about:blank").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        let err = operator_url("https://127.0.0.1/").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        let err = operator_url("not a url").unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    proptest! {
        #[test]
        fn prop_exactly_one_admin_label(label in "[a-z][a-z0-9]{0,10}", admin in any::<bool>()) {
            prop_assume!(label != "admin");
            let host = if admin {
                format!("admin.{label}.example.com")
            } else {
                format!("{label}.example.com")
            };
            let url = operator_url(&format!("https://{host}/page")).expect("derive");
            let derived = url.host_str().expect("host");

            prop_assert!(derived.starts_with("admin."));
            prop_assert!(!derived.starts_with("admin.admin."));
            prop_assert_eq!(url.scheme(), "wss");
            prop_assert_eq!(url.path(), "/bridge");
        }
    }
}
