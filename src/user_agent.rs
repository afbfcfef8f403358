//! User-Agent string for timeline API requests.

/// Product token used in the User-Agent header.
const PRODUCT: &str = "x2pdf";

/// Default User-Agent for API requests (identifies the tool and its version).
#[must_use]
pub(crate) fn default_api_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{PRODUCT}/{version} (personal-archive-tool)")
}
