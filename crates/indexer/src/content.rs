//! Content locator for off-chain credential artifacts.

use certchain_core::Credential;

/// Builds display URLs for credential content.
#[derive(Debug, Clone)]
pub struct ContentLocator {
    gateway: String,
}

impl ContentLocator {
    /// Create a locator over `gateway`; a trailing slash is ignored.
    pub fn new(gateway: &str) -> Self {
        Self {
            gateway: gateway.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Gateway URL for a bare content address.
    pub fn url_for(&self, content_address: &str) -> Option<String> {
        let address = content_address.trim();
        if address.is_empty() {
            return None;
        }
        Some(format!("{}/{}", self.gateway, address))
    }

    /// The URL to show for `credential`.
    ///
    /// The stored URL wins when present, with `ipfs://` URLs rewritten onto
    /// the gateway. Otherwise the content address is resolved through the
    /// gateway.
    pub fn display_url(&self, credential: &Credential) -> Option<String> {
        let stored = credential.content_url.trim();
        if let Some(path) = stored.strip_prefix("ipfs://") {
            let path = path.strip_prefix("ipfs/").unwrap_or(path);
            return self.url_for(path.trim_start_matches('/'));
        }
        if !stored.is_empty() {
            return Some(stored.to_string());
        }

        self.url_for(&credential.content_address)
    }
}
