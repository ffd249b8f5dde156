//! Share tokens and the links built from them.

use rand::{rngs::OsRng, RngCore};

/// Random bytes per token; 192 bits.
const TOKEN_BYTES: usize = 24;

/// Fresh unguessable token drawn from the OS RNG, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn trim_base(site_url: &str) -> &str {
    site_url.trim_end_matches('/')
}

/// Respondent link: slug plus token, never a numeric id.
pub fn share_url(site_url: &str, slug: &str, token: &str) -> String {
    format!("{}/forms/{slug}/{token}/", trim_base(site_url))
}

/// Owner's edit screen for a form.
pub fn update_url(site_url: &str, username: &str, slug: &str) -> String {
    format!("{}/forms/{username}/{slug}/update/", trim_base(site_url))
}
