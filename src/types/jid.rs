//! JID helpers

/// Server used for individual users
pub const USER_SERVER: &str = "s.whatsapp.net";
/// Legacy user server, rewritten to [`USER_SERVER`]
pub const LEGACY_USER_SERVER: &str = "c.us";

/// Normalize a JID to the form message lists are keyed by.
///
/// Drops the `:device` suffix from the user part and maps the legacy
/// `c.us` server to `s.whatsapp.net`. Strings without `@` pass through.
pub fn normalize_jid(jid: &str) -> String {
    let Some((user, server)) = jid.split_once('@') else {
        return jid.to_string();
    };
    let user = user.split_once(':').map_or(user, |(u, _)| u);
    let server = if server == LEGACY_USER_SERVER {
        USER_SERVER
    } else {
        server
    };
    format!("{user}@{server}")
}
