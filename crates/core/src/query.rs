//! Bypass-link query parameters
//!
//! Wire contract: a bypass URL carries the account identifier in
//! [`ACCOUNT_PARAM`] and the access token in [`TOKEN_PARAM`]. Both must
//! be present and non-empty for a request to be treated as a bypass
//! attempt, and both are stripped before any whitelist comparison or
//! redirect-target computation.

use url::form_urlencoded;

use lockgate_shared::AccountId;

/// Query parameter carrying the account identifier.
pub const ACCOUNT_PARAM: &str = "access_account";
/// Query parameter carrying the access token.
pub const TOKEN_PARAM: &str = "access_token";

/// Raw credential pulled out of a URL. Ephemeral: lives for one request,
/// never stored. The account value stays a string here; a non-numeric
/// value is an invalid credential, not a parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BypassCredential {
    pub account: String,
    pub token: String,
}

/// Split a URL into (base, query, fragment) without decoding anything.
fn split_url(url: &str) -> (&str, Option<&str>, Option<&str>) {
    let (without_fragment, fragment) = match url.split_once('#') {
        Some((u, f)) => (u, Some(f)),
        None => (url, None),
    };
    match without_fragment.split_once('?') {
        Some((base, query)) => (base, Some(query), fragment),
        None => (without_fragment, None, fragment),
    }
}

fn rebuild(base: &str, query: &str, fragment: Option<&str>) -> String {
    let mut out = String::from(base);
    if !query.is_empty() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Extract the bypass credential, if the URL carries one. `Some` only
/// when both parameters are present and non-empty.
pub fn bypass_credential(url: &str) -> Option<BypassCredential> {
    let (_, query, _) = split_url(url);
    let query = query?;

    let mut account = None;
    let mut token = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            ACCOUNT_PARAM if !value.is_empty() => account = Some(value.into_owned()),
            TOKEN_PARAM if !value.is_empty() => token = Some(value.into_owned()),
            _ => {}
        }
    }

    Some(BypassCredential {
        account: account?,
        token: token?,
    })
}

/// True when the raw `key=value` segment decodes to one of the two
/// bypass parameters.
fn is_bypass_pair(segment: &str) -> bool {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .is_some_and(|(key, _)| key == ACCOUNT_PARAM || key == TOKEN_PARAM)
}

/// Remove both bypass parameters, keeping every other query segment
/// byte-for-byte as it appeared. Re-encoding the survivors would break
/// the exact-match whitelist comparison downstream. The `?` is dropped
/// when the query becomes empty.
pub fn strip_bypass_params(url: &str) -> String {
    let (base, query, fragment) = split_url(url);
    let Some(query) = query else {
        return url.to_string();
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|segment| !segment.is_empty() && !is_bypass_pair(segment))
        .collect();
    rebuild(base, &kept.join("&"), fragment)
}

/// Append both bypass parameters to `url`, percent-encoding only the
/// appended pair values. The existing query stays byte-for-byte intact
/// so that stripping the credential later restores the original URL.
pub fn append_bypass_params(url: &str, account_id: AccountId, token: &str) -> String {
    let (base, query, fragment) = split_url(url);

    let pairs = form_urlencoded::Serializer::new(String::new())
        .append_pair(ACCOUNT_PARAM, &account_id.to_string())
        .append_pair(TOKEN_PARAM, token)
        .finish();
    let query = match query {
        Some(existing) if !existing.is_empty() => format!("{existing}&{pairs}"),
        _ => pairs,
    };
    rebuild(base, &query, fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_requires_both_params_non_empty() {
        assert!(bypass_credential("/page").is_none());
        assert!(bypass_credential("/page?access_account=42").is_none());
        assert!(bypass_credential("/page?access_token=abc").is_none());
        assert!(bypass_credential("/page?access_account=&access_token=abc").is_none());
        assert!(bypass_credential("/page?access_account=42&access_token=").is_none());

        let cred = bypass_credential("/page?access_account=42&access_token=abc123").unwrap();
        assert_eq!(cred.account, "42");
        assert_eq!(cred.token, "abc123");
    }

    #[test]
    fn credential_survives_other_params_and_fragment() {
        let cred =
            bypass_credential("/p?a=1&access_account=7&b=2&access_token=t0k#frag").unwrap();
        assert_eq!(cred.account, "7");
        assert_eq!(cred.token, "t0k");
    }

    #[test]
    fn strip_removes_only_bypass_params() {
        assert_eq!(
            strip_bypass_params("/p?a=1&access_account=7&access_token=t&b=2"),
            "/p?a=1&b=2"
        );
    }

    #[test]
    fn strip_drops_question_mark_when_query_empties() {
        assert_eq!(
            strip_bypass_params("/p?access_account=7&access_token=t"),
            "/p"
        );
    }

    #[test]
    fn strip_leaves_urls_without_query_untouched() {
        assert_eq!(strip_bypass_params("/p"), "/p");
        assert_eq!(strip_bypass_params("/p#frag"), "/p#frag");
    }

    #[test]
    fn append_builds_the_wire_format() {
        let url = append_bypass_params("/reports", AccountId(42), "abc123");
        assert_eq!(url, "/reports?access_account=42&access_token=abc123");
    }

    #[test]
    fn append_preserves_existing_query_and_fragment() {
        let url = append_bypass_params("/r?x=1#top", AccountId(7), "t");
        assert_eq!(url, "/r?x=1&access_account=7&access_token=t#top");
    }

    #[test]
    fn append_then_extract_round_trips() {
        let url = append_bypass_params("/d", AccountId(9), "a+b c");
        let cred = bypass_credential(&url).unwrap();
        assert_eq!(cred.account, "9");
        assert_eq!(cred.token, "a+b c");
    }

    #[test]
    fn append_and_strip_leave_encoded_queries_verbatim() {
        let url = append_bypass_params("/r?x=a%20b", AccountId(11), "tok");
        assert_eq!(url, "/r?x=a%20b&access_account=11&access_token=tok");
        assert_eq!(strip_bypass_params(&url), "/r?x=a%20b");
    }

    #[test]
    fn strip_undoes_append() {
        let url = append_bypass_params("/d?keep=1", AccountId(9), "tok");
        assert_eq!(strip_bypass_params(&url), "/d?keep=1");
    }
}
