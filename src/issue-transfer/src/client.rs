//! GitHub client construction.

use octocrab::Octocrab;
use url::Url;

/// Builds a client for `endpoint`, optionally overriding the `Accept` header.
///
/// An empty token yields an unauthenticated client.
pub(crate) fn build_client(
    endpoint: &Url,
    token: Option<&str>,
    accept: Option<&str>,
) -> Result<Octocrab, octocrab::Error> {
    let mut builder = Octocrab::builder().base_uri(endpoint.as_str().trim_end_matches('/'))?;
    if let Some(token) = token.filter(|token| !token.is_empty()) {
        builder = builder.personal_token(token.to_string());
    }
    if let Some(accept) = accept {
        builder = builder.add_header(http::header::ACCEPT, accept.to_string());
    }
    builder.build()
}

/// Returns the base the GraphQL endpoint hangs off for a REST `endpoint`.
///
/// Enterprise hosts serve REST under `/api/v3` and GraphQL at `/api/graphql`,
/// while the public API keeps both at the root.
pub(crate) fn graphql_base(endpoint: &Url) -> Url {
    let mut base = endpoint.clone();
    let path = endpoint.path().trim_end_matches('/');
    if let Some(prefix) = path.strip_suffix("/v3") {
        base.set_path(prefix);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(endpoint: &str) -> String {
        graphql_base(&Url::parse(endpoint).unwrap()).to_string()
    }

    #[test]
    fn public_api_is_unchanged() {
        assert_eq!(base("https://api.github.com"), "https://api.github.com/");
    }

    #[test]
    fn enterprise_rest_path_is_trimmed() {
        assert_eq!(
            base("https://ghe.example.com/api/v3"),
            "https://ghe.example.com/api"
        );
        assert_eq!(
            base("https://ghe.example.com/api/v3/"),
            "https://ghe.example.com/api"
        );
    }

    #[test]
    fn enterprise_api_root_is_kept() {
        assert_eq!(
            base("https://ghe.example.com/api"),
            "https://ghe.example.com/api"
        );
    }
}
