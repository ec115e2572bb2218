use url::Url;

/// Validate a URL before handing it to `open::that`.
///
/// Only http(s) URLs are allowed to reach the OS opener: story records come
/// from a remote API and a `file://` or custom-scheme URL in an image field
/// must never be executed locally.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, String> {
    let url = Url::parse(url_str).map_err(|e| format!("Invalid URL: {}", e))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(format!(
            "Refusing to open {} URL (only http/https allowed)",
            scheme
        )),
    }
}
