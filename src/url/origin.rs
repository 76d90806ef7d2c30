use url::Url;

/// Returns true if both URLs share scheme, host and port
///
/// Default ports are taken into account, so `https://a.com` and
/// `https://a.com:443` are the same origin.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    let origin = a.origin();
    origin.is_tuple() && origin == b.origin()
}

/// Returns `<scheme>://<host>[:port]/` for the given URL
pub fn origin_root(url: &Url) -> Url {
    let mut root = url.clone();
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    // Credentials never belong in a robots.txt request
    let _ = root.set_username("");
    let _ = root.set_password(None);
    root
}
