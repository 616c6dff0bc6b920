//! JSON pointer (RFC 6901) helpers for error paths.

/// Escape a single reference token: `~` becomes `~0`, `/` becomes `~1`.
pub fn escape_token(token: &str) -> String {
    if !token.contains(['~', '/']) {
        return token.to_string();
    }
    token.replace('~', "~0").replace('/', "~1")
}

/// Append `token` to the pointer `parent`.
///
/// `join_pointer("", "id")` is `"/id"`; `join_pointer("/a", "b/c")` is
/// `"/a/b~1c"`.
pub fn join_pointer(parent: &str, token: &str) -> String {
    let escaped = escape_token(token);
    let mut out = String::with_capacity(parent.len() + escaped.len() + 1);
    out.push_str(parent);
    out.push('/');
    out.push_str(&escaped);
    out
}
