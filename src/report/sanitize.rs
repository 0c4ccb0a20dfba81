/// Normalize a human name into a filename-safe token.
///
/// Every character outside `[A-Za-z0-9]` becomes `_`, runs of `_` collapse to
/// one, leading and trailing `_` are dropped, and the result is lowercased.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}
