/// Collapse all whitespace runs (including non-breaking spaces) to single
/// spaces and trim the ends. Loader output goes through this before chunking
/// so token boundaries are stable across file formats.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
