//! File-name collision resolution for files added to a block.

/// Split `name` into the part before the extension and the extension itself
/// (dot included). Only the last path component is considered, and a leading
/// dot (`.gitignore`) does not start an extension.
fn split_extension(name: &str) -> (&str, &str) {
    let component_start = name.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    match name[component_start..].rfind('.') {
        Some(dot) if dot > 0 => name.split_at(component_start + dot),
        _ => (name, ""),
    }
}

/// Pick a name for `candidate` that `exists` does not report as taken.
///
/// Returns `candidate` when free, otherwise the first `base{i}.ext` for
/// `i >= 1` that is free (`a.txt` -> `a1.txt`, `readme` -> `readme1`).
pub fn unique_file_name<F>(candidate: &str, exists: F) -> String
where
    F: Fn(&str) -> bool,
{
    if !exists(candidate) {
        return candidate.to_string();
    }

    let (base, extension) = split_extension(candidate);
    let mut counter: u64 = 1;
    loop {
        let name = format!("{}{}{}", base, counter, extension);
        if !exists(&name) {
            tracing::debug!(candidate, resolved = %name, "Resolved file name collision");
            return name;
        }
        counter += 1;
    }
}
