/// Derive an output file stem from a document name.
///
/// Lowercases ASCII, collapses every run of characters outside `[a-z0-9]`
/// into a single `-`, and trims leading and trailing `-`.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars().map(|c| c.to_ascii_lowercase()) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("reviewer"), "reviewer");
        assert_eq!(slugify("Code Reviewer"), "code-reviewer");
        assert_eq!(slugify("  API // Gateway -- Owner!! "), "api-gateway-owner");
        assert_eq!(slugify("v2_release"), "v2-release");
        assert_eq!(slugify("Über-Agent"), "ber-agent");
        assert_eq!(slugify("!!!"), "");
    }
}
