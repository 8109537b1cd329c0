/// Instruction prompt asking the classifier for a leading verdict token.
///
/// The document and specification are fenced so their own markdown headings
/// cannot be mistaken for instructions.
#[must_use]
pub fn build_prompt(doc: &str, spec: &str) -> String {
    let mut prompt = String::with_capacity(doc.len() + spec.len() + 1024);
    prompt.push_str(
        "You are reviewing a document for compliance with its specification.\n\n\
         Start your answer with exactly one of these words:\n\
         PASS - the document fully complies\n\
         WARN - the document has minor issues\n\
         FAIL - the document has major issues\n\n\
         After the verdict, list each issue on its own line starting with \"- \", \
         then give a one-paragraph reason.\n\n",
    );
    prompt.push_str("<specification>\n");
    prompt.push_str(spec.trim_end());
    prompt.push_str("\n</specification>\n\n<document>\n");
    prompt.push_str(doc.trim_end());
    prompt.push_str("\n</document>\n");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_all_tokens_and_embeds_inputs() {
        let prompt = build_prompt("# Reviewer\nChecks diffs.\n", "Every agent needs an owner.");
        for token in ["PASS", "WARN", "FAIL"] {
            assert!(prompt.contains(token), "missing {token}");
        }
        assert!(prompt.contains("<document>\n# Reviewer\nChecks diffs.\n</document>"));
        assert!(prompt.contains("<specification>\nEvery agent needs an owner.\n</specification>"));
        assert!(prompt.find("<specification>") < prompt.find("<document>"));
    }
}
