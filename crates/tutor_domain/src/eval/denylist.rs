/// Code-injection signatures rejected before any parsing happens. The
/// grammar would reject these anyway; the gate exists so hostile input is
/// never tokenized at all.
const DENYLIST: &[&str] = &[
    "eval",
    "function",
    "=>",
    "${",
    "require",
    "import",
    "document",
    "window",
    "process",
    "__proto__",
    "constructor",
];

/// Returns the first denylist entry found in the input, case-insensitively.
pub(crate) fn find_disallowed(expression: &str) -> Option<&'static str> {
    let lowered = expression.to_lowercase();
    DENYLIST
        .iter()
        .copied()
        .find(|pattern| lowered.contains(pattern))
}
