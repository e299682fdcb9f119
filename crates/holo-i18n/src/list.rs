//! Natural-language list joining ("A, B or C")

/// Join items with commas and a final conjunction word.
///
/// `join_with_conjunction(&["A", "B", "C"], "or")` → `"A, B or C"`.
pub fn join_with_conjunction<S: AsRef<str>>(items: &[S], conjunction: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|s| s.as_ref()).collect();
            format!("{} {} {}", head.join(", "), conjunction, last.as_ref())
        }
    }
}
