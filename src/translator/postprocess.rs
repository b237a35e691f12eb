//! Target-language cosmetic passes applied after substitution.

use crate::types::Language;

/// Characters that end a line without needing a terminator
const LINE_ENDINGS: [char; 3] = ['{', '}', ';'];

/// Append `;` to every non-empty line that does not already end in `{`, `}`
/// or `;`.
///
/// Each line is trimmed first, so indentation is dropped. The pass is purely
/// textual: lines inside multi-line strings or block comments get a
/// terminator too.
pub fn add_terminators(code: &str) -> String {
    code.split('\n')
        .map(|line| {
            let line = line.trim();
            if line.is_empty() || line.ends_with(&LINE_ENDINGS[..]) {
                line.to_string()
            } else {
                format!("{};", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run the post-processing registered for the target language
pub fn post_process(code: String, target: &Language) -> String {
    if target.uses_statement_terminators() {
        add_terminators(&code)
    } else {
        code
    }
}
