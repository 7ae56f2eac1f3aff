use std::collections::HashMap;

/// Built-in answer-note template, used when the vault has no
/// `Templates/Answer.md` of its own. The parent link and the answer tag
/// are what keep the conversation chain resolvable.
pub const DEFAULT_ANSWER_TEMPLATE: &str = "\
[[{{linked_note}}]] #chat #answer

## Notes:
";

/// Built-in question-note template, used when the vault has no
/// `Templates/Question.md` of its own.
pub const DEFAULT_QUESTION_TEMPLATE: &str = "\
{{linked_note}}#chat #question

## Notes:
";

/// Replace every `{{key}}` placeholder in the template with its value.
pub fn render(template: &str, metadata: &HashMap<&str, String>) -> String {
    let mut content = template.to_string();
    for (key, value) in metadata {
        let placeholder = format!("{{{{{}}}}}", key);
        content = content.replace(&placeholder, value);
    }
    content
}
