use crate::error::{Error, Result};

pub const GENERATION_TEMPLATE: &str = r#"Text: {text}
You are an expert MCQ maker. Given the above text, create exactly {number} multiple choice questions for {subject} students in a {tone} tone.
Each question should be unique and related to the text. Ensure that all questions are clear, unambiguous, and well-formed, ensuring that each question is of good quality.
Every question must have exactly four options labelled "a", "b", "c" and "d", and "answer" must be the label of the correct option.
The format for the response should strictly follow this structure and contain nothing else:
{{
  "quiz": [
    {{
      "mcq": "Your question here",
      "options": {{
        "a": "Choice A",
        "b": "Choice B",
        "c": "Choice C",
        "d": "Choice D"
      }},
      "answer": "a"
    }}
  ]
}}
"#;

pub const REVIEW_TEMPLATE: &str = r#"You are an expert English grammarian and writer. Based on the following multiple choice questions written for {subject} students in a {tone} tone, generate a review that is about 150 words in length,
summarizing the quality of the questions, the variety of the content, and the suitability for the given subject and tone.
Review the questions objectively and reply with plain text only:
{quiz}
"#;

/// A prompt with `{name}` placeholders. `{{` and `}}` stand for literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    name: String,
    source: String,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn generation() -> Self {
        Self::new("generation", GENERATION_TEMPLATE)
    }

    pub fn review() -> Self {
        Self::new("review", REVIEW_TEMPLATE)
    }

    /// Substitutes every placeholder. Values are inserted verbatim and never rescanned.
    pub fn render(&self, vars: &[(&str, &str)]) -> Result<String> {
        let source = self.source.as_str();
        let mut out = String::with_capacity(source.len() + vars.iter().map(|(_, v)| v.len()).sum::<usize>());
        let mut chars = source.char_indices().peekable();

        while let Some((idx, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    out.push('{');
                }
                '{' => {
                    let start = idx + 1;
                    let end = chars
                        .by_ref()
                        .find(|(_, n)| *n == '}')
                        .map(|(j, _)| j)
                        .ok_or_else(|| self.syntax_error("unclosed placeholder"))?;
                    let key = &source[start..end];
                    let value = vars
                        .iter()
                        .find(|(name, _)| *name == key)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| {
                            Error::Internal(format!(
                                "{} template has no value for placeholder {{{}}}",
                                self.name, key
                            ))
                        })?;
                    out.push_str(value);
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    out.push('}');
                }
                '}' => return Err(self.syntax_error("unmatched closing brace")),
                _ => out.push(c),
            }
        }

        Ok(out)
    }

    fn syntax_error(&self, what: &str) -> Error {
        Error::Internal(format!("{} template: {}", self.name, what))
    }
}
