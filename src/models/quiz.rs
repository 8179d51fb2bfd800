use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    pub fn as_str(self) -> &'static str {
        match self {
            OptionLabel::A => "a",
            OptionLabel::B => "b",
            OptionLabel::C => "c",
            OptionLabel::D => "d",
        }
    }

    /// Accepts a bare label in either case: `a`, `B`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "a" | "A" => Some(OptionLabel::A),
            "b" | "B" => Some(OptionLabel::B),
            "c" | "C" => Some(OptionLabel::C),
            "d" | "D" => Some(OptionLabel::D),
            _ => None,
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionOptions {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

impl QuestionOptions {
    pub fn get(&self, label: OptionLabel) -> &str {
        match label {
            OptionLabel::A => &self.a,
            OptionLabel::B => &self.b,
            OptionLabel::C => &self.c,
            OptionLabel::D => &self.d,
        }
    }

    pub fn set(&mut self, label: OptionLabel, text: String) {
        match label {
            OptionLabel::A => self.a = text,
            OptionLabel::B => self.b = text,
            OptionLabel::C => self.c = text,
            OptionLabel::D => self.d = text,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionLabel, &str)> {
        OptionLabel::ALL.into_iter().map(move |label| (label, self.get(label)))
    }
}

/// One MCQ. The answer is a label, so it always names one of the four options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub mcq: String,
    pub options: QuestionOptions,
    pub answer: OptionLabel,
}

impl Question {
    pub fn correct_option(&self) -> &str {
        self.options.get(self.answer)
    }
}

/// Accepted quiz in the structural format `{"quiz": [{mcq, options, answer}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(rename = "quiz")]
    questions: Vec<Question>,
}

impl Quiz {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Keeps the first `count` questions.
    pub fn truncate(&mut self, count: usize) {
        self.questions.truncate(count);
    }

    pub fn to_structured_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
