use crate::models::quiz::{OptionLabel, Quiz};
use crate::services::completion_service::TokenUsage;
use crate::services::review_service::Review;
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;
use std::fmt::Write;

pub const TABLE_COLUMNS: [&str; 6] = [
    "Question", "Option A", "Option B", "Option C", "Option D", "Answer",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizRow {
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "Option A")]
    pub option_a: String,
    #[serde(rename = "Option B")]
    pub option_b: String,
    #[serde(rename = "Option C")]
    pub option_c: String,
    #[serde(rename = "Option D")]
    pub option_d: String,
    #[serde(rename = "Answer")]
    pub answer: String,
}

impl QuizRow {
    pub fn cells(&self) -> [&str; 6] {
        [
            self.question.as_str(),
            self.option_a.as_str(),
            self.option_b.as_str(),
            self.option_c.as_str(),
            self.option_d.as_str(),
            self.answer.as_str(),
        ]
    }
}

/// One row per question, in quiz order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuizTable {
    rows: Vec<QuizRow>,
}

impl From<&Quiz> for QuizTable {
    fn from(quiz: &Quiz) -> Self {
        let rows = quiz
            .questions()
            .iter()
            .map(|q| QuizRow {
                question: q.mcq.clone(),
                option_a: q.options.get(OptionLabel::A).to_string(),
                option_b: q.options.get(OptionLabel::B).to_string(),
                option_c: q.options.get(OptionLabel::C).to_string(),
                option_d: q.options.get(OptionLabel::D).to_string(),
                answer: q.answer.to_string(),
            })
            .collect();
        Self { rows }
    }
}

impl QuizTable {
    pub fn rows(&self) -> &[QuizRow] {
        &self.rows
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from("<table class=\"quiz\">\n<thead><tr>");
        for column in TABLE_COLUMNS {
            let _ = write!(html, "<th>{}</th>", column);
        }
        html.push_str("</tr></thead>\n<tbody>\n");
        for row in &self.rows {
            html.push_str("<tr>");
            for cell in row.cells() {
                let _ = write!(html, "<td>{}</td>", encode_text(cell));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>\n");
        html
    }

    /// Plain-text rendering for logs.
    pub fn to_text(&self) -> String {
        let mut out = TABLE_COLUMNS.join(" | ");
        for (idx, row) in self.rows.iter().enumerate() {
            let _ = write!(out, "\n{}: {}", idx, row.cells().join(" | "));
        }
        out
    }
}

pub fn render_review_html(review: &Review) -> String {
    format!(
        "<label for=\"review\">Review</label>\n<textarea id=\"review\" rows=\"10\" cols=\"80\" readonly disabled>{}</textarea>\n",
        encode_text(review.as_str())
    )
}

/// Values echoed back into the form so a failed submission stays populated.
#[derive(Debug, Clone, Default)]
pub struct FormValues {
    pub mcq_count: Option<usize>,
    pub subject: String,
    pub tone: String,
}

#[derive(Debug, Default)]
pub struct PageView<'a> {
    pub form: FormValues,
    pub error: Option<String>,
    pub table: Option<&'a QuizTable>,
    pub review: Option<&'a Review>,
    pub usage: Option<TokenUsage>,
}

pub fn render_page(view: &PageView<'_>) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>MCQs Creator Application</title>\n</head>\n<body>\n<h1>MCQs Creator Application</h1>\n",
    );

    if let Some(error) = &view.error {
        let _ = writeln!(html, "<div class=\"error\" role=\"alert\">{}</div>", encode_text(error));
    }

    let count = view
        .form
        .mcq_count
        .map(|c| c.to_string())
        .unwrap_or_else(|| "3".to_string());
    let _ = write!(
        html,
        concat!(
            "<form method=\"post\" action=\"/quizzes\" enctype=\"multipart/form-data\">\n",
            "<label>Upload a PDF or txt file <input type=\"file\" name=\"file\" accept=\".pdf,.txt\" required></label><br>\n",
            "<label>No. of MCQs <input type=\"number\" name=\"mcq_count\" min=\"3\" max=\"50\" value=\"{}\" required></label><br>\n",
            "<label>Insert Subject <input type=\"text\" name=\"subject\" maxlength=\"20\" value=\"{}\" required></label><br>\n",
            "<label>Complexity Level of Questions <input type=\"text\" name=\"tone\" maxlength=\"20\" placeholder=\"Simple\" value=\"{}\" required></label><br>\n",
            "<button type=\"submit\">Create MCQs</button>\n",
            "</form>\n"
        ),
        count,
        encode_double_quoted_attribute(&view.form.subject),
        encode_double_quoted_attribute(&view.form.tone),
    );

    if let Some(table) = view.table {
        html.push_str("<h2>Generated MCQs</h2>\n");
        html.push_str(&table.to_html());
    }

    if let Some(review) = view.review {
        html.push_str("<h2>Generated Review</h2>\n");
        html.push_str(&render_review_html(review));
    }

    if let Some(usage) = view.usage {
        let _ = write!(
            html,
            "<p>Total Tokens: {}</p>\n<p>Prompt Tokens: {}</p>\n<p>Completion Tokens: {}</p>\n",
            usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
        );
    }

    html.push_str("</body>\n</html>\n");
    html
}
