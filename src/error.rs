use thiserror::Error;

/// Conditions that abort processing of a calendar page.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },

    #[error("date marker at node {index} has no heading")]
    MissingHeading { index: usize },

    #[error("date marker at node {index}: cannot parse `{text}` as a date")]
    BadDate {
        index: usize,
        text: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("event node {index} has no {field}")]
    MissingHeader { index: usize, field: &'static str },
}
