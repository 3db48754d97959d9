use std::fmt;

use indexmap::IndexMap;
use netedit_core::Point;
use serde::{Deserialize, Serialize};

/// What a step tells the dispatch loop to do next.
///
/// `Continue` runs the next step immediately. `NeedDialog`, `NeedClick` and
/// `NeedConfirmation` suspend the operation until the caller resumes it with
/// an [`Answer`]. Every other variant ends the operation.
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    Continue,
    NeedDialog(DialogRequest),
    NeedClick(ClickMode),
    NeedConfirmation(String),
    Done,
    Accepted,
    Rejected,
    Cancelled,
    Error(String),
}

impl StepResult {
    #[must_use]
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    #[must_use]
    pub fn is_suspension(&self) -> bool {
        matches!(
            self,
            Self::NeedDialog(_) | Self::NeedClick(_) | Self::NeedConfirmation(_)
        )
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self.is_continue() && !self.is_suspension()
    }

    /// Terminal results on the path where the operation's edits stand.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done | Self::Accepted)
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::NeedDialog(_) => "need-dialog",
            Self::NeedClick(_) => "need-click",
            Self::NeedConfirmation(_) => "need-confirmation",
            Self::Done => "done",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Error(_) => "error",
        }
    }
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NeedDialog(request) => write!(f, "need-dialog: {}", request.title),
            Self::NeedClick(mode) => write!(f, "need-click: {mode}"),
            Self::NeedConfirmation(question) => write!(f, "need-confirmation: {question}"),
            Self::Error(message) => write!(f, "error: {message}"),
            other => f.write_str(other.label()),
        }
    }
}

/// One value collected by a dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl FieldValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Named dialog fields, in display order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogValues(IndexMap<String, FieldValue>);

impl DialogValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: FieldValue) {
        self.0.insert(key.to_string(), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    /// A flag field; absent or non-boolean fields read as `false`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(FieldValue::as_flag).unwrap_or(false)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A request for the dialog layer. The engine knows nothing about the
/// dialog beyond its kind and the fields it should start with.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogRequest {
    pub kind: &'static str,
    pub title: String,
    pub fields: DialogValues,
}

impl DialogRequest {
    #[must_use]
    pub fn new(kind: &'static str, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            fields: DialogValues::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, key: &str, default: impl Into<FieldValue>) -> Self {
        self.fields.insert(key, default.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClickMode {
    PickNode,
    PickRegion,
    PickPoint,
}

impl fmt::Display for ClickMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PickNode => "pick a node",
            Self::PickRegion => "pick a region",
            Self::PickPoint => "pick a point",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub control: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Click {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl Click {
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            modifiers: Modifiers::default(),
        }
    }

    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// External input delivered when resuming a suspended operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Dialog(DialogValues),
    /// The user dismissed the dialog or click prompt without a result.
    NoResults,
    Click(Click),
    Confirm(bool),
}

impl Answer {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dialog(_) => "dialog",
            Self::NoResults => "no-results",
            Self::Click(_) => "click",
            Self::Confirm(_) => "confirm",
        }
    }
}

/// An answer as a step sees it: either the data it asked for, or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Given(T),
    NoResults,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_exclusive() {
        let all = [
            StepResult::Continue,
            StepResult::NeedDialog(DialogRequest::new("d", "Dialog")),
            StepResult::NeedClick(ClickMode::PickNode),
            StepResult::NeedConfirmation("Sure?".to_string()),
            StepResult::Done,
            StepResult::Accepted,
            StepResult::Rejected,
            StepResult::Cancelled,
            StepResult::Error("boom".to_string()),
        ];

        for result in &all {
            let classes = [
                result.is_continue(),
                result.is_suspension(),
                result.is_terminal(),
            ];
            assert_eq!(classes.iter().filter(|c| **c).count(), 1, "{result:?}");
        }
    }

    #[test]
    fn only_done_and_accepted_are_success() {
        assert!(StepResult::Done.is_success());
        assert!(StepResult::Accepted.is_success());
        assert!(!StepResult::Cancelled.is_success());
        assert!(!StepResult::Rejected.is_success());
        assert!(!StepResult::Error("x".to_string()).is_success());
    }

    #[test]
    fn display_includes_payload() {
        let result = StepResult::NeedConfirmation("Merge anyway?".to_string());
        assert_eq!(result.to_string(), "need-confirmation: Merge anyway?");
        assert_eq!(StepResult::Done.to_string(), "done");
    }

    #[test]
    fn dialog_values_flag_defaults_to_false() {
        let values = DialogValues::new().with("apply", true).with("name", "x");

        assert!(values.flag("apply"));
        assert!(!values.flag("name"));
        assert!(!values.flag("missing"));
        assert_eq!(values.text("name"), Some("x"));
    }

    #[test]
    fn answers_deserialize_from_toml() -> anyhow::Result<()> {
        #[derive(Deserialize)]
        struct Doc {
            answers: Vec<Answer>,
        }

        let doc: Doc = toml::from_str(
            r#"
answers = [
    { confirm = true },
    "no_results",
    { dialog = { name = "Otx", apply = false, count = 3 } },
    { click = { x = 1.5, y = -2.0, modifiers = { alt = true } } },
]
"#,
        )?;

        assert_eq!(doc.answers[0], Answer::Confirm(true));
        assert_eq!(doc.answers[1], Answer::NoResults);
        let Answer::Dialog(values) = &doc.answers[2] else {
            panic!("expected dialog answer");
        };
        assert_eq!(values.text("name"), Some("Otx"));
        assert_eq!(values.get("count"), Some(&FieldValue::Integer(3)));
        let Answer::Click(click) = &doc.answers[3] else {
            panic!("expected click answer");
        };
        assert!(click.modifiers.alt);
        assert_eq!(click.point(), Point::new(1.5, -2.0));
        Ok(())
    }
}
