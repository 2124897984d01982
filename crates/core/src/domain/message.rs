#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub student_id: String,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>, student_id: impl Into<String>) -> Self {
        Self { text: text.into(), student_id: student_id.into() }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
