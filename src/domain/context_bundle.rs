use super::context_part::ContextPart;

/// Budget-trimmed context for one request, in upload → chat → library order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextBundle {
    pub parts: Vec<ContextPart>,
    pub concatenated_text: String,
    pub candidate_count: usize,
}

impl ContextBundle {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.concatenated_text.is_empty()
    }

    pub fn text_chars(&self) -> usize {
        self.parts.iter().map(ContextPart::char_len).sum()
    }
}
