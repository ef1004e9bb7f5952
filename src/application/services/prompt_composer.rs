use crate::application::ports::ComposedPrompt;
use crate::domain::{ContextBundle, Depth, Mode, ModelRequestParameters};

pub const FORMATTING_INSTRUCTION: &str = "Format the answer in Markdown. Put every piece of code in a fenced block with a language tag, keep each file in its own complete block, and never leave a fence unclosed.";

const PERSONA: &str = "You are an AI coding assistant that writes correct, idiomatic code and explains it plainly.";

const CONTEXT_RULES: &str = "When context from files is provided, always use it and prefer it over general knowledge. \
The files have already been converted to text for you: never claim you cannot open, read or parse PDFs, documents or attachments. \
When an answer relies on a specific file, cite it by filename.";

/// Builds the system and user messages for one request. Pure and deterministic.
pub fn compose(params: &ModelRequestParameters, bundle: &ContextBundle) -> ComposedPrompt {
    ComposedPrompt {
        system_text: system_text(params),
        user_text: user_text(params, bundle),
    }
}

fn system_text(params: &ModelRequestParameters) -> String {
    let critique = if params.critique {
        "Before finalizing, critique your own draft for bugs, missed requirements and edge cases, then fix them."
    } else {
        "Answer directly without a self-critique pass."
    };

    format!(
        "{PERSONA}\n{CONTEXT_RULES}\n\nMode: {} ({})\nDepth: {} ({})\nCritique: {}",
        params.mode,
        mode_instruction(params.mode),
        params.depth,
        depth_instruction(params.depth),
        critique
    )
}

fn user_text(params: &ModelRequestParameters, bundle: &ContextBundle) -> String {
    let mut blocks = Vec::with_capacity(4);

    if let Some(profile) = params.active_style_profile() {
        blocks.push(format!(
            "STYLE PROFILE (follow this coding style):\n{}",
            profile.trim()
        ));
    }

    if !bundle.concatenated_text.is_empty() {
        blocks.push(format!(
            "CONTEXT (retrieval: {}, k={}, selected {} of {} sources, {} chars):\n{}",
            params.retrieval,
            params.rag_k,
            bundle.parts.len(),
            bundle.candidate_count,
            bundle.text_chars(),
            bundle.concatenated_text
        ));
    }

    let task = if params.prompt.trim().is_empty() {
        "(no text)"
    } else {
        params.prompt.as_str()
    };
    blocks.push(format!("TASK:\n{task}"));
    blocks.push(FORMATTING_INSTRUCTION.to_string());

    blocks.join("\n\n")
}

fn mode_instruction(mode: Mode) -> &'static str {
    match mode {
        Mode::Implement => "produce complete, working code for the task",
        Mode::Explain => "explain how the relevant code or concept works, with short examples",
        Mode::Refactor => "improve structure and readability without changing behavior",
        Mode::Debug => "find the root cause of the problem and show the fix",
        Mode::Review => "review the code for bugs, risks and style issues and suggest concrete changes",
    }
}

fn depth_instruction(depth: Depth) -> &'static str {
    match depth {
        Depth::Quick => "keep it brief",
        Depth::Normal => "balanced detail",
        Depth::Deep => "be thorough and cover edge cases",
    }
}
