//! Prompt construction and the default assistant policy.

use crate::chat::{ChatRequest, ChatTurn, Role};

/// Greeting the chat widget shows before the user types anything.
pub const DEFAULT_GREETING: &str =
    "Hi! I'm your Vital AI health assistant. How can I help you today?";

/// Policy sent as the provider's system instruction.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "\
You are an AI health assistant.

Guidelines:
- Always give clear, structured, step-by-step explanations.
- Write in simple language suitable for a general audience with limited medical background.
- Use plain text with line breaks. Never use markdown asterisks (*) or other decorative symbols.
- Provide preventive advice, lifestyle suggestions, vaccination timelines, and basic symptom awareness.
- Only recommend seeing a doctor when symptoms are serious or life-threatening (for example chest pain, difficulty breathing, seizures, unconsciousness).
- Otherwise focus on self-care guidance, home remedies, and awareness.
- If emphasis is needed, use CAPITALIZATION or simple clear words instead of bold text.
- If the user asks about anything other than health, politely remind them that you only provide health-related information and decline to answer.

Output format:
- Title line (topic in short words)
- Short explanation (2-3 sentences)

Rules for answers:
- Respond only to the specific question asked.
- Use clean bullet points or numbered lists with proper spacing.
- Keep answers concise: short sentences, no long paragraphs.
- Do not add disclaimers or safety warnings unless the user asks about side effects or risks.
- Do not repeat the same information.
- Always stay factual and practical.";

const HISTORY_PREAMBLE: &str = "Previous conversation:";
const CURRENT_MESSAGE_LABEL: &str = "Current message:";

/// Drop assistant turns that are exactly the canned greeting.
pub fn filter_history<'a>(history: &'a [ChatTurn], greeting: &str) -> Vec<&'a ChatTurn> {
    history
        .iter()
        .filter(|turn| !(turn.role == Role::Assistant && turn.content == greeting))
        .collect()
}

/// Fold the request into the single text blob sent to the provider.
///
/// Without usable history the prompt is just the trimmed message.
pub fn build_prompt(request: &ChatRequest, greeting: &str) -> String {
    let turns = filter_history(&request.history, greeting);
    if turns.is_empty() {
        return request.message().to_string();
    }

    let context = turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str(), turn.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{HISTORY_PREAMBLE}\n{context}\n\n{CURRENT_MESSAGE_LABEL} {}",
        request.message()
    )
}
