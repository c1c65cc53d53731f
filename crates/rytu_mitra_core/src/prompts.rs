//! crates/rytu_mitra_core/src/prompts.rs
//!
//! Language-specific instructions sent to the upstream model.

use crate::domain::Language;

const CHAT_SYSTEM_TELUGU: &str = "మీరు తెలుగు రైతులకు సహాయం చేసే AI సహాయకుడు. వ్యవసాయం, పంటలు, తెగుళ్ళు నియంత్రణ, ఎరువులు మరియు వాతావరణం గురించి తెలుగులో సలహా ఇవ్వండి. సరళమైన భాషలో సమాధానాలు ఇవ్వండి.";

const CHAT_SYSTEM_ENGLISH: &str = "You are an AI farming assistant helping Telugu farmers. Provide advice about agriculture, crops, pest control, fertilizers, and weather in simple language.";

const PEST_PROMPT_TELUGU: &str = "ఈ పంట చిత్రాన్ని విశ్లేషించి, ఏదైనా తెగుళ్ళు లేదా వ్యాధులు గుర్తించండి. పేరు, తీవ్రత (low/medium/high) మరియు చికిత్స సిఫార్సులు తెలుగులో ఇవ్వండి.";

const PEST_PROMPT_ENGLISH: &str = "Analyze this crop image and identify any pests or diseases. Provide the name, severity (low/medium/high), and treatment recommendations.";

/// The system instruction for the farming chat.
pub fn chat_system_prompt(language: Language) -> &'static str {
    language.pick(CHAT_SYSTEM_ENGLISH, CHAT_SYSTEM_TELUGU)
}

/// The text part sent alongside a crop image.
pub fn pest_analysis_prompt(language: Language) -> &'static str {
    language.pick(PEST_PROMPT_ENGLISH, PEST_PROMPT_TELUGU)
}
