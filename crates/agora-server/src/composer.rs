//! Reply prompt assembly and generation.
//!
//! The composer builds the ordered turn list for one reply: a single
//! instruction turn carrying the project's questions and any stance context,
//! followed by the recent history mapped to alternating roles, then the new
//! user message verbatim.

use std::sync::Arc;

use tracing::{instrument, warn};

use agora_core::{ChatMessage, Question, Sender, StanceContext};
use agora_llm::{ChatTurn, GeminiClient, GenerationConfig};

use crate::resolver::context_block;

/// Sampling temperature for reply generation.
pub const REPLY_TEMPERATURE: f64 = 0.7;
/// Nucleus-sampling threshold for reply generation.
pub const REPLY_TOP_P: f64 = 0.95;
/// Top-k cutoff for reply generation.
pub const REPLY_TOP_K: u32 = 40;
/// Maximum generated tokens per reply.
pub const REPLY_MAX_OUTPUT_TOKENS: u32 = 1024;

/// Fixed apology sent when reply generation fails.
pub const GENERATION_FAILURE_REPLY: &str =
    "申し訳ありません。応答の生成中にエラーが発生しました。APIの設定をご確認ください。";

/// Sampling configuration for reply generation.
#[must_use]
pub fn reply_config() -> GenerationConfig {
    GenerationConfig {
        temperature: Some(REPLY_TEMPERATURE),
        top_p: Some(REPLY_TOP_P),
        top_k: Some(REPLY_TOP_K),
        max_output_tokens: Some(REPLY_MAX_OUTPUT_TOKENS),
    }
}

/// Build the instruction turn text.
fn instruction(questions: &[Question], context: Option<&StanceContext>) -> String {
    let mut text = String::from(
        "あなたは市民の議論を深めるディベートパートナーです。\n\nこのプロジェクトの論点:\n",
    );
    if questions.is_empty() {
        text.push_str("(登録なし)\n");
    } else {
        for (index, question) in questions.iter().enumerate() {
            text.push_str(&format!("{}. {}\n", index + 1, question.text));
        }
    }
    if let Some(context) = context {
        text.push('\n');
        text.push_str(&context_block(context));
        text.push('\n');
    }
    text.push_str(
        "\n振る舞いの指示:\n\
         - ユーザーとは異なる立場から反論や問いかけを行い、議論を深めてください。\n\
         - 論点から外れた発言は、上記の論点に自然に引き戻してください。\n\
         - 返答は最大2〜3文で、ユーザーの口調に合わせてください。\n\
         - 温かく敬意のある態度を保ってください。絵文字は使わないでください。",
    );
    text
}

/// Assemble the ordered turn list for one reply.
///
/// History entries map user messages to user turns and bot messages to model
/// turns; the newest message is appended verbatim as the final user turn.
#[must_use]
pub fn compose_turns(
    questions: &[Question],
    context: Option<&StanceContext>,
    history: &[ChatMessage],
    message: &str,
) -> Vec<ChatTurn> {
    let mut turns = Vec::with_capacity(history.len() + 2);
    turns.push(ChatTurn::user(instruction(questions, context)));
    for entry in history {
        turns.push(match entry.sender {
            Sender::User => ChatTurn::user(entry.content.clone()),
            Sender::Bot => ChatTurn::model(entry.content.clone()),
        });
    }
    turns.push(ChatTurn::user(message));
    turns
}

/// Generates chat replies from composed turn lists.
pub struct ReplyComposer {
    llm: Arc<GeminiClient>,
}

impl ReplyComposer {
    /// Create a composer over the LLM client.
    #[must_use]
    pub fn new(llm: Arc<GeminiClient>) -> Self {
        Self { llm }
    }

    /// Generate a reply for the new message.
    ///
    /// A generation failure is absorbed here: the turn completes with the
    /// fixed apology text instead of an error.
    #[instrument(skip_all, fields(question_count = questions.len(), history_len = history.len()))]
    pub async fn generate_reply(
        &self,
        questions: &[Question],
        context: Option<&StanceContext>,
        history: &[ChatMessage],
        message: &str,
    ) -> String {
        let turns = compose_turns(questions, context, history, message);
        match self.llm.generate(&turns, &reply_config()).await {
            Ok(reply) => reply,
            Err(error) => {
                warn!(%error, "reply generation failed, sending apology");
                GENERATION_FAILURE_REPLY.to_owned()
            }
        }
    }
}
