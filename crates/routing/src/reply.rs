//! Reply production and per-message dispatch.

use {
    anyhow::{Context, Result},
    tracing::{info, warn},
};

use {omniai_common::InboundMessage, omniai_llm::ChatMessage};

use crate::{
    context::AppContext,
    intent::{Intent, classify},
};

/// Static reply for greeting messages.
pub const GREETING: &str = "Hey! I’m OmniAI. Try: `brief`, or `summarize <url>`.";

/// System turn prepended to free-form chat prompts.
const CHAT_SYSTEM_PROMPT: &str = "Helpful, concise assistant.";

/// Process one webhook delivery's messages in order.
///
/// Each message's failure is logged and swallowed so the remaining
/// messages in the batch still get handled.
pub async fn route_event(ctx: &AppContext, messages: &[InboundMessage]) {
    for msg in messages {
        info!(from = %msg.sender, text_len = msg.text.len(), "incoming message");
        if let Err(e) = route_message(ctx, msg).await {
            warn!(from = %msg.sender, error = %e, "message processing failed");
        }
    }
}

async fn route_message(ctx: &AppContext, msg: &InboundMessage) -> Result<()> {
    let Some(body) = reply_for(ctx, &msg.text).await? else {
        return Ok(());
    };
    ctx.sender.send_text(&msg.sender, &body).await
}

/// Produce the reply body for one message body, `None` when the text
/// warrants no reply.
pub async fn reply_for(ctx: &AppContext, text: &str) -> Result<Option<String>> {
    let Some(intent) = classify(text) else {
        return Ok(None);
    };

    let body = match intent {
        Intent::Greeting => GREETING.to_string(),
        Intent::DailyBrief => daily_brief(ctx).await?,
        Intent::Summarize(url) => summarize(ctx, &url).await?,
        Intent::FreeChat(prompt) => chat(ctx, &prompt).await?,
    };
    Ok(Some(body))
}

async fn daily_brief(ctx: &AppContext) -> Result<String> {
    let weather = ctx
        .weather
        .current_line(&ctx.home_city)
        .await
        .context("fetching weather")?;
    let date = chrono::Local::now().date_naive();
    let prompt = format!(
        "Make a crisp morning brief for {} on {date} including: {weather}. Under 120 words.",
        ctx.home_city
    );
    ctx.llm.complete(&[ChatMessage::user(prompt)]).await
}

async fn summarize(ctx: &AppContext, url: &str) -> Result<String> {
    let page = ctx.fetcher.fetch_text(url).await.context("fetching page")?;
    let prompt = format!("Summarize in 5 bullets:\n{page}");
    ctx.llm.complete(&[ChatMessage::user(prompt)]).await
}

async fn chat(ctx: &AppContext, prompt: &str) -> Result<String> {
    ctx.llm
        .complete(&[
            ChatMessage::system(CHAT_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .await
}
