pub mod counters;
pub mod handlers;

pub use counters::TokenCounters;
pub use handlers::{CallHandler, CodeHandler, DiscoveryHandler, TraditionalHandler};

use colored::*;
use serde_json::Value;

use crate::api::{ChatApi, ChatRequest, Message};
use crate::error::{BenchError, Result};

pub struct AgentOutcome {
    /// Assistant content of the last turn, when the model stopped calling
    /// tools within the budget.
    pub final_answer: Option<String>,
    /// Chat-completion requests actually issued (<= max_turns).
    pub turns: u32,
    /// Calls executed through the handler.
    pub dispatches: u32,
}

/// The conversation loop shared by every strategy: request a completion,
/// execute whatever calls the model asked for, feed the results back, and
/// stop on a call-free answer or when the turn budget runs out.
pub async fn run_agent(
    api: &dyn ChatApi,
    model: &str,
    messages: &mut Vec<Message>,
    handler: &mut dyn CallHandler,
    max_turns: u32,
    counters: &mut TokenCounters,
    verbose: bool,
) -> Result<AgentOutcome> {
    let offered = handler.offered_tools();
    let tools = if offered.is_empty() {
        None
    } else {
        Some(offered)
    };

    let mut turns = 0u32;
    let mut dispatches = 0u32;

    for _ in 0..max_turns {
        turns += 1;
        let request = ChatRequest::new(model, messages.clone(), tools.clone());
        let response = api.complete(&request).await?;

        if let Some(usage) = response.usage {
            counters.add(&usage);
            if verbose {
                eprintln!(
                    "{}",
                    format!(
                        "[agent] turn {} - prompt: {}, completion: {}",
                        turns, usage.prompt_tokens, usage.completion_tokens
                    )
                    .dimmed()
                );
            }
        }

        let message = response
            .first_message()
            .ok_or_else(|| BenchError::Other("No choices in response".to_string()))?;
        let content = message.content.clone();
        let tool_calls = message.tool_calls.clone().unwrap_or_default();

        messages.push(Message::assistant(
            content.clone(),
            if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls.clone())
            },
        ));

        if tool_calls.is_empty() {
            return Ok(AgentOutcome {
                final_answer: content,
                turns,
                dispatches,
            });
        }

        for call in &tool_calls {
            let name = &call.function.name;
            println!("{}", format!("Calling tool: {}...", name).cyan());
            let result_text = match serde_json::from_str::<Value>(&call.function.arguments) {
                Ok(arguments) => {
                    dispatches += 1;
                    handler.handle(name, arguments).await
                }
                Err(e) => {
                    format!("Error: failed to parse arguments for tool '{}': {}", name, e)
                }
            };
            if verbose {
                let preview: String = result_text.chars().take(200).collect();
                eprintln!("{}", format!("[agent] {} -> {}", name, preview).dimmed());
            }
            messages.push(Message::tool(&call.id, result_text));
        }
    }

    Ok(AgentOutcome {
        final_answer: None,
        turns,
        dispatches,
    })
}
