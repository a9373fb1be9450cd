//! MCP Prompt Definitions
//!
//! Guidance prompts served through prompts/list and prompts/get.

use super::protocol::{Prompt, PromptContent, PromptGetResult, PromptMessage};

const MEMORY_ASSISTANT: &str = "memory_assistant";

const MEMORY_ASSISTANT_TEXT: &str = "\
You are using the Recall MCP server for long-term memory management.

Quick Start:
1. Store memories: Use add_memory to save facts, preferences, or conversations
2. Search memories: Use search_memories for semantic queries
3. List memories: Use get_memories for browsing all stored memories
4. Update/Delete: Use update_memory and delete_memory for modifications
5. History: Use get_memory_history to see how a memory changed over time

Available Tools:
- add_memory: Store new information (text or conversation)
- search_memories: Find memories by meaning (semantic search)
- get_memories: List all memories with optional filters
- get_memory: Get a single memory by ID
- update_memory: Update an existing memory's content
- delete_memory: Delete a single memory
- delete_all_memories: Bulk delete memories by scope
- get_memory_history: View change history for a memory
- reset_memories: Clear all memories (use with caution!)

Tips:
- Memories are automatically indexed for semantic search
- Use user_id to separate memories by user
- Use agent_id and run_id for more granular organization
- Search returns results ranked by relevance";

/// Get all available prompts
pub fn get_all_prompts() -> Vec<Prompt> {
    vec![Prompt {
        name: MEMORY_ASSISTANT.to_string(),
        description: Some(
            "Get help with memory operations and best practices.".to_string(),
        ),
    }]
}

/// Resolve a prompt by name
pub fn get_prompt(name: &str) -> Option<PromptGetResult> {
    match name {
        MEMORY_ASSISTANT => Some(PromptGetResult {
            description: Some(
                "Get help with memory operations and best practices.".to_string(),
            ),
            messages: vec![PromptMessage {
                role: "user".to_string(),
                content: PromptContent::Text {
                    text: MEMORY_ASSISTANT_TEXT.to_string(),
                },
            }],
        }),
        _ => None,
    }
}
