//! MCP Tool Definitions
//!
//! Defines the nine memory tools exposed over the MCP protocol.

use super::protocol::{PropertySchema, Tool, ToolInputSchema};
use std::collections::HashMap;

/// Get all available memory tools
pub fn get_all_tools() -> Vec<Tool> {
    vec![
        add_memory_tool(),
        search_memories_tool(),
        get_memories_tool(),
        get_memory_tool(),
        update_memory_tool(),
        delete_memory_tool(),
        delete_all_memories_tool(),
        get_memory_history_tool(),
        reset_memories_tool(),
    ]
}

// Helper to create property schema
fn string_prop(description: &str) -> PropertySchema {
    PropertySchema {
        property_type: "string".to_string(),
        description: Some(description.to_string()),
        default: None,
        items: None,
    }
}

fn number_prop(description: &str, default: Option<f64>) -> PropertySchema {
    PropertySchema {
        property_type: "number".to_string(),
        description: Some(description.to_string()),
        default: default.map(|v| serde_json::json!(v)),
        items: None,
    }
}

fn boolean_prop(description: &str, default: bool) -> PropertySchema {
    PropertySchema {
        property_type: "boolean".to_string(),
        description: Some(description.to_string()),
        default: Some(serde_json::json!(default)),
        items: None,
    }
}

fn object_prop(description: &str) -> PropertySchema {
    PropertySchema {
        property_type: "object".to_string(),
        description: Some(description.to_string()),
        default: None,
        items: None,
    }
}

fn array_prop(description: &str, item_type: &str) -> PropertySchema {
    PropertySchema {
        property_type: "array".to_string(),
        description: Some(description.to_string()),
        default: None,
        items: Some(Box::new(PropertySchema {
            property_type: item_type.to_string(),
            description: None,
            default: None,
            items: None,
        })),
    }
}

/// Scope properties shared by every tool that filters by user/agent/run.
fn insert_scope_props(properties: &mut HashMap<String, PropertySchema>) {
    properties.insert(
        "user_id".to_string(),
        string_prop("Filter by user ID. Defaults to the configured user."),
    );
    properties.insert(
        "agent_id".to_string(),
        string_prop("Filter by agent ID."),
    );
    properties.insert("run_id".to_string(), string_prop("Filter by run ID."));
}

fn add_memory_tool() -> Tool {
    let mut properties = HashMap::new();
    properties.insert(
        "text".to_string(),
        string_prop("Plain sentence summarizing what to store. Required."),
    );
    properties.insert(
        "messages".to_string(),
        array_prop(
            "Structured conversation history with 'role'/'content'. Use when you have multiple turns.",
            "object",
        ),
    );
    insert_scope_props(&mut properties);
    properties.insert(
        "metadata".to_string(),
        object_prop("Attach arbitrary metadata JSON to the memory."),
    );

    Tool {
        name: "add_memory".to_string(),
        description: Some(
            "Store a new preference, fact, or conversation snippet in long-term memory."
                .to_string(),
        ),
        input_schema: ToolInputSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: Some(vec!["text".to_string()]),
        },
    }
}

fn search_memories_tool() -> Tool {
    let mut properties = HashMap::new();
    properties.insert(
        "query".to_string(),
        string_prop("Natural language description of what to find."),
    );
    insert_scope_props(&mut properties);
    properties.insert(
        "filters".to_string(),
        object_prop(
            "Metadata filters for search. Common usage: {'project': 'project-name'}. Supports operators: exact match {'key': 'value'}, equals {'key': {'eq': 'value'}}, not equals {'key': {'ne': 'value'}}, in list {'key': {'in': ['val1', 'val2']}}.",
        ),
    );
    properties.insert(
        "limit".to_string(),
        number_prop("Maximum number of results to return.", Some(100.0)),
    );

    Tool {
        name: "search_memories".to_string(),
        description: Some(
            "Semantic search across existing memories. Results are ranked by semantic relevance to the query. Supports filtering by project via the filters parameter."
                .to_string(),
        ),
        input_schema: ToolInputSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: Some(vec!["query".to_string()]),
        },
    }
}

fn get_memories_tool() -> Tool {
    let mut properties = HashMap::new();
    insert_scope_props(&mut properties);

    Tool {
        name: "get_memories".to_string(),
        description: Some(
            "List all memories with optional filters. Use for browsing stored memories."
                .to_string(),
        ),
        input_schema: ToolInputSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: None,
        },
    }
}

fn get_memory_tool() -> Tool {
    let mut properties = HashMap::new();
    properties.insert(
        "memory_id".to_string(),
        string_prop("Exact memory_id to fetch."),
    );

    Tool {
        name: "get_memory".to_string(),
        description: Some("Fetch a single memory by its memory_id.".to_string()),
        input_schema: ToolInputSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: Some(vec!["memory_id".to_string()]),
        },
    }
}

fn update_memory_tool() -> Tool {
    let mut properties = HashMap::new();
    properties.insert(
        "memory_id".to_string(),
        string_prop("Exact memory_id to overwrite."),
    );
    properties.insert(
        "text".to_string(),
        string_prop("Replacement text for the memory."),
    );

    Tool {
        name: "update_memory".to_string(),
        description: Some("Overwrite an existing memory's text.".to_string()),
        input_schema: ToolInputSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: Some(vec!["memory_id".to_string(), "text".to_string()]),
        },
    }
}

fn delete_memory_tool() -> Tool {
    let mut properties = HashMap::new();
    properties.insert(
        "memory_id".to_string(),
        string_prop("Exact memory_id to delete."),
    );

    Tool {
        name: "delete_memory".to_string(),
        description: Some("Delete a single memory by its memory_id.".to_string()),
        input_schema: ToolInputSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: Some(vec!["memory_id".to_string()]),
        },
    }
}

fn delete_all_memories_tool() -> Tool {
    let mut properties = HashMap::new();
    properties.insert(
        "user_id".to_string(),
        string_prop("User scope to delete; defaults to the configured user."),
    );
    properties.insert(
        "agent_id".to_string(),
        string_prop("Optional agent scope to delete."),
    );
    properties.insert(
        "run_id".to_string(),
        string_prop("Optional run scope to delete."),
    );

    Tool {
        name: "delete_all_memories".to_string(),
        description: Some(
            "Bulk delete all memories in the given user/agent/run scope.".to_string(),
        ),
        input_schema: ToolInputSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: None,
        },
    }
}

fn get_memory_history_tool() -> Tool {
    let mut properties = HashMap::new();
    properties.insert(
        "memory_id".to_string(),
        string_prop("Memory ID to get history for."),
    );

    Tool {
        name: "get_memory_history".to_string(),
        description: Some("Get the history of changes for a specific memory.".to_string()),
        input_schema: ToolInputSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: Some(vec!["memory_id".to_string()]),
        },
    }
}

fn reset_memories_tool() -> Tool {
    let mut properties = HashMap::new();
    properties.insert(
        "confirm".to_string(),
        boolean_prop("Must be true to confirm the reset operation.", false),
    );

    Tool {
        name: "reset_memories".to_string(),
        description: Some(
            "Reset/clear all memories in the database. Use with caution!".to_string(),
        ),
        input_schema: ToolInputSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: None,
        },
    }
}
