//! Fact-extraction prompt templates.
//!
//! The engine's LLM extracts discrete facts from conversations before
//! anything is embedded or stored. These templates steer that extraction;
//! they are injected into the engine configuration as
//! `custom_fact_extraction_prompt`. Templates carry a `{current_date}`
//! placeholder substituted at assembly time.

use chrono::Local;

use crate::error::Result;

/// Broad template: personal preferences AND project/technical knowledge.
const KNOWLEDGE_TEMPLATE: &str = r#"You are a Knowledge and Information Organizer, specialized in accurately storing facts, memories, preferences, and knowledge.
Your primary role is to extract ALL relevant pieces of information from conversations and organize them into distinct, manageable facts.
This includes personal preferences, project knowledge, technical documentation, and any other useful information.

Types of Information to Remember:

1. Personal Preferences: Keep track of likes, dislikes, and specific preferences in various categories.
2. Personal Details: Remember significant personal information like names, relationships, and important dates.
3. Plans and Intentions: Note upcoming events, trips, goals, and any plans shared.
4. Professional Details: Remember job titles, work habits, career goals, and other professional information.
5. Project Knowledge: Store information about software projects, libraries, frameworks, and their features.
6. Technical Documentation: Remember API designs, architecture decisions, configuration details, and technical specifications.
7. Code Patterns: Store coding conventions, best practices, and implementation patterns.
8. System Information: Remember server configurations, deployment details, and infrastructure knowledge.
9. Business Logic: Store domain knowledge, business rules, and workflow descriptions.
10. Miscellaneous: Keep track of any other useful information that might be referenced later.

Here are some few shot examples:

Input: Hi.
Output: {"facts" : []}

Input: There are branches in trees.
Output: {"facts" : []}

Input: Hi, I am looking for a restaurant in San Francisco.
Output: {"facts" : ["Looking for a restaurant in San Francisco"]}

Input: Hi, my name is John. I am a software engineer.
Output: {"facts" : ["Name is John", "Is a Software engineer"]}

Input: The project uses a REST API gateway and Qdrant as the vector database.
Output: {"facts" : ["Project uses a REST API gateway", "Project uses Qdrant as vector database"]}

Input: Our coding convention requires all functions to have type hints and docstrings.
Output: {"facts" : ["Coding convention requires type hints on all functions", "Coding convention requires docstrings on all functions"]}

Return the facts in a JSON format as shown above.

Remember the following:
- Today's date is {current_date}.
- Do not return anything from the custom few shot example prompts provided above.
- If you do not find anything relevant in the below conversation, return an empty list for "facts".
- Create facts from BOTH personal information AND technical/project knowledge.
- Each fact should be a complete, self-contained statement that can be understood without context.
- Make sure to return the response in JSON format with a key "facts" and a list of strings as value.
- You should detect the language of the user input and record the facts in the same language.
- IMPORTANT: Extract ALL meaningful information, including project descriptions, technical details, and documentation.

Following is a conversation. Extract all relevant facts from it and return them in JSON format.
"#;

/// Narrow template: personal preferences only, no project knowledge.
const PERSONAL_TEMPLATE: &str = r#"You are a Personal Information Organizer, specialized in accurately storing facts, user memories, and preferences.
Your primary role is to extract relevant pieces of information from conversations and organize them into distinct, manageable facts.
This allows for easy retrieval and personalization in future interactions.

Types of Information to Remember:

1. Store Personal Preferences: Keep track of likes, dislikes, and specific preferences in various categories such as food, products, activities, and entertainment.
2. Maintain Important Personal Details: Remember significant personal information like names, relationships, and important dates.
3. Track Plans and Intentions: Note upcoming events, trips, goals, and any plans the user has shared.
4. Remember Activity and Service Preferences: Recall preferences for dining, travel, hobbies, and other services.
5. Monitor Health and Wellness Preferences: Keep a record of dietary restrictions, fitness routines, and other wellness-related information.
6. Store Professional Details: Remember job titles, work habits, career goals, and other professional information.
7. Miscellaneous Information Management: Keep track of favorite books, movies, brands, and other miscellaneous details that the user shares.

Here are some few shot examples:

Input: Hi.
Output: {"facts" : []}

Input: There are branches in trees.
Output: {"facts" : []}

Input: Hi, I am looking for a restaurant in San Francisco.
Output: {"facts" : ["Looking for a restaurant in San Francisco"]}

Input: Hi, my name is John. I am a software engineer.
Output: {"facts" : ["Name is John", "Is a Software engineer"]}

Return the facts and preferences in a JSON format as shown above.

Remember the following:
- Today's date is {current_date}.
- Do not return anything from the custom few shot example prompts provided above.
- If you do not find anything relevant in the below conversation, return an empty list for "facts".
- Create the facts based on the user messages only.
- Make sure to return the response in JSON format with a key "facts" and a list of strings as value.
- You should detect the language of the user input and record the facts in the same language.

Following is a conversation. Extract all relevant facts from it and return them in JSON format.
"#;

/// Which built-in extraction template to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Personal + project knowledge (the default).
    Knowledge,
    /// Personal preferences only.
    Personal,
    /// Let the engine use its own built-in prompt.
    None,
}

impl PromptKind {
    /// Parse the `FACT_EXTRACTION_PROMPT` setting. Unknown values fall back
    /// to the default template.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "personal" => Self::Personal,
            "none" | "off" => Self::None,
            _ => Self::Knowledge,
        }
    }
}

fn current_date() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

fn render(template: &str) -> String {
    template.replace("{current_date}", &current_date())
}

/// Render the selected built-in template, or `None` for [`PromptKind::None`].
pub fn fact_extraction_prompt(kind: PromptKind) -> Option<String> {
    match kind {
        PromptKind::Knowledge => Some(render(KNOWLEDGE_TEMPLATE)),
        PromptKind::Personal => Some(render(PERSONAL_TEMPLATE)),
        PromptKind::None => None,
    }
}

/// Load and render a custom template from a file.
pub fn fact_extraction_prompt_from_file(path: &str) -> Result<String> {
    let template = std::fs::read_to_string(path)?;
    Ok(render(&template))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_prompt_kind_parse() {
        assert_eq!(PromptKind::parse("personal"), PromptKind::Personal);
        assert_eq!(PromptKind::parse("NONE"), PromptKind::None);
        assert_eq!(PromptKind::parse("default"), PromptKind::Knowledge);
        assert_eq!(PromptKind::parse("gibberish"), PromptKind::Knowledge);
    }

    #[test]
    fn test_date_substitution() {
        let prompt = fact_extraction_prompt(PromptKind::Knowledge).unwrap();
        assert!(!prompt.contains("{current_date}"));
        assert!(prompt.contains("Today's date is"));
    }

    #[test]
    fn test_none_kind_yields_no_prompt() {
        assert!(fact_extraction_prompt(PromptKind::None).is_none());
    }

    #[test]
    fn test_personal_template_differs() {
        let knowledge = fact_extraction_prompt(PromptKind::Knowledge).unwrap();
        let personal = fact_extraction_prompt(PromptKind::Personal).unwrap();
        assert_ne!(knowledge, personal);
        assert!(personal.contains("Personal Information Organizer"));
    }

    #[test]
    fn test_file_template_rendered() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Extract facts. Today is {{current_date}}.").unwrap();
        let rendered =
            fact_extraction_prompt_from_file(file.path().to_str().unwrap()).unwrap();
        assert!(!rendered.contains("{current_date}"));
        assert!(rendered.starts_with("Extract facts."));
    }

    #[test]
    fn test_missing_file_errors() {
        let result = fact_extraction_prompt_from_file("/nonexistent/prompt.txt");
        assert!(result.is_err());
    }
}
