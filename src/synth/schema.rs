use serde_json::{Value, json};

/// Instruction sent alongside a label photo.
pub const IMAGE_PROMPT: &str = "Identify this wine. Return JSON including style (Red/White/etc) and taste summary. Use Search to be accurate.";

/// Structured-output schema every answer must follow.
///
/// Style and the 1..=5 scales are documented to the model, not enforced by
/// the schema; [`super::response::parse_analysis`] checks them.
pub fn wine_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "winery": { "type": "STRING" },
            "varietal": { "type": "STRING" },
            "region": { "type": "STRING" },
            "vintage": { "type": "STRING" },
            "style": {
                "type": "STRING",
                "description": "One of: Red, White, Rosé, Sparkling, Sweet, Fortified"
            },
            "summary": {
                "type": "STRING",
                "description": "Professional tasting notes and flavor profile summary."
            },
            "characteristics": {
                "type": "OBJECT",
                "properties": {
                    "body": { "type": "INTEGER" },
                    "tannin": { "type": "INTEGER" },
                    "acidity": { "type": "INTEGER" },
                    "sweetness": { "type": "INTEGER" }
                },
                "required": ["body", "tannin", "acidity", "sweetness"]
            }
        },
        "required": ["name", "winery", "varietal", "region", "vintage", "summary", "characteristics", "style"]
    })
}

/// Instruction for free-text research.
pub fn research_prompt(query: &str) -> String {
    format!(
        "Detailed research for: {query}. Include winery, region, vintage, professional tasting notes and style category."
    )
}

/// `generateContent` body for a label photo.
pub fn image_request(mime_type: &str, base64_data: &str) -> Value {
    json!({
        "contents": [{
            "parts": [
                { "inlineData": { "mimeType": mime_type, "data": base64_data } },
                { "text": IMAGE_PROMPT }
            ]
        }],
        "generationConfig": generation_config(),
        "tools": search_tools()
    })
}

/// `generateContent` body for free-text research.
pub fn research_request(query: &str) -> Value {
    json!({
        "contents": [{
            "parts": [{ "text": research_prompt(query) }]
        }],
        "generationConfig": generation_config(),
        "tools": search_tools()
    })
}

fn generation_config() -> Value {
    json!({
        "responseMimeType": "application/json",
        "responseSchema": wine_schema()
    })
}

fn search_tools() -> Value {
    json!([{ "googleSearch": {} }])
}
