// Shared prompt fragments.
// Each service that calls the LLM keeps its own prompts.rs alongside it.

/// Appended to every generation prompt that must answer in the posting's language.
pub const SAME_LANGUAGE_INSTRUCTION: &str = "\
    Always answer in the same language as the job description or the text you were given. \
    Do not mix languages.";

/// Structure the résumé optimizer and parser must emit.
pub const RESUME_JSON_SHAPE: &str = r#"{
  "name": "...",
  "title": "...",
  "location": "...",
  "email": "...",
  "summaryTitle": "...",
  "summary": "...",
  "skillsTitle": "...",
  "skills": ["...", "..."],
  "experienceTitle": "...",
  "experience": [
    {
      "role": "...",
      "company": "...",
      "period": "...",
      "description": "...",
      "bullets": ["...", "..."]
    }
  ],
  "educationTitle": "...",
  "education": {
    "degree": "...",
    "institution": "...",
    "period": "...",
    "details": "..."
  }
}"#;

/// Enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    Return ONLY the JSON object. Do not include any explanation or extra text.";
