// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, RESUME_JSON_SHAPE, SAME_LANGUAGE_INSTRUCTION};

const COVER_LETTER_BRIEF: &str = "\
You are a cover letter generator.
You will be given a job description along with the job applicant's resume.
You will write a cover letter for the applicant that matches their past experiences from the resume with the job description.
Rather than simply outlining the applicant's past experiences, give more detail and explain how those experiences will help the applicant succeed in the new job.
Make it 3 to 4 paragraphs: the first about why the applicant is a great fit for the company, the middle ones about how their previous experience aligns with the role, and a closing paragraph with final thoughts.
Do not add a date to the cover letter.
Write in a modern, professional style without being too formal.";

const WITTY_REMARK: &str = "\
Close the letter with a short, tasteful witty remark that relates to the company or the role.";

const IDEAS_BRIEF: &str = "\
You are a cover letter assistant.
You will be given a job description along with the job applicant's resume.
Do not write a full letter. Instead, give a bullet-point list of ideas the applicant could use in their cover letter, each linking a concrete experience from the resume to a requirement of the job.";

/// Which of the three cover letter prompts to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverLetterStyle {
    Complete,
    CompleteWithWittyRemark,
    Ideas,
}

impl CoverLetterStyle {
    pub fn from_flags(is_complete: bool, include_witty_remark: bool) -> Self {
        match (is_complete, include_witty_remark) {
            (true, true) => CoverLetterStyle::CompleteWithWittyRemark,
            (true, false) => CoverLetterStyle::Complete,
            (false, _) => CoverLetterStyle::Ideas,
        }
    }

    pub fn system_prompt(&self) -> String {
        match self {
            CoverLetterStyle::Complete => format!("{COVER_LETTER_BRIEF}\n{SAME_LANGUAGE_INSTRUCTION}"),
            CoverLetterStyle::CompleteWithWittyRemark => {
                format!("{COVER_LETTER_BRIEF}\n{WITTY_REMARK}\n{SAME_LANGUAGE_INSTRUCTION}")
            }
            CoverLetterStyle::Ideas => format!("{IDEAS_BRIEF}\n{SAME_LANGUAGE_INSTRUCTION}"),
        }
    }
}

/// User turn for cover letter generation.
pub fn cover_letter_user_prompt(
    resume: &str,
    title: &str,
    company: &str,
    location: &str,
    description: &str,
) -> String {
    format!(
        "My Resume: {resume}\n\
         Job title: {title}\n\
         Company: {company}\n\
         Location: {location}\n\
         Job Description: {description}"
    )
}

pub fn resume_optimizer_system() -> String {
    format!(
        "You are a resume optimizer. Given a resume and a job description, rewrite the resume to better match the job description.\n\
         Align keywords and skills in the summary and skills sections with the job, and make sure the resume matches the job title.\n\
         Keep the skills from the original resume (technologies, languages and so on) unless they are completely unrelated to the job.\n\
         {SAME_LANGUAGE_INSTRUCTION} This applies to every title, summary, skill, date and education entry.\n\n\
         Fill in every field of this JSON structure with the optimized content:\n\
         {RESUME_JSON_SHAPE}\n\n\
         {JSON_ONLY_INSTRUCTION}"
    )
}

pub fn resume_optimizer_user_prompt(resume: &str, job_description: &str) -> String {
    format!("Resume: {resume}\nJob Description: {job_description}")
}

/// Parses a hand-edited résumé back into the structured form.
pub fn resume_parser_prompt(content: &str) -> String {
    format!(
        "You are a resume parser. Given the following resume text, return a JSON object with exactly these fields:\n\
         {RESUME_JSON_SHAPE}\n\
         Use the section titles and content as provided, even if they are in another language.\n\
         {JSON_ONLY_INSTRUCTION}\n\n\
         Resume:\n{content}"
    )
}

pub const EDITOR_SYSTEM: &str = "\
You are a cover letter editor. You will be given a piece of isolated text from within a cover letter and told how you can improve it. \
Only respond with the revision. Make sure the revision is in the same language as the given isolated text.";

pub fn editor_user_prompt(content: &str, improvement: &str) -> String {
    format!(
        "Isolated text from within cover letter: {content}. It should be improved by making it more: {improvement}"
    )
}
