// src/job_monitor/prompts.rs
//! Prompt templates for extraction, filtering and summaries

pub const EXTRACT_JOB_LISTINGS: &str = r#"You are a job listing extraction expert. Extract job information from the provided structured text.
Each job is marked with "JOB X:", followed by its "URL:" and "HTML:".

For each job listing found, extract:
- Job Title
- Company Name
- Location
- Job Type (Full-time, Part-time, Contract, etc.)
- Salary (if available)
- Posted Date (if available)
- Job URL/Link
- Brief Description (1-2 sentences)
- Application Method (Email or Website URL)
- Application Target (The specific email address or URL to apply to)

Return a JSON array of objects with exactly these keys:
[
  {
    "title": "Senior Python Developer",
    "company": "Tech Corp",
    "location": "Remote",
    "job_type": "Full-time",
    "salary": "$120k-150k",
    "posted_date": "2 days ago",
    "url": "https://...",
    "description": "...",
    "application_type": "email",
    "application_target": "jobs@techcorp.com"
  }
]

If a field is not available, use null. Extract only what is clearly present.
IMPORTANT: Copy the "URL:" given for each job into its "url" field verbatim. Never invent URLs.
For application_type, use "email" only if an email address is given for applying, otherwise "url".
If application_type is "url", use the same "URL:" for "application_target"."#;

pub const SUMMARIZE_JOBS: &str = r#"You are a job summary expert. Create a concise, well-formatted summary of the job listings.

Create a summary that includes:
1. Total number of jobs found
2. Brief overview of the types of positions
3. Highlight 3-5 of the most interesting opportunities with:
   - Job title and company
   - Why it's interesting
   - Key requirements or highlights

Keep the summary professional, concise and actionable. Format it nicely for email."#;

pub fn extraction_prompt(job_blocks: &str) -> String {
    format!(
        "{}\n\nHTML Content:\n{}\n\nExtract all job listings you can find. Be thorough but accurate.",
        EXTRACT_JOB_LISTINGS, job_blocks
    )
}

pub fn filter_prompt(criteria: &str, job_lines: &str) -> String {
    format!(
        "Filter these jobs based on the criteria:\n\nCriteria: {}\n\nJobs:\n{}\n\nReturn ONLY the numbers of relevant jobs (e.g., \"1, 3, 5\"), or \"none\" if no matches.",
        criteria, job_lines
    )
}

pub fn summary_prompt(jobs_json: &str) -> String {
    format!(
        "{}\n\nJob Listings:\n{}\n\nCreate a professional, engaging summary.",
        SUMMARIZE_JOBS, jobs_json
    )
}
