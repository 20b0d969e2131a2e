//! Assembly of the persona prompt from post and comment summaries.
//!
//! Summary `i` of the posts is cited with `urls[i]`, and comment summary `j` with
//! `urls[post_summaries.len() + j]`. With a chunk size above one this cites a URL near
//! the chunk rather than the exact item behind the summary.

pub const PERSONA_INSTRUCTIONS: &str = "You're an expert in behavior analysis. Based on the Reddit summaries below, create a full user persona in the following format:\n\n\
👤 Basic Info\n- Age\n- Occupation\n- Status\n- Location\n- Tier\n- Archetype\n\n\
🧠 Tags: Practical, Adaptable, Active, Spontaneous\n\
Personality Spectrum:\n- Introvert–Extrovert\n- Intuition–Sensing\n- Feeling–Thinking\n- Perceiving–Judging\n\n\
🔥 Motivations (use bars like ▓▓▓░░):\n- Convenience\n- Wellness\n- Speed\n- Preferences\n- Comfort\n- Dietary Needs\n\n\
💬 Behaviour & Habits\n😤 Frustrations\n🎯 Goals & Needs\n\n\
⚠️ Cite the source Reddit URL next to each insight.\n\n";

pub fn build_persona_prompt(
    post_summaries: &[String],
    comment_summaries: &[String],
    urls: &[String],
) -> String {
    let mut prompt = String::from(PERSONA_INSTRUCTIONS);

    for (i, summary) in post_summaries.iter().enumerate() {
        push_entry(&mut prompt, "📌 Post", i, summary, urls.get(i));
    }

    for (j, summary) in comment_summaries.iter().enumerate() {
        let index = post_summaries.len() + j;
        push_entry(&mut prompt, "💬 Comment", j, summary, urls.get(index));
    }

    prompt
}

fn push_entry(prompt: &mut String, kind: &str, position: usize, summary: &str, url: Option<&String>) {
    prompt.push_str(&format!("{} Summary {}:\n{}\n", kind, position + 1, summary));
    if let Some(url) = url {
        prompt.push_str(&format!("URL: {}\n", url));
    }
    prompt.push('\n');
}
