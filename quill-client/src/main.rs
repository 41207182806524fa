//! `quill`: headless report over a writer's stories and goals.
//!
//! ```text
//! QUILL_EMAIL=... QUILL_PASSWORD=... quill [stories|goals]
//! ```

use anyhow::Context;
use chrono::Utc;
use quill_client::{telemetry, AppStore, Config, GatewayError, SupabaseClient};
use shared_types::goal_progress::{
    display_words_per_day, days_remaining, format_progress, format_word_count, goal_health,
};
use shared_types::AuthForm;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Report {
    Stories,
    Goals,
}

impl Report {
    fn parse(arg: Option<&str>) -> anyhow::Result<Self> {
        match arg {
            None | Some("goals") => Ok(Report::Goals),
            Some("stories") => Ok(Report::Stories),
            Some(other) => anyhow::bail!("unknown report {other:?}; expected `stories` or `goals`"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let report = Report::parse(args.first().map(String::as_str))?;

    let config = Config::from_env()?;
    info!(url = %config.supabase_url, "quill starting");

    let client = SupabaseClient::new(&config)?;
    let store = AppStore::supabase(client);
    store.session.initialize().await;

    let form = AuthForm {
        email: std::env::var("QUILL_EMAIL").context("QUILL_EMAIL is not set")?,
        password: std::env::var("QUILL_PASSWORD").context("QUILL_PASSWORD is not set")?,
        confirm_password: String::new(),
    };
    if let Err(err) = store.session.sign_in(&form).await {
        let reasons: Vec<String> = err.form_errors().into_values().collect();
        anyhow::bail!("sign-in failed: {}", reasons.join("; "));
    }
    let user = store.session.user().ok_or(GatewayError::NotAuthenticated)?;

    match report {
        Report::Stories => {
            let stories = store.stories.fetch_stories(user.id).await?;
            println!("{} tale(s) in the grimoire of {}", stories.len(), user.email);
            for story in &stories {
                println!(
                    "  {:<40} {:<12} {:>8} words  updated {}",
                    story.title,
                    story.status.label(),
                    format_word_count(story.word_count),
                    story.updated_at.format("%Y-%m-%d %H:%M"),
                );
            }
        }
        Report::Goals => {
            let goals = store.goals.fetch_goals(user.id).await?;
            let now = Utc::now();
            println!("{} writing goal(s) for {}", goals.len(), user.email);
            for goal in &goals {
                println!(
                    "  {:<32} {:>9} / {:<9} {:<16} {:>3} days left, {} words/day  [{:?}]",
                    goal.title,
                    format_word_count(goal.current_words),
                    format_word_count(goal.target_words),
                    format_progress(goal),
                    days_remaining(goal, now),
                    format_word_count(display_words_per_day(goal, now)),
                    goal_health(goal, now),
                );
            }
        }
    }

    if let Err(err) = store.session.sign_out().await {
        tracing::warn!(error = %err, "sign-out failed");
    }
    Ok(())
}
