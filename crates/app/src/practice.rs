use std::error::Error;

use interview_core::countdown::format_remaining;
use interview_core::model::{FeedbackReport, InterviewSetupDraft, SessionStatus};
use services::{
    AnalyticsService, EndOutcome, InterviewService, SaveOutcome, SessionController, SessionError,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

type Input = Lines<BufReader<Stdin>>;

/// One line typed during the interview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Answer(String),
    Next,
    Previous,
    Goto(usize),
    Clear,
    End,
    Quit,
    Unknown(String),
}

impl Entry {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix(':') else {
            return Self::Answer(line.trim_end().to_owned());
        };
        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("next" | "n"), None) => Self::Next,
            (Some("prev" | "p"), None) => Self::Previous,
            (Some("goto" | "g"), Some(n)) => match n.parse::<usize>() {
                Ok(n) if n > 0 => Self::Goto(n - 1),
                _ => Self::Unknown(trimmed.to_owned()),
            },
            (Some("clear"), None) => Self::Clear,
            (Some("end"), None) => Self::End,
            (Some("quit" | "q"), None) => Self::Quit,
            _ => Self::Unknown(trimmed.to_owned()),
        }
    }
}

pub async fn run(
    interviews: &InterviewService,
    analytics: &AnalyticsService,
    draft: InterviewSetupDraft,
) -> Result<(), Box<dyn Error>> {
    let prepared = interviews.setup(draft).await?;
    analytics
        .track(
            "start-interview",
            serde_json::json!({ "sessionId": prepared.session_id.as_str() }),
        )
        .await;
    let (mut controller, mut ticker) = interviews.open(&prepared, None).await?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!(
        "Interview with {} started: {} questions, {} left.",
        controller.context().company_name,
        controller.session().question_count(),
        format_remaining(controller.remaining_secs())
    );
    println!("Type to answer. Commands: :next :prev :goto N :clear :end :quit");
    show_question(&controller);

    loop {
        tokio::select! {
            tick = ticker.tick(), if !ticker.is_stopped() => {
                if tick.is_none() {
                    continue;
                }
                match controller.on_tick().await {
                    Ok(Some(tick)) if tick.expired => {
                        println!("Time is up.");
                        break;
                    }
                    Ok(Some(tick)) => {
                        if tick.remaining_secs % 60 == 0 || tick.remaining_secs <= 10 {
                            println!("[{} left]", format_remaining(tick.remaining_secs));
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        eprintln!("{err}");
                        break;
                    }
                }
            }
            line = input.next_line() => {
                let Some(line) = line? else {
                    controller.close();
                    return Ok(());
                };
                match Entry::parse(&line) {
                    Entry::Answer(text) => {
                        let current = controller.current_answer();
                        let text = if current.is_empty() {
                            text
                        } else {
                            format!("{current}\n{text}")
                        };
                        controller.set_current_answer(text)?;
                    }
                    Entry::Clear => {
                        controller.set_current_answer(String::new())?;
                        println!("Answer cleared.");
                    }
                    Entry::Next => {
                        controller.next_question();
                        show_question(&controller);
                    }
                    Entry::Previous => {
                        controller.previous_question();
                        show_question(&controller);
                    }
                    Entry::Goto(index) => {
                        controller.select_question(index);
                        show_question(&controller);
                    }
                    Entry::End => match controller.request_end().await {
                        Ok(_) => break,
                        Err(SessionError::PrematureEnd) => {
                            println!("Answer at least one question before ending.");
                        }
                        Err(err @ SessionError::Completion(_)) => {
                            eprintln!("{err}");
                            break;
                        }
                        Err(err) => return Err(err.into()),
                    },
                    Entry::Quit => {
                        controller.close();
                        println!("Interview discarded.");
                        return Ok(());
                    }
                    Entry::Unknown(raw) => println!("Unknown command: {raw}"),
                }
            }
        }
    }

    analytics
        .track(
            "end-interview",
            serde_json::json!({ "answered": controller.answered_count() }),
        )
        .await;
    finish(&mut controller, &mut input).await
}

async fn finish(
    controller: &mut SessionController,
    input: &mut Input,
) -> Result<(), Box<dyn Error>> {
    while controller.status() == SessionStatus::Completing {
        if !confirm(input, "Submitting answers failed. Retry?").await? {
            controller.close();
            return Ok(());
        }
        match controller.retry_completion().await {
            Ok(EndOutcome::Completed | EndOutcome::Ignored) => {}
            Err(err @ SessionError::Completion(_)) => eprintln!("{err}"),
            Err(err) => return Err(err.into()),
        }
    }

    let submitted = controller.submitted_answers().map_or(0, |answers| answers.len());
    println!("{submitted} answers submitted. Waiting for feedback...");
    loop {
        match controller.fetch_feedback().await {
            Ok(report) => {
                show_feedback(report);
                break;
            }
            Err(err @ SessionError::Feedback(_)) => {
                eprintln!("{err}");
                if !confirm(input, "Try fetching feedback again?").await? {
                    controller.close();
                    return Ok(());
                }
            }
            Err(err) => return Err(err.into()),
        }
    }

    if controller.already_saved() {
        println!("This interview is already in your saved interviews.");
        return Ok(());
    }
    if confirm(input, "Save this interview?").await? {
        match controller.save().await? {
            SaveOutcome::Saved => println!("Saved."),
            SaveOutcome::AlreadySaved => println!("Already saved."),
        }
    } else {
        controller.close();
    }
    Ok(())
}

async fn confirm(input: &mut Input, prompt: &str) -> std::io::Result<bool> {
    println!("{prompt} [y/N]");
    let answer = input.next_line().await?.unwrap_or_default();
    debug!(prompt, answer = %answer.trim(), "confirmation");
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn show_question(controller: &SessionController) {
    let count = controller.session().question_count();
    let index = controller.current_index();
    if let Some(question) = controller.current_question() {
        println!();
        println!("Question {} of {count}: {question}", index + 1);
        let answer = controller.current_answer();
        if !answer.is_empty() {
            println!("Your answer so far:\n{answer}");
        }
    }
}

fn show_feedback(report: &FeedbackReport) {
    println!();
    println!("Overall score: {:.1}/10", report.overall_score);
    if !report.summary.is_empty() {
        println!("{}", report.summary);
    }
    print_list("Strengths", &report.strengths);
    print_list("Areas for improvement", &report.areas_for_improvement);
    let skills = &report.communication_skills;
    println!(
        "Communication: clarity {:.1}, conciseness {:.1}, confidence {:.1}",
        skills.clarity, skills.conciseness, skills.confidence
    );
    println!("Technical accuracy: {:.1}", report.technical_accuracy.score);
    println!("Company fit: {:.1}", report.company_fit.score);
    print_list("Recommendations", &report.recommendations);
    for (n, item) in report.question_feedback.iter().enumerate() {
        println!();
        println!("Q{}: {} ({:.1}/10)", n + 1, item.question, item.score);
        if !item.feedback.is_empty() {
            println!("  {}", item.feedback);
        }
        if let Some(suggested) = &item.suggested_answer {
            println!("  Suggested: {suggested}");
        }
    }
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{title}:");
    for item in items {
        println!("  - {item}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_answers() {
        assert_eq!(
            Entry::parse("I led the migration  \n"),
            Entry::Answer("I led the migration".into())
        );
    }

    #[test]
    fn commands_are_prefixed_with_colon() {
        assert_eq!(Entry::parse(":next"), Entry::Next);
        assert_eq!(Entry::parse(" :prev "), Entry::Previous);
        assert_eq!(Entry::parse(":goto 3"), Entry::Goto(2));
        assert_eq!(Entry::parse(":end"), Entry::End);
        assert_eq!(Entry::parse(":q"), Entry::Quit);
    }

    #[test]
    fn bad_commands_are_reported() {
        assert_eq!(Entry::parse(":goto 0"), Entry::Unknown(":goto 0".into()));
        assert_eq!(Entry::parse(":goto"), Entry::Unknown(":goto".into()));
        assert_eq!(Entry::parse(":dance"), Entry::Unknown(":dance".into()));
    }
}
