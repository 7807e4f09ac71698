//! Terminal front end: plays journeys over any line-based reader and writer.
use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use lifepath_game::{
    LifeSession, Philosopher, Points, Question, QuestionPool, Report, SessionConfig, TurnOutcome,
    decode_journey_code, generate_code_from_entropy,
};

use crate::logic::SeedInfo;

const BAR_WIDTH: usize = 20;

/// What the command line pinned for the first journey.
#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    pub philosopher: Option<Philosopher>,
    pub seed: Option<SeedInfo>,
}

enum Input {
    Line(String),
    Quit,
}

fn read_input<R: BufRead>(input: &mut R) -> Result<Input> {
    let mut line = String::new();
    let read = input.read_line(&mut line).context("reading player input")?;
    let trimmed = line.trim();
    if read == 0 || trimmed.eq_ignore_ascii_case("q") || trimmed.eq_ignore_ascii_case("quit") {
        return Ok(Input::Quit);
    }
    Ok(Input::Line(trimmed.to_string()))
}

fn prompt<W: Write>(out: &mut W, text: &str) -> Result<()> {
    write!(out, "{} ", text.bright_white())?;
    out.flush()?;
    Ok(())
}

/// Play journeys until the player quits. Returns how many journeys finished.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub fn run_interactive<R, W>(
    input: &mut R,
    out: &mut W,
    pool: Arc<QuestionPool>,
    config: SessionConfig,
    options: PlayOptions,
    mut entropy: impl FnMut() -> u64,
) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    writeln!(out, "{}", "☯ Philosophical Life Journey".bright_cyan().bold())?;
    writeln!(out, "{}", "============================".cyan())?;

    let mut pinned = Some(options);
    let mut finished = 0;

    loop {
        let PlayOptions { philosopher, seed } = pinned.take().unwrap_or_default();
        let declared = seed.as_ref().and_then(|s| s.philosopher).or(philosopher);
        let philosopher = match declared {
            Some(p) => p,
            None => match choose_philosopher(input, out)? {
                Some(p) => p,
                None => break,
            },
        };

        let (seed, label) = match seed {
            Some(info) => {
                let label = info.code.as_ref().map_or_else(
                    || format!("seed {}", info.seed),
                    |code| format!("journey code {code}"),
                );
                (info.seed, label)
            }
            None => {
                let code = generate_code_from_entropy(philosopher, entropy());
                let seed = decode_journey_code(&code)
                    .map(|(_, seed)| seed)
                    .with_context(|| format!("generated journey code {code} did not decode"))?;
                (seed, format!("journey code {code}"))
            }
        };

        let mut session = LifeSession::new(Arc::clone(&pool), seed, config);
        session
            .select_philosopher(philosopher)
            .context("fresh session refused a philosopher")?;
        let profile = philosopher.profile();
        writeln!(out)?;
        writeln!(
            out,
            "{} {}",
            profile.icon,
            format!("You walk the path of {}.", profile.full_name).bold()
        )?;
        writeln!(out, "{}", profile.description.dimmed())?;
        writeln!(out, "Your {label}")?;

        if !play_questions(input, out, &mut session)? {
            writeln!(out, "{}", "Goodbye.".cyan())?;
            return Ok(finished);
        }
        finished += 1;

        let report = session.report().context("finished journey has no report")?;
        render_report(out, &report, &label)?;

        writeln!(out)?;
        prompt(out, "Play again? [y/N]")?;
        match read_input(input)? {
            Input::Line(answer) if answer.eq_ignore_ascii_case("y") => {}
            _ => break,
        }
    }

    writeln!(out, "{}", "Goodbye.".cyan())?;
    Ok(finished)
}

fn choose_philosopher<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> Result<Option<Philosopher>> {
    writeln!(out)?;
    writeln!(out, "{}", "Choose the philosopher whose path you will follow:".bold())?;
    for (idx, philosopher) in Philosopher::ALL.into_iter().enumerate() {
        let profile = philosopher.profile();
        writeln!(out, "  {}) {} {}", idx + 1, profile.icon, profile.full_name.bold())?;
        writeln!(out, "     {}", profile.tagline.dimmed())?;
    }

    loop {
        prompt(out, "Philosopher [1-4, q to quit]:")?;
        let Input::Line(line) = read_input(input)? else {
            return Ok(None);
        };
        if let Some(p) = parse_index(&line, Philosopher::ALL.len())
            .map(|idx| Philosopher::ALL[idx])
            .or_else(|| line.parse().ok())
        {
            return Ok(Some(p));
        }
        writeln!(out, "{}", format!("'{line}' is not one of the four.").yellow())?;
    }
}

/// Ask every question until the journey ends. `false` means the player quit.
fn play_questions<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    session: &mut LifeSession,
) -> Result<bool> {
    while let Some(question) = session.current_question().cloned() {
        let order = session.option_order().to_vec();
        render_question(out, session.age(), &question, &order)?;

        let picked = loop {
            prompt(out, &format!("Your answer [1-{}]:", order.len()))?;
            let Input::Line(line) = read_input(input)? else {
                return Ok(false);
            };
            match parse_index(&line, order.len()) {
                Some(idx) => break order[idx],
                None => writeln!(
                    out,
                    "{}",
                    format!("Please enter a number from 1 to {}.", order.len()).yellow()
                )?,
            }
        };

        match session.choose(picked).context("answer rejected")? {
            TurnOutcome::Continue => {}
            TurnOutcome::Died { reason } => {
                writeln!(out)?;
                writeln!(out, "{}", format!("💀 {reason}").red().bold())?;
            }
            TurnOutcome::Completed => {
                writeln!(out)?;
                writeln!(out, "{}", "🌅 You have lived a full life.".green().bold())?;
            }
        }
    }
    Ok(true)
}

fn render_question<W: Write>(
    out: &mut W,
    age: u32,
    question: &Question,
    order: &[Philosopher],
) -> Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{} {}",
        format!("Age {age}:").bright_yellow().bold(),
        question.description
    )?;
    for (idx, philosopher) in order.iter().enumerate() {
        if let Some(option) = question.option(*philosopher) {
            writeln!(out, "  {}) {}", idx + 1, option.text)?;
        }
    }
    Ok(())
}

fn parse_index(line: &str, len: usize) -> Option<usize> {
    line.parse::<usize>()
        .ok()
        .filter(|n| (1..=len).contains(n))
        .map(|n| n - 1)
}

fn bar(percentage: i32) -> String {
    let clamped = usize::try_from(percentage.clamp(0, 100)).unwrap_or(0);
    let filled = clamped * BAR_WIDTH / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn render_points<W: Write>(out: &mut W, totals: &Points) -> Result<()> {
    writeln!(
        out,
        "Life satisfaction: career {} | parents {} | children {} | health {} | friends {} | total {}",
        totals.career,
        totals.parents,
        totals.children,
        totals.health,
        totals.friends,
        totals.total()
    )?;
    Ok(())
}

/// Write the end-of-journey summary.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_report<W: Write>(out: &mut W, report: &Report, label: &str) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=== Your Life Journey ===".bright_cyan().bold())?;
    writeln!(
        out,
        "Declared path: {}",
        report.initial_philosopher.profile().full_name
    )?;
    writeln!(
        out,
        "Adherence: {}% ({} of {} choices)",
        report.adherence_percentage, report.adherence_count, report.choices_made
    )?;
    writeln!(out, "{}", report.tier)?;
    writeln!(out)?;
    writeln!(out, "{}", "Philosophical alignment:".bold())?;
    for share in report.alignment() {
        writeln!(
            out,
            "  {:<11} {} {:>3}% ({})",
            share.philosopher.name(),
            bar(share.percentage),
            share.percentage,
            share.count
        )?;
    }
    writeln!(out, "Primary affinity: {}", report.primary_name())?;
    render_points(out, &report.totals)?;
    match report.death_reason.as_deref() {
        Some(reason) => writeln!(
            out,
            "{}",
            format!("Died at age {}: {reason}", report.final_age).red()
        )?,
        None => writeln!(out, "{}", "Lived to the end of the journey.".green())?,
    }
    writeln!(out, "Replay with {label}")?;
    Ok(())
}
