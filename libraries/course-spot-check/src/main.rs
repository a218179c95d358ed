use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveTime};
use clap::Parser;
use language_utils::CourseData;
use snapshot_store::{JsonFileSnapshotStore, SnapshotStore};
use xuexi_core::{DailyMetrics, IntervalConfig, SimulatedDay, StudentProgress, Study, TimestampMs};

/// Simulate a learner working through a course and print which exercises
/// the selector picks each day.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Course file: `{"exercises": [...], "orderedWords": [...]}`
    course: PathBuf,

    /// Number of days to simulate
    #[arg(short, long, default_value_t = 30)]
    days: usize,

    /// New words the learner takes on per day
    #[arg(short, long, default_value_t = 10)]
    new_words_per_day: usize,

    /// First simulated day (UTC)
    #[arg(short, long, default_value = "2024-01-01")]
    start: NaiveDate,

    /// JSON file overriding any of the interval settings
    #[arg(long)]
    interval_config: Option<PathBuf>,

    /// Progress snapshot to resume from; updated when the simulation ends
    #[arg(long)]
    progress: Option<PathBuf>,

    /// Write every simulated day as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn load_study(args: &Args) -> Result<Study> {
    let json = fs::read_to_string(&args.course)
        .with_context(|| format!("Failed to read course {}", args.course.display()))?;
    let (corpus, ordered_words) = CourseData::from_json(&json)
        .and_then(CourseData::into_parts)
        .with_context(|| format!("Invalid course {}", args.course.display()))?;
    println!(
        "Loaded {} exercises, {} distinct words, {} words in the curriculum",
        corpus.len(),
        corpus.vocabulary_size(),
        ordered_words.len()
    );

    let config = match &args.interval_config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read interval config {}", path.display()))?;
            serde_json::from_str::<IntervalConfig>(&json)
                .with_context(|| format!("Invalid interval config {}", path.display()))?
        }
        None => IntervalConfig::default(),
    };

    let progress = match &args.progress {
        Some(path) => {
            let progress: Option<StudentProgress> = JsonFileSnapshotStore::new(path).load()?;
            if progress.is_some() {
                log::info!("Resuming from {}", path.display());
            }
            progress.unwrap_or_default()
        }
        None => StudentProgress::default(),
    };

    Ok(Study::restore(
        Arc::new(corpus),
        Arc::new(ordered_words),
        config,
        progress,
    ))
}

fn print_day(day: &SimulatedDay) {
    let new_words = day
        .exercises
        .iter()
        .filter(|exercise| exercise.introduced_new_word)
        .count();
    println!(
        "\n=== {} ({} exercises, {} new words) ===",
        day.date,
        day.exercises.len(),
        new_words
    );
    for exercise in &day.exercises {
        let marker = if exercise.introduced_new_word {
            "+"
        } else {
            " "
        };
        println!(
            "  {marker} #{:<5} {:<8} {}",
            exercise.index, exercise.target_word, exercise.chinese
        );
    }
}

fn print_summary(study: &Study, days: &[SimulatedDay], now: TimestampMs) {
    let exercises: usize = days.iter().map(|day| day.exercises.len()).sum();
    let unique_exercises: HashSet<usize> = days
        .iter()
        .flat_map(|day| day.exercises.iter().map(|exercise| exercise.index))
        .collect();
    let summary = study.review_summary(now);
    let upcoming = study.upcoming_review_stats(now, 7);
    let memory_strength = DailyMetrics::measure(&study.progress().words, now).memory_strength;

    println!("\n\n=== COURSE SPOT CHECK SUMMARY ===\n");
    println!("  Days simulated: {}", days.len());
    println!("  Exercises completed: {exercises}");
    println!(
        "  Unique exercises seen: {} of {} ({:.1}%)",
        unique_exercises.len(),
        study.corpus().len(),
        unique_exercises.len() as f64 / study.corpus().len().max(1) as f64 * 100.0
    );
    println!("  Words tracked: {}", summary.tracked_count);
    println!("  Known words: {}", summary.known_count);
    println!("  Due now: {}", summary.due_count);
    println!("  Memory strength: {memory_strength:.1} days");
    println!("  Daily streak: {}", study.daily_streak(now));
    println!(
        "  Reviews in the next week: {} (at most {} per day)",
        upcoming.total_reviews, upcoming.max_per_day
    );
    match study.next_new_word() {
        Some(word) => println!("  Next new word: {word}"),
        None => println!("  Curriculum complete"),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let study = load_study(&args)?;

    let start_time = args.start.and_time(NaiveTime::MIN).and_utc();
    let mut simulator = study
        .simulate_usage(start_time)
        .new_words_per_day(args.new_words_per_day);
    let days: Vec<SimulatedDay> = simulator.by_ref().take(args.days).collect();
    for day in &days {
        print_day(day);
    }

    let study = simulator.into_study();
    let end = start_time + Duration::days(args.days as i64);
    print_summary(&study, &days, end.timestamp_millis());

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&days)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("\nWrote {} days to {}", days.len(), path.display());
    }

    if let Some(path) = &args.progress {
        JsonFileSnapshotStore::new(path)
            .save(study.progress())
            .with_context(|| format!("Failed to save progress to {}", path.display()))?;
        println!("Saved progress to {}", path.display());
    }

    Ok(())
}
