use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use countdown_timer::config::AppConfig;
use countdown_timer::engine::{
    CountdownEngine, ManualTickScheduler, StubTimeSource, SystemTimeSource, TickScheduler,
    TimerEvent, TokioTickScheduler,
};
use countdown_timer::timer::{TimeOperator, TimeUnit, TimerState};

#[derive(Parser, Debug)]
#[command(
    name = "countdown_cli",
    about = "Drive the countdown engine from the terminal"
)]
struct Cli {
    /// Emit machine-readable JSON lines instead of human output
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a live countdown against the wall clock
    Run {
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=23))]
        hours: u32,
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=59))]
        minutes: u32,
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=59))]
        seconds: u32,
        /// Override the configured tick interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Step a countdown deterministically and print each snapshot
    Simulate {
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=23))]
        hours: u32,
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=59))]
        minutes: u32,
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=59))]
        seconds: u32,
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
        /// Stop after this many fired ticks (cancels the remainder)
        #[arg(long)]
        ticks: Option<u64>,
    },
}

fn main() -> ExitCode {
    countdown_timer::init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            hours,
            minutes,
            seconds,
            interval_ms,
        } => run_live(hours, minutes, seconds, interval_ms, cli.json),
        Commands::Simulate {
            hours,
            minutes,
            seconds,
            interval_ms,
            ticks,
        } => run_simulate(hours, minutes, seconds, interval_ms, ticks, cli.json),
    }
}

fn run_live(
    hours: u32,
    minutes: u32,
    seconds: u32,
    interval_ms: Option<u64>,
    json: bool,
) -> Result<ExitCode> {
    let mut config = AppConfig::load();
    if let Some(interval) = interval_ms {
        config.timer.tick_interval_ms = interval;
    }
    let engine = CountdownEngine::from_parts(
        config,
        Arc::new(TokioTickScheduler::new()),
        Arc::new(SystemTimeSource::default()),
    );
    set_fields(&engine, hours, minutes, seconds)?;

    if engine.snapshot().configured_duration_millis() == 0 {
        eprintln!("Nothing to count down: duration is 00:00:00");
        return Ok(ExitCode::from(2));
    }

    let mut states = engine.subscribe_state();
    let mut events = engine.event_receiver();
    engine.start()?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building Tokio runtime for countdown")?;

    rt.block_on(async {
        loop {
            if states.changed().await.is_err() {
                break;
            }
            let snapshot = states.borrow_and_update().clone();
            print_state(&snapshot, json)?;
            if !snapshot.is_running {
                break;
            }
        }
        Ok::<(), anyhow::Error>(())
    })?;

    while let Ok(event) = events.try_recv() {
        print_event(&event, json)?;
    }

    Ok(ExitCode::from(0))
}

fn run_simulate(
    hours: u32,
    minutes: u32,
    seconds: u32,
    interval_ms: u64,
    ticks: Option<u64>,
    json: bool,
) -> Result<ExitCode> {
    let mut config = AppConfig::default();
    config.timer.tick_interval_ms = interval_ms;
    let scheduler = Arc::new(ManualTickScheduler::new());
    let engine = CountdownEngine::from_parts(
        config,
        Arc::clone(&scheduler) as Arc<dyn TickScheduler>,
        Arc::new(StubTimeSource::new()),
    );
    set_fields(&engine, hours, minutes, seconds)?;

    if engine.snapshot().configured_duration_millis() == 0 {
        eprintln!("Nothing to count down: duration is 00:00:00");
        return Ok(ExitCode::from(2));
    }

    engine.start()?;
    print_state(&engine.snapshot(), json)?;

    let mut fired = 0u64;
    while engine.is_running() {
        if let Some(budget) = ticks {
            if fired >= budget {
                engine.cancel()?;
                break;
            }
        }
        scheduler.fire_tick();
        fired += 1;
        print_state(&engine.snapshot(), json)?;
    }

    Ok(ExitCode::from(0))
}

fn set_fields(engine: &CountdownEngine, hours: u32, minutes: u32, seconds: u32) -> Result<()> {
    for _ in 0..hours {
        engine.adjust_field(TimeUnit::Hours, TimeOperator::Increase)?;
    }
    for _ in 0..minutes {
        engine.adjust_field(TimeUnit::Minutes, TimeOperator::Increase)?;
    }
    for _ in 0..seconds {
        engine.adjust_field(TimeUnit::Seconds, TimeOperator::Increase)?;
    }
    Ok(())
}

fn print_state(state: &TimerState, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(state)?);
    } else {
        println!("{}  {:5.1}%", state.display_text, state.progress * 100.0);
    }
    Ok(())
}

fn print_event(event: &TimerEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
    } else {
        println!("[{} ms] {:?}", event.timestamp_ms, event.kind);
    }
    Ok(())
}
