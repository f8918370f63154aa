//! Headless rotation runner
//!
//! Drives the rotation engine against the simulated training dummy on a
//! manual clock and prints what it did.

use clap::Parser;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use gunner_rotation::actions::Action;
use gunner_rotation::core::error::Result;
use gunner_rotation::core::{load_profile, Clock, ManualClock, RotationProfile, Timestamp};
use gunner_rotation::engine::{Collaborators, EngineStatus, RotationEngine, TickOutcome};
use gunner_rotation::sim::Encounter;

/// Run the rotation engine against a simulated encounter
#[derive(Parser, Debug)]
#[command(name = "gunner-rotation")]
#[command(about = "Run the machinist rotation engine headless and report its decisions")]
struct Args {
    /// Profile name (loaded from data/profiles/)
    #[arg(long, default_value = "default")]
    profile: String,

    /// Encounter length in seconds
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    /// Simulated frame length in milliseconds
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,

    /// Random seed for the host's rejection rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the scripted opener
    #[arg(long)]
    no_opener: bool,

    /// Hold all burst actions
    #[arg(long)]
    suppress_burst: bool,

    /// Disable an action by name (repeatable), e.g. --disable "Chain Saw"
    #[arg(long = "disable", value_name = "ACTION")]
    disabled: Vec<String>,

    /// Share of valid requests the host randomly refuses (0.0 - 1.0)
    #[arg(long, default_value_t = 0.0)]
    reject_chance: f32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Log every decision
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Serialize)]
struct RunReport {
    profile: String,
    seed: u64,
    seconds: f32,
    ticks: u64,
    invoked: u32,
    rejected: u32,
    skipped: u32,
    blocked: u32,
    per_action: BTreeMap<String, u32>,
    opener: String,
    status: EngineStatus,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        "gunner_rotation=debug"
    } else {
        "gunner_rotation=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);

    let mut profile = load_profile(&args.profile).unwrap_or_else(|e| {
        tracing::warn!("Failed to load profile '{}': {}, using defaults", args.profile, e);
        RotationProfile {
            name: "built-in".to_string(),
            ..RotationProfile::default()
        }
    });
    if args.no_opener {
        profile.policy.use_opener = false;
    }
    if args.suppress_burst {
        profile.policy.suppress_burst = true;
    }
    for name in &args.disabled {
        let action: Action = name.parse()?;
        if !profile.policy.set(action, false) {
            tracing::warn!("{} has no policy flag, ignoring", action);
        }
    }

    let clock = ManualClock::new();
    let encounter = Rc::new(RefCell::new(
        Encounter::new(clock.clone(), &profile.engine, seed).with_reject_chance(args.reject_chance),
    ));
    let collab =
        Collaborators::shared(&encounter, clock.clone()).with_combo_reader(Rc::clone(&encounter));
    let mut engine = RotationEngine::new(collab, profile.engine.clone(), profile.policy.clone());

    let engaged = engine.engage();
    tracing::info!("Engaged: {}", engaged.label());

    let end = Timestamp::from_secs_f32(args.seconds);
    let tick_ms = args.tick_ms.max(1);
    let mut report = RunReport {
        profile: profile.name.clone(),
        seed,
        seconds: args.seconds,
        ticks: 0,
        invoked: 0,
        rejected: 0,
        skipped: 0,
        blocked: 0,
        per_action: BTreeMap::new(),
        opener: String::new(),
        status: engine.status(),
    };

    while clock.now() < end {
        encounter.borrow_mut().advance_to(clock.now());
        match engine.tick() {
            TickOutcome::Invoked(action) => {
                report.invoked += 1;
                *report.per_action.entry(action.name().to_string()).or_insert(0) += 1;
            }
            TickOutcome::Rejected(_) => report.rejected += 1,
            TickOutcome::Skipped(_) => report.skipped += 1,
            TickOutcome::Blocked(_) => report.blocked += 1,
            _ => {}
        }
        report.ticks += 1;
        clock.advance_millis(tick_ms);
    }

    report.opener = format!("{:?}", engine.opener().state());
    report.status = engine.status();

    match args.format.as_str() {
        "text" => print_text(&report),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        other => {
            eprintln!("Unknown format '{}', defaulting to json", other);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn print_text(report: &RunReport) {
    println!("Rotation Run");
    println!("============");
    println!("Profile: {} (seed {})", report.profile, report.seed);
    println!("Duration: {:.1}s over {} ticks", report.seconds, report.ticks);
    println!(
        "Invoked: {}  Rejected: {}  Skipped: {}  Blocked: {}",
        report.invoked, report.rejected, report.skipped, report.blocked
    );
    println!("Opener: {}", report.opener);
    println!();
    for (action, count) in &report.per_action {
        println!("  {:<20} {}", action, count);
    }
    println!();
    println!("Status: {}", report.status.status);
    println!("Last action: {}", report.status.last_action);
}
