use crate::assets::{CONSOLE_QUEUE, STATS_EVERY_FRAMES};
use crate::capture::{BlankSource, CodeDetector, FrameSource, NullDetector, ReplayScript};
use crate::config::{Config, app_name, app_version};
use crate::display::LogRenderer;
use crate::events::EventDispatcher;
use crate::link::CommandLink;
use crate::notify::{AudioCue, BellCue, MarkLayer, TerminalStatus};
use crate::pipeline::{ControlLoop, LoopParts, MonotonicClock};
use crate::scan::{Debouncer, RecordDirectory};
use crate::utils::sos::SignalOfStop;
use crate::workers::console::help_line;
use crate::workers::{OperatorConsole, WorkerClose};
use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use log::{info, warn};
use std::io::{self, BufReader};
use std::panic;
use std::path::PathBuf;
use std::sync::mpsc::sync_channel;

pub mod assets;
pub mod capture;
pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod link;
pub mod notify;
pub mod pipeline;
pub mod scan;
pub mod utils;
pub mod workers;

fn cli() -> Command {
    Command::new(app_name())
        .version(app_version())
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("JSON configuration file; flags override its values.")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("DEVICE")
                .help("Serial device of the actuator board."),
        )
        .arg(
            Arg::new("baud")
                .short('b')
                .long("baud")
                .value_name("RATE")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("cooldown")
                .long("cooldown")
                .value_name("SECONDS")
                .help("Minimum time after a scan before a different code may trigger again.")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("records")
                .short('r')
                .long("records")
                .value_name("FILE")
                .help("JSON record directory replacing the built-in ward list.")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("replay")
                .long("replay")
                .value_name("FILE")
                .help("Play back a scripted capture session (JSON lines).")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("fps")
                .long("fps")
                .value_name("FRAMES")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("tone")
                .long("tone")
                .help("Beep through the sound card instead of the terminal bell.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-console")
                .long("no-console")
                .help("Do not read operator commands from stdin.")
                .action(ArgAction::SetTrue),
        )
}

fn build_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(port) = matches.get_one::<String>("port") {
        config.port = port.clone();
    }
    if let Some(baud) = matches.get_one::<u32>("baud") {
        config.baud = *baud;
    }
    if let Some(cooldown) = matches.get_one::<f64>("cooldown") {
        config.cooldown_secs = *cooldown;
    }
    if let Some(records) = matches.get_one::<PathBuf>("records") {
        config.records = Some(records.clone());
    }
    if let Some(replay) = matches.get_one::<PathBuf>("replay") {
        config.replay = Some(replay.clone());
    }
    if let Some(fps) = matches.get_one::<u32>("fps") {
        config.frame_rate = *fps;
    }
    if matches.get_flag("tone") {
        config.tone = true;
    }

    config.validate()?;
    Ok(config)
}

fn audio_cue(config: &Config) -> Box<dyn AudioCue> {
    #[cfg(feature = "tone")]
    if config.tone {
        use crate::assets::{TONE_HZ, TONE_MILLIS};
        use std::time::Duration;

        match crate::notify::ToneCue::start(TONE_HZ, Duration::from_millis(TONE_MILLIS)) {
            Ok(cue) => return Box::new(cue),
            Err(e) => warn!("Tone cue unavailable ({:#}), using the terminal bell", e),
        }
    }

    #[cfg(not(feature = "tone"))]
    if config.tone {
        warn!("Built without the `tone` feature, using the terminal bell");
    }

    Box::new(BellCue::stdout())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let matches = cli().get_matches();
    let config = build_config(&matches)?;

    info!("Starting {} v{}", app_name(), app_version());
    info!(
        "Configuration: port={} baud={} cooldown={}s camera={}x{}@{}fps",
        config.port,
        config.baud,
        config.cooldown_secs,
        config.camera_width,
        config.camera_height,
        config.frame_rate
    );

    let sos = SignalOfStop::new();

    // a panicking worker thread stops the loop instead of leaving it orphaned
    let orig_hook = panic::take_hook();
    let panic_sos = sos.clone();
    panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        panic_sos.cancel();
    }));

    // gracefully close the app when receiving SIGINT, SIGTERM, or SIGHUP
    let signal_sos = sos.clone();
    ctrlc::set_handler(move || signal_sos.cancel()).context("Error setting Ctrl-C handler")?;

    let records = match &config.records {
        Some(path) => RecordDirectory::load(path)?,
        None => RecordDirectory::builtin(),
    };

    let clock = MonotonicClock::new();
    let (frames, detector): (Box<dyn FrameSource>, Box<dyn CodeDetector>) = match &config.replay {
        Some(path) => {
            let (source, detector) = ReplayScript::load(path)?.into_parts(
                clock.clone(),
                config.camera_width,
                config.camera_height,
            );
            (Box::new(source), Box::new(detector))
        }
        None => {
            warn!("No camera backend in this build and no replay script; running with empty frames");
            (
                Box::new(BlankSource::new(
                    clock.clone(),
                    config.camera_width,
                    config.camera_height,
                )),
                Box::new(NullDetector),
            )
        }
    };

    let link = CommandLink::open(&config.link_settings());
    let dispatcher = EventDispatcher::new(
        audio_cue(&config),
        Box::new(TerminalStatus::stdout()),
        Box::new(MarkLayer::new()),
        link,
    );

    let (commands_tx, commands_rx) = sync_channel(CONSOLE_QUEUE);
    let mut console = if matches.get_flag("no-console") {
        None
    } else {
        println!("{}", help_line());
        Some(OperatorConsole::spawn(
            BufReader::new(io::stdin()),
            commands_tx,
            sos.clone(),
        ))
    };

    let mut control = ControlLoop::new(LoopParts {
        clock: Box::new(clock),
        frames,
        detector,
        records,
        debouncer: Debouncer::new(config.cooldown()),
        dispatcher,
        renderer: Box::new(LogRenderer::new()),
        commands: commands_rx,
        sos,
    })
    .with_frame_budget(config.frame_budget())
    .with_stats_every(STATS_EVERY_FRAMES);

    control.run();

    if let Some(console) = console.as_mut() {
        console.close();
    }
    Ok(())
}
