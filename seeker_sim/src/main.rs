mod devices;

use anyhow::Context;
use devices::{ConsoleIndicator, ConsoleMotor, DriftingLightCamera, FolderCamera, RandomRanging};
use light_seeker::hardware::{Camera, FileImageSink, FileReportSink, ThreadSleep};
use light_seeker::{ControlHandle, Controller, Devices, NavigationLoop, SeekerConfig, SeekerError};
use std::env;
use std::io::BufRead;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Exit status used when the camera cannot deliver a frame.
const CAPTURE_FAILURE_EXIT_CODE: i32 = 5;
const OBSTACLE_CHANCE: f64 = 0.1;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("light_seeker=info,seeker_sim=info")),
        )
        .init();

    // --- 1. Argument Parsing & Setup ---
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("Usage: seeker_sim [config.yaml] [frames_dir]");
        println!("Keys: a = start, x = stop/resume, y = execution log, q = quit");
        return Ok(());
    }
    let config = match args.get(1) {
        Some(path) => SeekerConfig::load(path).with_context(|| format!("loading {path}"))?,
        None => SeekerConfig::default(),
    };
    let camera: Box<dyn Camera + Send> = match args.get(2) {
        Some(dir) => Box::new(FolderCamera::open(Path::new(dir))?),
        None => Box::new(DriftingLightCamera::new(config.tie_break_seed.unwrap_or(7))),
    };

    // --- 2. Device & Loop Initialization ---
    let devices = Devices {
        camera,
        ranging: Box::new(RandomRanging::new(
            config.tie_break_seed.unwrap_or(11),
            OBSTACLE_CHANCE,
        )),
        motor: Box::new(ConsoleMotor),
        indicator: Box::new(ConsoleIndicator),
        image_sink: Box::new(FileImageSink::new(&config.image_dir)),
        report_sink: Box::new(FileReportSink::new(&config.report_path)),
        delay: Box::new(ThreadSleep),
    };
    let navigation = NavigationLoop::new(config, devices);
    let (controller, handle) = Controller::new(navigation);

    info!("*********************************************************");
    info!("**************** SWIFTBOT LIGHT SEEKER *****************");
    info!("*********************************************************");
    info!("press 'a' + Enter to start, 'x' to stop/resume, 'y' for the log, 'q' to quit");

    // --- 3. Control Signals ---
    spawn_button_reader(handle.clone());
    let ctrl_c_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted");
            let _ = ctrl_c_handle.shutdown();
        }
    });

    // --- 4. Main Loop ---
    let outcome = tokio::task::spawn_blocking(move || controller.run())
        .await
        .context("controller thread panicked")?;
    match outcome {
        Ok(navigation) => {
            let report = navigation.report();
            info!(
                detections = report.light_detections,
                distance_cm = report.distance_travelled_cm,
                "light search finished"
            );
            Ok(())
        }
        Err(SeekerError::Capture(e)) => {
            error!("could not capture image: {e}");
            std::process::exit(CAPTURE_FAILURE_EXIT_CODE);
        }
        Err(e) => Err(e.into()),
    }
}

/// Maps stdin lines onto the robot's buttons. Runs on a plain thread so a pending
/// read never holds the runtime open at exit.
fn spawn_button_reader(handle: ControlHandle) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let sent = match line.trim() {
                "a" | "A" => handle.start(),
                "x" | "X" => handle.toggle(),
                "y" | "Y" => handle.request_report().map(|reply| {
                    let _ = reply.blocking_recv();
                }),
                "q" | "Q" => {
                    let _ = handle.shutdown();
                    return;
                }
                "" => Ok(()),
                other => {
                    warn!("unknown key {other:?}");
                    Ok(())
                }
            };
            if sent.is_err() {
                return;
            }
        }
        let _ = handle.shutdown();
    });
}
