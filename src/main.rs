use log::{error, info};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use wintally::platform::NativeProbe;
use wintally::report::ReportWriter;
use wintally::{ActivityTracker, Error, SamplerConfig, SamplerService};

/// How often the binary drains the tracker into the report file.
const DRAIN_INTERVAL: Duration = Duration::from_secs(60);

const REPORT_PATH: &str = "wintally-report.jsonl";

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let probe = NativeProbe::new()?;
    let tracker = Arc::new(ActivityTracker::new(SystemTime::now()));
    let service = SamplerService::new(probe, Arc::clone(&tracker), SamplerConfig::default())?;

    let mut report = ReportWriter::create(Path::new(REPORT_PATH))?;

    let _handle = service.start();
    info!("tracking window activity, report in {REPORT_PATH}");

    loop {
        std::thread::sleep(DRAIN_INTERVAL);

        let entries = tracker.drain_new_entries();
        if !entries.is_empty() {
            report.write_entries(&entries)?;
        }

        let rows = tracker.drain_aggregate();
        if !rows.is_empty() {
            for row in &rows {
                info!("{row}");
            }
            report.write_aggregate(&rows)?;
        }
    }
}
