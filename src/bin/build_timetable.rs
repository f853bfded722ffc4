//! Feed Reader + Timetable Builder: reads every operator's directory under
//! `FEEDS_DIR`, repairs trips, expands calendars, and writes the timetable
//! artifacts the server and the station reconciler both load.

use railquery::config::Config;
use railquery::timetable_builder;

fn main() {
    env_logger::init();

    let config = Config::from_env();
    log::info!("building timetable from feeds in {}", config.feeds_dir.display());

    let timetable = timetable_builder::build(&config.feeds_dir);
    log::info!(
        "built timetable: {} stops, {} routes",
        timetable.stops.len(),
        timetable.routes_info.len()
    );

    railquery::persist::save_timetable(&config.artifacts_dir, &timetable, timetable_builder::builder::OPERATORS)
        .expect("failed to write timetable artifacts");
    log::info!("wrote timetable artifacts to {}", config.artifacts_dir.display());
}
