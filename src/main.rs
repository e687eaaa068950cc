use std::fs::File;
use std::path::Path;
use std::time::Instant;
use wearstat::{
    compare, read_records, write_records, DatasetQuery, ExpectedValue, ExpectedValues, Generator,
    Header, SensorRegistry, SensorShape, Statistic, Store, StreamKey, TimeWindow,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

const PROJECT: &str = "radar-test";
const SOURCE_TYPE: &str = "EMPATICA_E4";
const TOLERANCE: f64 = 1e-2;

fn main() -> wearstat::Result<()> {
    env_logger::builder()
        .filter_module("lsm_tree", log::LevelFilter::Warn)
        .filter_module("fjall", log::LevelFilter::Warn)
        .filter_module("wearstat", log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let path = Path::new(".wearstat");

    if path.try_exists()? {
        std::fs::remove_dir_all(path)?;
    }
    std::fs::create_dir_all(path.join("csv"))?;

    let registry = SensorRegistry::wearables();
    let store = Store::builder().cache_size_mib(16).open(path.join("db"))?;

    let start = Instant::now();
    let mut streams = ExpectedValues::new();

    for (subject_idx, subject) in ["sub-1", "sub-2"].into_iter().enumerate() {
        let source = format!("src-{subject_idx}");

        for (sensor_idx, spec) in registry.iter().enumerate() {
            let records = Generator::new(subject, &source, spec)
                .start(wearstat::timestamp() - 3_600_000)
                .duration_ms(5 * 60_000)
                .drop_rate(0.05)
                .seed((subject_idx * 100 + sensor_idx) as u64)
                .generate();

            let csv_path = path.join("csv").join(format!("{subject}_{}.csv", spec.name));
            let columns = match spec.shape {
                SensorShape::Scalar => vec!["value".to_owned()],
                SensorShape::Vector(arity) => (0..arity).map(|axis| format!("value_{axis}")).collect(),
            };
            let columns = columns.iter().map(String::as_str).collect::<Vec<_>>();
            write_records(File::create(&csv_path)?, &columns, &records)?;

            let expected = streams.get_or_create(
                StreamKey::new(subject, &source, &spec.name),
                ExpectedValue::builder()
                    .shape(spec.shape)
                    .time_window(TimeWindow::TenSecond),
            );

            for record in read_records(File::open(&csv_path)?)? {
                let sample = record.sample(expected.shape())?;
                expected.add(record.time, sample)?;
            }
        }
    }

    log::info!("aggregated {} streams in {:?}", streams.len(), start.elapsed());

    let mut failures = 0;

    for (key, expected) in streams.iter() {
        let Some(spec) = registry.get(&key.sensor) else {
            continue;
        };

        let header = Header::new(
            &key.subject_id,
            &key.source_id,
            SOURCE_TYPE,
            &key.sensor,
            &spec.unit,
        );
        store.write(&header, expected)?;

        for statistic in Statistic::ALL {
            let path = format!(
                "/data/{}/{statistic}/{}/{PROJECT}/{}/{}",
                key.sensor,
                expected.time_window(),
                key.subject_id,
                key.source_id
            );
            let query = DatasetQuery::parse(&path)?;

            let Some(actual) = store.dataset(&query, &registry)? else {
                log::error!("{path}: no data");
                failures += 1;
                continue;
            };

            let wanted = match statistic {
                Statistic::ReceivedMessages => expected
                    .dataset(Statistic::Count, header.clone())?
                    .received_messages(spec.frequency_hz)?,
                statistic => expected.dataset(statistic, header.clone())?,
            };

            let comparison = compare(&wanted, &actual, TOLERANCE);

            if comparison.is_match() {
                log::debug!("{path}: {} windows match", actual.items.len());
            } else {
                log::error!("{path}: {} mismatches", comparison.mismatches.len());
                failures += 1;
            }
        }
    }

    log::info!("validated in {:?}", start.elapsed());

    if failures > 0 {
        log::error!("{failures} datasets did not match");
        std::process::exit(1);
    }

    log::info!("all datasets match");

    Ok(())
}
