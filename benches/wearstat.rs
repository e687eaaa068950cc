use criterion::{criterion_group, criterion_main, Criterion};
use wearstat::{
    read_records, write_records, DatasetQuery, ExpectedValue, Generator, Header, Sample,
    SensorRegistry, SensorShape, Statistic, Statistics, TimeWindow, ValueCollector,
};

fn window_start(c: &mut Criterion) {
    c.bench_function("window start", |b| {
        let mut ts = 1_700_000_000_000;

        b.iter(|| {
            ts += 31;
            TimeWindow::TenSecond.start_of(ts)
        });
    });
}

fn quartiles(c: &mut Criterion) {
    c.bench_function("quartiles (320 samples)", |b| {
        let mut collector = ValueCollector::default();
        for idx in 0..320 {
            collector.add(f64::from(idx).sin());
        }

        b.iter(|| {
            // NOTE: Clone to defeat the cached sort
            collector.clone().get(Statistic::Quartiles).unwrap()
        });
    });
}

fn ingest(c: &mut Criterion) {
    let registry = SensorRegistry::wearables();

    c.bench_function("ingest scalar (1 hour at 64 Hz)", |b| {
        let spec = registry.get("BLOOD_VOLUME_PULSE").unwrap();
        let records = Generator::new("sub-1", "src-1", spec)
            .duration_ms(3_600_000)
            .generate();

        b.iter(|| {
            let mut expected = ExpectedValue::default();
            for record in &records {
                expected.add(record.time, record.sample(spec.shape).unwrap()).unwrap();
            }
            expected
        });
    });

    c.bench_function("ingest vector (10 min at 32 Hz)", |b| {
        let spec = registry.get("ACCELEROMETER").unwrap();
        let records = Generator::new("sub-1", "src-1", spec)
            .duration_ms(600_000)
            .generate();

        b.iter(|| {
            let mut expected = ExpectedValue::builder()
                .shape(SensorShape::Vector(3))
                .build();
            for record in &records {
                expected.add(record.time, record.sample(spec.shape).unwrap()).unwrap();
            }
            expected
        });
    });
}

fn dataset(c: &mut Criterion) {
    let registry = SensorRegistry::wearables();
    let spec = registry.get("BLOOD_VOLUME_PULSE").unwrap();

    let mut expected = ExpectedValue::default();
    for record in Generator::new("sub-1", "src-1", spec)
        .duration_ms(600_000)
        .generate()
    {
        expected.add(record.time, Sample::Scalar(record.values[0])).unwrap();
    }

    let header = Header::new("sub-1", "src-1", "EMPATICA_E4", "BLOOD_VOLUME_PULSE", "NANOWATT");

    c.bench_function("dataset (average)", |b| {
        b.iter(|| expected.dataset(Statistic::Average, header.clone()).unwrap());
    });

    c.bench_function("dataset (quartiles)", |b| {
        b.iter(|| expected.dataset(Statistic::Quartiles, header.clone()).unwrap());
    });
}

fn parse(c: &mut Criterion) {
    c.bench_function("read records (1 min at 32 Hz)", |b| {
        let registry = SensorRegistry::wearables();
        let spec = registry.get("ACCELEROMETER").unwrap();
        let records = Generator::new("sub-1", "src-1", spec).generate();

        let mut csv = vec![];
        write_records(&mut csv, &["x", "y", "z"], &records).unwrap();

        b.iter(|| read_records(csv.as_slice()).unwrap());
    });

    c.bench_function("parse dataset query", |b| {
        b.iter(|| {
            DatasetQuery::parse("/data/ACCELEROMETER/QUARTILES/TEN_SECOND/radar/sub-1/src-1")
                .unwrap()
        });
    });
}

criterion_group!(benches, window_start, quartiles, ingest, dataset, parse);
criterion_main!(benches);
