use std::fs;
use std::path::PathBuf;

use serde_json::json;

use fitcard::{render_card, CardOptions, DirRecordStore, RecordStore};

fn store_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fitcard-it-{}-{tag}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_record(dir: &PathBuf, id: &str, body: &serde_json::Value) {
    fs::write(dir.join(format!("{id}.json")), body.to_string()).unwrap();
}

fn details_payload() -> serde_json::Value {
    let rows: Vec<serde_json::Value> = (0..120)
        .map(|i| {
            json!({"metrics": [
                1_700_000_000_000.0_f64 + i as f64 * 5_000.0,
                59.9100 + i as f64 * 2e-4,
                10.7500 + i as f64 * 3e-4,
                2.8 + (i % 7) as f64 * 0.1,
                118.0 + (i % 40) as f64,
                85.0 + (i % 10) as f64,
                160.0 + (i % 12) as f64,
            ]})
        })
        .collect();
    json!({
        "metricDescriptors": [
            {"metricsIndex": 0, "key": "directTimestamp"},
            {"metricsIndex": 1, "key": "directLatitude"},
            {"metricsIndex": 2, "key": "directLongitude"},
            {"metricsIndex": 3, "key": "directSpeed"},
            {"metricsIndex": 4, "key": "directHeartRate"},
            {"metricsIndex": 5, "key": "directElevation"},
            {"metricsIndex": 6, "key": "directDoubleCadence"},
        ],
        "activityDetailMetrics": rows,
    })
}

fn assert_is_card_png(bytes: &[u8]) {
    assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    let img = image::load_from_memory(bytes).expect("decodable png");
    assert_eq!(img.width(), 1080);
    assert_eq!(img.height(), 1920);
}

#[test]
fn endurance_record_renders_offline() {
    let dir = store_dir("endurance");
    write_record(&dir, "run-1", &json!({"details": details_payload()}));

    let record = DirRecordStore::new(&dir).load("run-1").unwrap();
    let options = CardOptions {
        title: Some("Morning Run".to_string()),
        subtitle: Some("Thu 28 Aug".to_string()),
    };
    // No tile source: the map panel renders the route on a flat backing.
    let png = render_card(&record, None, &options).unwrap();
    assert_is_card_png(&png);

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn strength_record_renders_offline() {
    let dir = store_dir("strength");
    write_record(
        &dir,
        "lift-1",
        &json!({
            "workout": {
                "title": "Leg Day",
                "exercises": [
                    {"title": "Squat (Barbell)", "sets": [
                        {"type": "warmup", "weight_kg": 60.0, "reps": 8},
                        {"type": "normal", "weight_kg": 120.0, "reps": 5},
                        {"type": "normal", "weight_kg": 120.0, "reps": 5},
                        {"type": "normal", "weight_kg": 120.0, "reps": 5},
                    ]},
                    {"title": "Romanian Deadlift (Barbell)", "sets": [
                        {"type": "normal", "weight_kg": 90.0, "reps": 8},
                        {"type": "normal", "weight_kg": 90.0, "reps": 8},
                    ]},
                    {"title": "Standing Calf Raise", "sets": [
                        {"type": "normal", "weight_kg": 60.0, "reps": 15},
                    ]},
                ]
            },
            "enrichment": {
                "avgHr": 126.0,
                "maxHr": 168.0,
                "calories": 310.0,
                "durationSec": 2700.0,
                "hrSamples": [98.0, 118.0, 135.0, 151.0, 144.0, 129.0, 112.0]
            }
        }),
    );

    let record = DirRecordStore::new(&dir).load("lift-1").unwrap();
    let png = render_card(&record, None, &CardOptions::default()).unwrap();
    assert_is_card_png(&png);

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn unknown_record_id_errors() {
    let dir = store_dir("missing");
    let err = DirRecordStore::new(&dir).load("ghost").unwrap_err();
    assert!(err.to_string().contains("record not found"));
    fs::remove_dir_all(dir).unwrap();
}
