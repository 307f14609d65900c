use crash_dashboard::analyzers::{SeasonalBasis, analyze};
use crash_dashboard::config::{BlackSpotSource, DashboardConfig};
use crash_dashboard::parser::{parse_accidents, parse_black_spots};
use crash_dashboard::pipeline::{build_dashboard, load_accident_data, publish_documents};
use crash_dashboard::stats::DatasetStats;

const ACCIDENTS: &[u8] = include_bytes!("fixtures/accidents_cp949.csv");
const BLACK_SPOTS: &[u8] = include_bytes!("fixtures/black_spot_2021.csv");

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

#[test]
fn test_full_pipeline() {
    let records = parse_accidents(ACCIDENTS, "cp949").expect("Failed to parse accidents");
    assert_eq!(records.len(), 4);

    let analysis = analyze(&records, SeasonalBasis::DeathsPerTraffic).unwrap();

    let seasons: Vec<(&str, f64)> = analysis
        .seasonal
        .iter()
        .map(|s| (s.season.as_str(), s.ratio))
        .collect();
    assert_eq!(seasons, vec![("가을", 1.5), ("겨울", 1.0)]);

    let months: Vec<String> = analysis.monthly.iter().map(|m| m.label()).collect();
    assert_eq!(months, vec!["2021-11", "2021-12", "2022-01"]);
    let monthly_sum: u64 = analysis.monthly.iter().map(|m| m.deaths).sum();
    assert_eq!(monthly_sum, 7);

    let weekdays: Vec<(&str, u64)> = analysis
        .weekday
        .iter()
        .map(|w| (w.label, w.deaths))
        .collect();
    assert_eq!(
        weekdays,
        vec![
            ("토요일", 5),
            ("수요일", 1),
            ("금요일", 1),
            ("월요일", 0),
            ("화요일", 0),
            ("목요일", 0),
            ("일요일", 0),
        ]
    );

    let hourly: Vec<(u32, u64, f64)> = analysis
        .hourly
        .iter()
        .map(|h| (h.hour, h.deaths, h.normalized))
        .collect();
    assert_eq!(hourly, vec![(8, 2, 0.0), (17, 2, 0.0), (22, 3, 1.0)]);
}

#[test]
fn test_accident_share_basis() {
    let records = parse_accidents(ACCIDENTS, "cp949").unwrap();
    let analysis = analyze(&records, SeasonalBasis::AccidentShare).unwrap();

    assert_eq!(analysis.seasonal[0].ratio, 50.0);
    assert_eq!(analysis.seasonal[1].ratio, 50.0);
}

#[test]
fn test_wrong_encoding_is_rejected() {
    assert!(parse_accidents(ACCIDENTS, "utf-8").is_err());
}

#[test]
fn test_dataset_stats() {
    let records = parse_accidents(ACCIDENTS, "cp949").unwrap();
    let stats = DatasetStats::from_records(&records);

    assert_eq!(stats.rows, 4);
    assert_eq!(stats.deaths, 7);
    assert_eq!(stats.casualties, 12);
    assert_eq!(stats.with_position, 4);
}

#[test]
fn test_black_spot_fixture() {
    let segments = parse_black_spots(BLACK_SPOTS, "utf-8").expect("Failed to parse black spots");

    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0].marker.as_deref(), Some("S"));
    assert_eq!(segments[2].marker, None);
    assert_eq!(segments[1].name, "0010VDS00200");
}

#[tokio::test]
async fn test_build_and_publish_dashboard() {
    let mut config = DashboardConfig::default();
    config.accidents.path = fixture("accidents_cp949.csv");
    config.black_spots = vec![BlackSpotSource {
        id: "black-spot-2021".to_string(),
        label: "21년 블랙스팟".to_string(),
        path: fixture("black_spot_2021.csv"),
        encoding: "utf-8".to_string(),
    }];

    let dashboard = build_dashboard(&config).await.unwrap();

    let ids: Vec<&str> = dashboard.maps().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["black-spot-2021", "death-analysis"]);

    let black_spot = dashboard.map("black-spot-2021").unwrap();
    assert!(black_spot.html.contains(r#""type":"PathLayer""#));
    assert!(black_spot.html.contains(r#""color":[255,0,0,255]"#));
    assert!(black_spot.html.contains(r#""width":96"#));

    let dir = std::env::temp_dir().join("crash_dashboard_integration_docs");
    let _ = std::fs::remove_dir_all(&dir);
    let paths = publish_documents(&dashboard, &dir).unwrap();

    assert_eq!(paths.len(), 2);
    assert!(dir.join("death-analysis_layer.html").exists());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_load_accident_data() {
    let mut config = DashboardConfig::default();
    config.accidents.path = fixture("accidents_cp949.csv");

    let data = load_accident_data(&config).await.unwrap();

    assert_eq!(data.records.len(), 4);
    assert_eq!(data.stats.rows, 4);
    assert_eq!(data.analysis.monthly.len(), 3);
}

#[tokio::test]
async fn test_build_dashboard_rejects_unsafe_id() {
    let mut config = DashboardConfig::default();
    config.accidents.path = fixture("accidents_cp949.csv");
    config.black_spots = vec![BlackSpotSource {
        id: "../black-spot-2021".to_string(),
        label: "21년 블랙스팟".to_string(),
        path: fixture("black_spot_2021.csv"),
        encoding: "utf-8".to_string(),
    }];

    assert!(build_dashboard(&config).await.is_err());
}

#[tokio::test]
async fn test_build_dashboard_missing_file() {
    let mut config = DashboardConfig::default();
    config.accidents.path = fixture("does_not_exist.csv");

    assert!(build_dashboard(&config).await.is_err());
}
