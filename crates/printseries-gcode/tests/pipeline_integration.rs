//! End-to-end conversion of slicer output

use std::fs;

use printseries_core::{ConversionError, LaserState, RecordKind};
use printseries_gcode::{AmplitudeTableWriter, ConversionPipeline, GcodeFileReader};
use printseries_settings::ConverterConfig;

/// Trimmed-down Cura output: preamble, first layer, start of the second
const CURA_SAMPLE: &str = "\
;FLAVOR:Marlin
;TIME:42
M140 S60
M104 S200
G28 ;Home
G92 E0
G1 Z2.0 F3000
G1 X0.1 Y20 Z0.3 F5000.0
G1 X0.1 Y200.0 Z0.3 F1500.0 E15
G92 E0
;LAYER_COUNT:2
;LAYER:0
M107
G0 F3600 X10 Y10 Z0.2
;TYPE:WALL-OUTER
G1 F1800 X20 Y10 E0.5
G1 X20 Y20 E1.0
G1 X10 Y20 E1.5
G0 F3600 X15 Y15
G1 F1800 X15 Y18 E1.6
;LAYER:1
G0 X15 Y15 Z0.4
G1 X30 Y15 E2.2
";

#[test]
fn test_cura_sample_event_sequence() {
    let series = ConversionPipeline::new().convert(CURA_SAMPLE).unwrap();

    let kinds: Vec<RecordKind> = series.records().iter().map(|r| r.kind).collect();
    use RecordKind::{Motion as M, SwitchOff as Off, SwitchOn as On};
    assert_eq!(
        kinds,
        vec![M, On, M, M, M, Off, M, On, M, Off, M, On, M]
    );

    let lasers: Vec<u8> = series.rows().iter().map(|r| r.laser.as_u8()).collect();
    assert_eq!(lasers, vec![0, 1, 1, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1]);

    // The series starts at the travel move right before the first deposit
    let first = &series.records()[0];
    assert_eq!(first.line_number, 14);
    assert_eq!(first.time, 0.0);
    assert_eq!((first.position.x, first.position.y, first.position.z), (10.0, 10.0, 0.2));
}

#[test]
fn test_cura_sample_timing() {
    let series = ConversionPipeline::new().convert(CURA_SAMPLE).unwrap();
    let records = series.records();

    // 10 mm at F1800 (30 mm/s)
    assert!((records[2].dt - 10.0 / 30.0).abs() < 1e-9);
    // Travel at F3600 (60 mm/s) over the diagonal back to (15, 15)
    assert!((records[6].dt - 50f64.sqrt() / 60.0).abs() < 1e-9);
    assert_eq!(records[6].feed_rate, 3600.0);

    for record in records.iter().filter(|r| r.kind.is_switch()) {
        assert_eq!(record.dt, 0.001);
    }

    let expected = 5.0 * 0.001
        + 30.0 / 30.0
        + 50f64.sqrt() / 60.0
        + 3.0 / 30.0
        + 9.04f64.sqrt() / 30.0
        + 15.0 / 30.0;
    assert!((series.summary().total_time - expected).abs() < 1e-9);
}

#[test]
fn test_cura_sample_summary() {
    let series = ConversionPipeline::new().convert(CURA_SAMPLE).unwrap();
    let summary = series.summary();

    assert_eq!(summary.input_lines, 23);
    assert_eq!(summary.preamble_lines, 11);
    assert_eq!(summary.motion_records, 9);
    assert_eq!(summary.setup_records, 1);
    assert_eq!(summary.switch_on_events, 3);
    assert_eq!(summary.switch_off_events, 2);
    assert_eq!(summary.output_rows, 13);
    assert!(summary.laser_duty_cycle() > 0.5);
    assert!((summary.extrusion_distance - 48.0).abs() < 1e-9);
}

#[test]
fn test_omitted_extrusion_counts_as_retraction() {
    let program = ";LAYER:0\nG1 F600 X1 E1\nG1 X2 E2\nG1 X3\nG1 X4 E3\n";
    let series = ConversionPipeline::new().convert(program).unwrap();

    let laser: Vec<LaserState> = series.records().iter().map(|r| r.laser).collect();
    assert_eq!(laser.last(), Some(&LaserState::On));
    assert!(series
        .records()
        .iter()
        .any(|r| r.kind == RecordKind::SwitchOff && r.line_number == 3));
}

#[test]
fn test_missing_marker_is_reported() {
    let err = ConversionPipeline::new()
        .convert("G28\nG1 F1200 X1 E1\n")
        .unwrap_err();
    assert_eq!(
        err,
        ConversionError::MissingLayerMarker {
            marker: "LAYER:0".to_string()
        }
    );
}

#[test]
fn test_program_without_deposition_is_rejected() {
    let err = ConversionPipeline::new()
        .convert(";LAYER:0\nG0 F3000 X10 Y10\nG0 X20 Y20\n")
        .unwrap_err();
    assert_eq!(err, ConversionError::NoExtrusionTransition);
}

#[test]
fn test_malformed_field_is_reported() {
    let err = ConversionPipeline::new()
        .convert(";LAYER:0\nG1 F1200 X--1 E1\n")
        .unwrap_err();
    assert!(matches!(
        err,
        ConversionError::MalformedNumericField { line_number: 2, .. }
    ));
}

#[test]
fn test_custom_marker_from_config() {
    let mut config = ConverterConfig::default();
    config.parsing.layer_marker = "START_PRINT".to_string();

    let program = "G28\n;START_PRINT\nG1 F600 X5\nG1 X10 E1\n";
    let series = ConversionPipeline::from_config(&config)
        .convert(program)
        .unwrap();
    assert_eq!(series.summary().preamble_lines, 1);
    assert_eq!(series.summary().switch_on_events, 1);
}

#[test]
fn test_file_to_table() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("part.gcode");
    fs::write(&input, CURA_SAMPLE).unwrap();

    let config = ConverterConfig::default();
    let program = GcodeFileReader::new(&input).unwrap().read_all().unwrap();
    let series = ConversionPipeline::from_config(&config)
        .convert(&program)
        .unwrap();

    let output = config.output_path_for(&input);
    assert_eq!(output, dir.path().join("part_event_series.inp"));
    AmplitudeTableWriter::from_config(&config)
        .write_to_file(&series.rows(), &output)
        .unwrap();

    let table = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 13);
    assert_eq!(lines[0], "0.0,10.0,10.0,0.2,0");
    assert_eq!(lines[1], "0.001,10.0,10.0,0.2,1");
    assert!(lines.iter().all(|l| l.split(',').count() == 5));
}
