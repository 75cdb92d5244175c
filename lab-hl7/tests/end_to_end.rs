use lab_core::{CanonicalStatus, ClassifierStatus, LabError};
use lab_hl7::encoding::decode_legacy_western_text;
use lab_hl7::parse_message_str;

const FERRITIN_MESSAGE: &str = "MSH|^~\\&|LAB|FAC|||20230115143000||ORU^R01|123|P|2.5\n\
PID|||X123||Doe^John||19800101|M\n\
OBR|1||||||20230115090000\n\
OBX|1|NM|FERR^Ferritin||35|ng/mL|22-322||||F";

#[test]
fn ferritin_below_ideal_range() {
    let parsed = parse_message_str(FERRITIN_MESSAGE).unwrap();

    assert_eq!(parsed.observations.len(), 1);
    let ferritin = &parsed.observations[0];
    assert_eq!(ferritin.code, "FERR");
    assert_eq!(ferritin.value, "35");
    assert_eq!(ferritin.status, Some(ClassifierStatus::BelowIdealRange));
    assert_eq!(ferritin.ideal_range.as_deref(), Some("70-100"));
    assert_eq!(
        ferritin.specimen_collection_time.as_deref(),
        Some("2023-01-15T09:00:00")
    );
    assert_eq!(ferritin.canonical_status(), CanonicalStatus::Suboptimal);
    assert_eq!(parsed.abnormal_observations().count(), 1);
}

#[test]
fn lab_abnormality_wins_over_ideal_range() {
    let raw = "OBX|1|NM|FERR^Ferritin||15|ng/mL|22-322||||F";
    let parsed = parse_message_str(raw).unwrap();
    let ferritin = parsed.observation("ferr").unwrap();
    assert_eq!(ferritin.status, Some(ClassifierStatus::BelowRefRange));
    assert_eq!(ferritin.ideal_range, None);
}

#[test]
fn message_without_patient() {
    let raw = "MSH|^~\\&|LAB|FAC|||20230115143000||ORU^R01|123|P|2.5\rOBX|1|NM|NA^Natrium||140";
    let parsed = parse_message_str(raw).unwrap();
    assert!(parsed.patient.is_none());
    assert_eq!(parsed.total_segments, 2);
    assert_eq!(parsed.observations[0].status, None);
}

#[test]
fn whitespace_only_message_is_rejected() {
    let err = parse_message_str("\r\n   \n\t\r").unwrap_err();
    assert!(matches!(err, LabError::EmptyMessage));
    assert_eq!(err.to_string(), "Empty HL7 message");
}

#[test]
fn short_and_unknown_segments_degrade() {
    let raw = "OBX\nZZZ|1\nOBX|1\nNTE\nPID";
    let parsed = parse_message_str(raw).unwrap();
    assert_eq!(parsed.total_segments, 5);
    assert_eq!(parsed.observations.len(), 2);
    assert_eq!(parsed.observations[0].code, "");
    assert_eq!(parsed.observations[1].set_id, 1);
    assert!(parsed.notes.is_empty());
    let patient = parsed.patient.unwrap();
    assert_eq!(patient.id, "");
    assert_eq!(patient.birth_date, "");
}

#[test]
fn legacy_encoded_message() {
    let bytes = b"OBX|1|NM|ZN^Zink im Vollblut||8|\xb5mol/L|5-9||||F\rNTE|1||Gr\xfc\xdfe";
    let text = decode_legacy_western_text(bytes);
    let parsed = parse_message_str(&text).unwrap();
    let zinc = &parsed.observations[0];
    assert_eq!(zinc.units.as_deref(), Some("\u{b5}mol/L"));
    assert_eq!(zinc.notes, vec!["Grüße"]);
}
