//! HL7 v2 lab message to `ParsedResult` converter.

use lab_core::{
    classify, cortisol_range_at, hour_from_timestamp, Address, LabError, MessageHeader,
    MessageType, NoteSegment, Observation, ObservationRequest, Order, ParseOptions, ParsedResult,
    Patient, Provider, ReferenceTable, CORTISOL_CODE,
};
use tracing::{debug, warn};

pub mod encoding;
pub mod prompt;
pub mod report;

use encoding::repair_known_mojibake;

/// Sub-test codes drawn at different times of day for the same analyte.
const CORTISOL_SUBTESTS: [&str; 2] = ["CORT8", "CORT17"];
const CORTISOL_DISPLAY: &str = "Cortisol Diurnal";

/// Parse a message with the built-in reference table.
pub fn parse_message_str(raw: &str) -> Result<ParsedResult, LabError> {
    parse_message(raw, &ParseOptions::default())
}

/// Parse a raw HL7 v2 message. Fails only when no non-blank line remains.
pub fn parse_message(raw: &str, options: &ParseOptions) -> Result<ParsedResult, LabError> {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    let cleaned = if options.repair_mojibake {
        repair_known_mojibake(&normalized).into_owned()
    } else {
        normalized
    };

    let lines: Vec<&str> = cleaned
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        return Err(LabError::EmptyMessage);
    }

    let mut scan = ScanState::new(options.reference_table());

    for line in &lines {
        let fields: Vec<&str> = line.split('|').collect();
        match fields[0] {
            "MSH" => scan.handle_header(&fields),
            "PID" => scan.handle_patient(&fields),
            "ORC" => scan.handle_order(&fields),
            "OBR" => scan.handle_request(&fields),
            "OBX" => scan.handle_observation(&fields),
            "NTE" => scan.handle_note(&fields),
            other => {
                debug!(segment = other, "Skipping unsupported segment");
                scan.close_observation();
            }
        }
    }

    Ok(scan.finalize(lines.len()))
}

/// Accumulator threaded through one pass over the segments.
struct ScanState<'a> {
    table: &'a ReferenceTable,
    header: Option<MessageHeader>,
    patient: Option<Patient>,
    orders: Vec<Order>,
    requests: Vec<ObservationRequest>,
    observations: Vec<Observation>,
    notes: Vec<NoteSegment>,
    /// Index of the observation that trailing NTE segments attach to.
    open_observation: Option<usize>,
    collection_time: Option<String>,
    cortisol_merges: usize,
}

impl<'a> ScanState<'a> {
    fn new(table: &'a ReferenceTable) -> Self {
        Self {
            table,
            header: None,
            patient: None,
            orders: Vec::new(),
            requests: Vec::new(),
            observations: Vec::new(),
            notes: Vec::new(),
            open_observation: None,
            collection_time: None,
            cortisol_merges: 0,
        }
    }

    fn close_observation(&mut self) {
        self.open_observation = None;
    }

    fn handle_header(&mut self, fields: &[&str]) {
        self.close_observation();
        let message_type = field(fields, 9);

        self.header = Some(MessageHeader {
            sending_application: field(fields, 3).to_string(),
            sending_facility: field(fields, 4).to_string(),
            message_datetime: format_datetime(field(fields, 7)),
            message_type: MessageType {
                id: component(message_type, 0).to_string(),
                trigger: component(message_type, 1).to_string(),
            },
            control_id: field(fields, 10).to_string(),
            processing_id: field(fields, 11).to_string(),
            version: field(fields, 12).to_string(),
            charset: non_empty(field(fields, 18)),
        });
    }

    fn handle_patient(&mut self, fields: &[&str]) {
        self.close_observation();
        let identifiers = field(fields, 3);
        let name = field(fields, 5);
        let address = field(fields, 11);

        self.patient = Some(Patient {
            id: field(fields, 2).to_string(),
            assigning_authority: non_empty(component(identifiers, 5)),
            last_name: component(name, 0).to_string(),
            first_name: component(name, 1).to_string(),
            birth_date: format_date(field(fields, 7)),
            sex: field(fields, 8).to_string(),
            phone: non_empty(field(fields, 13)),
            address: (!address.is_empty()).then(|| Address {
                street: non_empty(component(address, 0)),
                city: non_empty(component(address, 2)),
                state: non_empty(component(address, 3)),
                zip: non_empty(component(address, 4)),
                country: non_empty(component(address, 5)),
            }),
        });
    }

    fn handle_order(&mut self, fields: &[&str]) {
        self.close_observation();
        self.orders.push(Order {
            placer_order_number: non_empty(component(field(fields, 2), 0)),
            filler_order_number: non_empty(component(field(fields, 3), 0)),
            order_control: field(fields, 1).to_string(),
            order_datetime: non_empty(component(field(fields, 7), 3))
                .map(|dt| format_datetime(&dt)),
            ordering_provider: provider(field(fields, 12)),
        });
    }

    fn handle_request(&mut self, fields: &[&str]) {
        self.close_observation();
        let panel = field(fields, 4);
        let request = ObservationRequest {
            panel_code: component(panel, 0).to_string(),
            panel_text: non_empty(component(panel, 1)),
            request_datetime: non_empty(&format_datetime(field(fields, 7))),
            result_datetime: non_empty(component(field(fields, 27), 3))
                .map(|dt| format_datetime(&dt)),
            ordering_provider: provider(field(fields, 16)),
        };

        self.collection_time = request.request_datetime.clone();
        self.requests.push(request);
    }

    fn handle_observation(&mut self, fields: &[&str]) {
        let coding = field(fields, 3);
        let mut code = component(coding, 0).to_string();
        let mut text = repair_known_mojibake(component(coding, 1)).into_owned();

        let is_cortisol = CORTISOL_SUBTESTS
            .iter()
            .any(|subtest| code.eq_ignore_ascii_case(subtest));
        if is_cortisol {
            self.cortisol_merges += 1;
            if self.cortisol_merges > 1 {
                warn!(
                    merges = self.cortisol_merges,
                    "Several cortisol sub-tests merged into one code"
                );
            }
            code = CORTISOL_CODE.to_string();
            text = CORTISOL_DISPLAY.to_string();
        }

        let mut observation = Observation {
            set_id: parse_set_id(field(fields, 1)),
            value_type: field(fields, 2).to_string(),
            code,
            text,
            system: non_empty(component(coding, 2)),
            value: field(fields, 5).to_string(),
            units: non_empty(component(field(fields, 6), 0)),
            reference_range: non_empty(field(fields, 7)),
            abnormal_flags: non_empty(field(fields, 8)),
            result_status: field(fields, 11).to_string(),
            observation_datetime: non_empty(field(fields, 14))
                .map(|dt| format_datetime(&dt)),
            specimen_collection_time: self.collection_time.clone(),
            ..Observation::default()
        };

        if is_cortisol {
            if let Some(range) = observation
                .timing_reference()
                .and_then(hour_from_timestamp)
                .and_then(cortisol_range_at)
            {
                observation.reference_range = Some(range.standard_range_string());
            }
        }

        let classification = classify(&observation, self.table);
        observation.apply(classification);

        self.observations.push(observation);
        self.open_observation = Some(self.observations.len() - 1);
    }

    fn handle_note(&mut self, fields: &[&str]) {
        let text = repair_known_mojibake(field(fields, 3)).into_owned();
        if text.is_empty() {
            return;
        }

        match self
            .open_observation
            .and_then(|index| self.observations.get_mut(index))
        {
            Some(observation) => observation.notes.push(text),
            None => self.notes.push(NoteSegment {
                set_id: parse_set_id(field(fields, 1)),
                text,
            }),
        }
    }

    fn finalize(self, total_segments: usize) -> ParsedResult {
        let message_type = self
            .header
            .as_ref()
            .map(|header| header.message_type.id.clone())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        debug!(
            total_segments,
            observations = self.observations.len(),
            requests = self.requests.len(),
            "Parsed HL7 message"
        );

        ParsedResult {
            header: self.header,
            patient: self.patient,
            orders: self.orders,
            observation_requests: self.requests,
            observations: self.observations,
            notes: self.notes,
            message_type,
            total_segments,
        }
    }
}

/// Positional field lookup; missing fields are empty.
fn field<'f>(fields: &[&'f str], index: usize) -> &'f str {
    fields.get(index).copied().unwrap_or_default()
}

/// Positional `^` component lookup; missing components are empty.
fn component(value: &str, index: usize) -> &str {
    value.split('^').nth(index).unwrap_or_default()
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn provider(value: &str) -> Option<Provider> {
    if value.is_empty() {
        return None;
    }
    Some(Provider {
        id: non_empty(component(value, 0)),
        last: non_empty(component(value, 1)),
        first: non_empty(component(value, 2)),
        authority: non_empty(component(value, 7)),
    })
}

/// Leading decimal digits, 0 when there are none.
fn parse_set_id(value: &str) -> u32 {
    let digits: String = value
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

/// `YYYYMMDD` to `YYYY-MM-DD`; other shapes are returned unchanged.
pub fn format_date(value: &str) -> String {
    if value.len() != 8 {
        return value.to_string();
    }
    match (value.get(0..4), value.get(4..6), value.get(6..8)) {
        (Some(year), Some(month), Some(day)) => format!("{year}-{month}-{day}"),
        _ => value.to_string(),
    }
}

/// `YYYYMMDD[HHMMSS]` to `YYYY-MM-DDTHH:MM:SS`, or to the date alone when
/// the time part is shorter than six digits.
pub fn format_datetime(value: &str) -> String {
    if value.len() < 8 {
        return value.to_string();
    }
    let (Some(date), Some(time)) = (value.get(..8), value.get(8..)) else {
        return value.to_string();
    };

    match (time.get(0..2), time.get(2..4), time.get(4..6)) {
        (Some(hh), Some(mm), Some(ss)) => format!("{}T{hh}:{mm}:{ss}", format_date(date)),
        _ => format_date(date),
    }
}
