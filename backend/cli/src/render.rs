//! Rendering of extracted prescriptions and follow-up answers.

use rxlens_core::Prescription;

use crate::terminal_output::{render_table, supports_color, Column, DIM, RESET};

/// Render the medicine cards as a terminal table, with any prescription
/// metadata underneath.
pub fn prescription_table(prescription: &Prescription) -> String {
    let columns = vec![
        Column::right("#"),
        Column::left("Medicine"),
        Column::left("Use"),
    ];
    let rows: Vec<Vec<String>> = prescription
        .medicines
        .iter()
        .enumerate()
        .map(|(i, m)| vec![(i + 1).to_string(), m.name.clone(), m.indication.clone()])
        .collect();

    let mut out = render_table(&columns, &rows);

    let mut notes = Vec::new();
    if let Some(doctor) = &prescription.doctor_name {
        notes.push(format!("Prescribed by {doctor}"));
    }
    if let Some(patient) = &prescription.patient_name {
        notes.push(format!("Patient: {patient}"));
    }
    if let Some(date) = &prescription.date {
        notes.push(format!("Dated {date}"));
    }
    if let Some(extra) = &prescription.additional_notes {
        notes.push(extra.clone());
    }
    for note in notes {
        out.push_str(&dim_line(&note));
    }

    out
}

/// Render a follow-up answer as an indented panel under the question.
pub fn answer_panel(answer: &str) -> String {
    let mut out = String::new();
    for line in answer.lines() {
        out.push_str(&format!("  │ {line}\n"));
    }
    if answer.is_empty() {
        out.push_str("  │\n");
    }
    out
}

fn dim_line(text: &str) -> String {
    if supports_color() {
        format!("  {DIM}{text}{RESET}\n")
    } else {
        format!("  {text}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxlens_core::Medicine;

    fn prescription() -> Prescription {
        Prescription::from_medicines(vec![
            Medicine {
                name: "Amoxicillin".into(),
                indication: "infection".into(),
            },
            Medicine {
                name: "Ibuprofen".into(),
                indication: "pain".into(),
            },
        ])
    }

    #[test]
    fn table_lists_every_medicine() {
        let out = prescription_table(&prescription());
        assert!(out.contains("Amoxicillin"));
        assert!(out.contains("infection"));
        assert!(out.contains("Ibuprofen"));
    }

    #[test]
    fn table_includes_metadata_when_present() {
        let mut p = prescription();
        p.doctor_name = Some("Dr. Rao".into());
        let out = prescription_table(&p);
        assert!(out.contains("Prescribed by Dr. Rao"));
    }

    #[test]
    fn answer_panel_preserves_lines() {
        let out = answer_panel("Yes.\nTake with food.");
        assert!(out.contains("│ Yes."));
        assert!(out.contains("│ Take with food."));
    }
}
