//! End-to-end runs of the four pipelines over extraction-service XHTML.

use lohn_core::models::{Cell, LohnConfig, ParseWarning};
use lohn_core::{
    ExtractionError, LohnError, Processor, Report, SegmentError, Sheet, SourceDocument,
    XhtmlExtractor,
};
use pretty_assertions::assert_eq;

fn xhtml(pages: &[String]) -> Vec<u8> {
    let body: String = pages
        .iter()
        .map(|page| format!("<div class=\"page\"><p>{page}</p></div>"))
        .collect();
    format!(
        "<html><head><meta name=\"xmpTPg:NPages\" content=\"{}\" /></head><body>{body}</body></html>",
        pages.len()
    )
    .into_bytes()
}

fn payroll_slip(period: &str, name: &str, wages: &[&str], extra: &[&str]) -> String {
    let mut lines = vec![
        format!("Lohnservice Wendel eG Gehaltsabrechnung {period}"),
        format!("{name} Abteilung Verwaltung"),
        "Kosten- Kosten- Lohn".to_string(),
        "stelle träger art Bezeichnung Betrag".to_string(),
    ];
    lines.extend(wages.iter().map(|l| l.to_string()));
    lines.extend(
        ["GESAMTBRUTTO 3.520,00", "Arb.Zeit", "Std. Tage", "", "Soll 39,00 21,00"]
            .iter()
            .map(|l| l.to_string()),
    );
    lines.extend(extra.iter().map(|l| l.to_string()));
    lines.join("\n")
}

fn cell<'a>(sheet: &'a Sheet, row: &str, column: &str) -> &'a Cell {
    let column = sheet.column(column).unwrap();
    &sheet.row(row).unwrap().cells[column]
}

fn workbook(report: &Report) -> &lohn_core::Workbook {
    match report {
        Report::Workbook(workbook) => workbook,
        Report::Delimited(_) => panic!("expected a workbook"),
    }
}

#[test]
fn test_payroll_run() {
    let pages = vec![
        payroll_slip(
            "03.2024",
            "Anna Muster",
            &["Grundvergütung 01 3.400,00 * *", "Münchenzulage 01 120,00"],
            &[],
        ),
        payroll_slip("12.2023", "Bernd Beispiel", &[], &[]),
        payroll_slip(
            "03.2024",
            "Anna Muster",
            &["Münchenzulage 01 130,00"],
            &["Rückrechnung"],
        ),
        payroll_slip(
            "04.2024",
            "Anna Muster",
            &[],
            &["TVöD Grundvergütung x Grundvergütung S 11b Stufe 4"],
        ),
    ];
    let data = xhtml(&pages);
    let config = LohnConfig::for_year(2024);

    let output = Processor::new(&config, XhtmlExtractor::new())
        .payroll(&[SourceDocument::new("abrechnungen.xhtml", &data)])
        .unwrap();
    let workbook = workbook(&output.report);

    assert_eq!(workbook.sheets.len(), 6);

    let munich = workbook.sheet("Münchenzulage").unwrap();
    assert_eq!(munich.columns, vec!["03.2024", "04.2024", "Summe"]);
    assert_eq!(cell(munich, "Anna Muster", "03.2024").to_string(), "130,00");
    assert_eq!(cell(munich, "Anna Muster", "04.2024").to_string(), "0,00");
    assert_eq!(cell(munich, "Anna Muster", "Summe").to_string(), "130,00");
    assert!(munich.row("Bernd Beispiel").is_none());

    let labour = workbook.sheet("Arbeitsmarktzulage").unwrap();
    assert_eq!(cell(labour, "Anna Muster", "03.2024"), &Cell::zero());

    let groups = workbook.sheet("Gehaltsgruppe-Stufe").unwrap();
    assert_eq!(groups.columns, vec!["03.2024", "04.2024"]);
    assert_eq!(cell(groups, "Anna Muster", "04.2024").to_string(), "S11b/4");

    assert!(output.warnings.contains(&ParseWarning::PeriodSkipped {
        document: "abrechnungen.xhtml".to_string(),
        page: 2,
        period: "12.2023".to_string(),
        year: 2024,
    }));
    assert!(output.warnings.contains(&ParseWarning::ValueChanged {
        metric: "Münchenzulage".to_string(),
        period: "03.2024".to_string(),
        retroactive: true,
    }));
}

#[test]
fn test_payroll_single_page_scenario() {
    let pages = vec![payroll_slip(
        "03.2024",
        "Anna Muster",
        &["Münchenzulage 01 120,00 * *"],
        &[],
    )];
    let data = xhtml(&pages);
    let config = LohnConfig::for_year(2024);

    let output = Processor::new(&config, XhtmlExtractor::new())
        .payroll(&[SourceDocument::new("a.xhtml", &data)])
        .unwrap();
    let workbook = workbook(&output.report);

    let munich = workbook.sheet("Münchenzulage").unwrap();
    assert_eq!(cell(munich, "Anna Muster", "03.2024").to_string(), "120,00");
    let labour = workbook.sheet("Arbeitsmarktzulage").unwrap();
    assert_eq!(cell(labour, "Anna Muster", "03.2024").to_string(), "0,00");
    assert!(output.warnings.is_empty());
}

fn reimbursement_slip(kind: &str, amount: &str, cancelled: bool) -> String {
    let mut lines = vec![
        "Erstattungsantrag nach dem AAG",
        "Vorname Rentenversicherungsnummer",
        "",
        "Anna 12010190M123",
        "Name Pers.Nr.",
        "",
        "Muster 004711",
        kind,
    ];
    if cancelled {
        lines.push("X Stornierung");
    }
    let total = format!("Summe Erstattungsbetrag {amount} €");
    lines.push(&total);
    lines.join("\n")
}

#[test]
fn test_reimbursement_cancellation_nets_out() {
    let first = xhtml(&[reimbursement_slip("Arbeitsunfähigkeit - U1", "100,00", false)]);
    let second = xhtml(&[
        reimbursement_slip("Arbeitsunfähigkeit - U1", "100,00", true),
        reimbursement_slip("Beschäftigungsverbot - U2", "1.250,00", false),
    ]);
    let config = LohnConfig::for_year(2024);

    let output = Processor::new(&config, XhtmlExtractor::new())
        .reimbursement(&[
            SourceDocument::new("januar.xhtml", &first),
            SourceDocument::new("februar.xhtml", &second),
        ])
        .unwrap();

    let Report::Delimited(report) = &output.report else {
        panic!("expected a delimited report");
    };
    assert_eq!(
        report.records(),
        vec![
            vec!["U1"],
            vec!["Name", "file_1", "file_2", "Summe"],
            vec!["Anna Muster", "100,00", "-100,00", "0,00"],
            vec![],
            vec!["U2"],
            vec!["Name", "file_1", "file_2", "Summe"],
            vec!["Anna Muster", "0", "1250,00", "1250,00"],
        ]
    );
}

fn ledger_pages() -> Vec<String> {
    vec![
        [
            "Arbeitgeberbelastung August 2025",
            "Pers.Nr. Einheiten",
            "004711 Muster Anna 3.000,00 27.000,00",
            "SV-AG Anteil (Pflicht) 600,00 5.400,00",
            "Erst. Entg. AU 10,00",
            "aus RR: 20,00 50,00",
            "",
            "Zwischensummen 3.600,00",
            "Lohnservice Wendel eG Seite 1",
        ]
        .join("\n"),
        [
            "Pers.Nr. Einheiten",
            "004712 Beispiel Bernd 1.000,00 9.000,00",
            "Umlage 1/2 10,00 90,00",
            "Zwischensummen",
            "004711 Muster Anna 100,00 100,00",
            "Zwischensummen",
            "Lohnservice Wendel eG Seite 2",
        ]
        .join("\n"),
    ]
}

#[test]
fn test_burden_ledger_run() {
    let data = xhtml(&ledger_pages());
    let mut config = LohnConfig::for_year(2025);
    config.run.month = Some("AUGUST".to_string());

    let output = Processor::new(&config, XhtmlExtractor::new())
        .burden_ledger(&[SourceDocument::new("ag.xhtml", &data)])
        .unwrap();
    let sheet = &workbook(&output.report).sheets[0];

    assert_eq!(sheet.name, "AG Belastung");
    assert_eq!(sheet.title, "AG Belastung AUGUST 2025");
    let anna: Vec<String> = sheet
        .row("Muster Anna")
        .unwrap()
        .cells
        .iter()
        .map(Cell::to_string)
        .collect();
    assert_eq!(
        anna,
        vec![
            "3100,00", "600,00", "-30,00", "0,00", "27100,00", "5400,00", "-50,00", "0,00"
        ]
    );
    assert_eq!(cell(sheet, "Beispiel Bernd", "SV-AG (Gesamt)").to_string(), "90,00");
    assert_eq!(cell(sheet, "Summe", "Brutto (Monat)").to_string(), "4100,00");
    assert_eq!(
        output.warnings,
        vec![ParseWarning::DuplicateSubject {
            document: "ag.xhtml".to_string(),
            subject: "Muster Anna".to_string(),
        }]
    );
}

#[test]
fn test_burden_ledger_unknown_line_aborts() {
    let mut pages = ledger_pages();
    pages[1] = pages[1].replace("Umlage 1/2 10,00 90,00", "Sachbezug 10,00 90,00");
    let data = xhtml(&pages);
    let config = LohnConfig::for_year(2025);

    let err = Processor::new(&config, XhtmlExtractor::new())
        .burden_ledger(&[SourceDocument::new("ag.xhtml", &data)])
        .unwrap_err();

    match err {
        LohnError::Ledger { document, source } => {
            assert_eq!(document, "ag.xhtml");
            assert_eq!(
                source,
                ExtractionError::UnrecognizedLine {
                    index: 6,
                    line: "Sachbezug 10,00 90,00".to_string()
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_payroll_journal_run() {
    let page = [
        "Lohnjournal 2024",
        "Name E Kl",
        "004711 1 1 0 0 0 0 1.000,00 900,00",
        "Muster, Anna 200,00",
        "004711 1 1 0 0 0 0 500,50 400,00",
        "Muster, Anna 100,00",
        "004712 1 1 0 0 0 0 10,00 10,00",
        "Beispiel, Bernd 1,00",
        "Übertrag",
        "Summen: 1.510,50",
        "Negative Werte sind Rückrechnungen",
    ]
    .join("\n");
    let data = xhtml(&[page]);
    let config = LohnConfig::for_year(2024);

    let output = Processor::new(&config, XhtmlExtractor::new())
        .payroll_journal(&[SourceDocument::new("lj.xhtml", &data)])
        .unwrap();
    let sheet = &workbook(&output.report).sheets[0];

    assert_eq!(sheet.columns, vec!["Steuerbrutto", "Gesamtbrutto", "SV-AG Anteil"]);
    assert_eq!(cell(sheet, "Muster, Anna", "Gesamtbrutto").to_string(), "1500,50");
    assert_eq!(cell(sheet, "Muster, Anna", "Steuerbrutto").to_string(), "1300,00");
    assert_eq!(cell(sheet, "Muster, Anna", "SV-AG Anteil").to_string(), "300,00");
    assert_eq!(cell(sheet, "Beispiel, Bernd", "Gesamtbrutto"), &Cell::Unknown);
    assert_eq!(cell(sheet, "Summe", "Gesamtbrutto"), &Cell::Unknown);

    assert_eq!(
        output.warnings,
        vec![
            ParseWarning::DuplicateSubject {
                document: "lj.xhtml".to_string(),
                subject: "Muster, Anna".to_string(),
            },
            ParseWarning::MalformedRecord {
                document: "lj.xhtml".to_string(),
                subject: "Beispiel, Bernd".to_string(),
            },
        ]
    );
}

#[test]
fn test_payroll_journal_bad_amount_aborts() {
    let page = [
        "Name E Kl",
        "004711 1 1 0 0 0 0 1.000,00 900,00",
        "Muster, Anna 200,00",
        "004712 1 1 0 0 0 0 1,00 zwei",
        "Beispiel, Bernd 1,00",
        "Summen: 1.001,00",
        "Negative Werte sind Rückrechnungen",
    ]
    .join("\n");
    let data = xhtml(&[page]);
    let config = LohnConfig::for_year(2024);

    let err = Processor::new(&config, XhtmlExtractor::new())
        .payroll_journal(&[SourceDocument::new("lj.xhtml", &data)])
        .unwrap_err();

    match err {
        LohnError::Journal { document, source } => {
            assert_eq!(document, "lj.xhtml");
            assert_eq!(
                source,
                ExtractionError::AtLine {
                    index: 2,
                    source: Box::new(ExtractionError::Format {
                        value: "zwei".to_string()
                    }),
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_page_count_mismatch_aborts() {
    let data = br#"<html><head><meta name="xmpTPg:NPages" content="3" /></head><body><div class="page"><p>a</p></div></body></html>"#;
    let config = LohnConfig::for_year(2024);

    let err = Processor::new(&config, XhtmlExtractor::new())
        .payroll(&[SourceDocument::new("kaputt.xhtml", data)])
        .unwrap_err();

    match err {
        LohnError::Segment { document, source } => {
            assert_eq!(document, "kaputt.xhtml");
            assert_eq!(
                source,
                SegmentError::PageCountMismatch {
                    declared: 3,
                    actual: 1
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}
