//! Results markup parsing

mod common;

use common::{no_data_page, results_table};
use court_case_fetcher::portal::{ResultsPage, parse_results_html};
use court_case_fetcher::utils::constants::NO_DATA_MARKER;

#[test]
fn three_four_cell_rows_parse_in_order() {
    let html = results_table(&[
        &["1", "RFA 100/2021", "01/02/2022", "A Vs. B"],
        &["2", "RFA 101/2021", "03/04/2022", "C Vs. D"],
        &["3", "RFA 102/2021", "05/06/2022", "E Vs. F"],
    ]);

    let ResultsPage::Rows(cases) = parse_results_html(&html, NO_DATA_MARKER) else {
        panic!("expected rows");
    };

    assert_eq!(cases.len(), 3);
    assert_eq!(
        cases.iter().map(|c| c.serial_no.as_str()).collect::<Vec<_>>(),
        ["1", "2", "3"]
    );
    assert!(cases.iter().all(|c| c.corrigendum.is_empty()));
    assert_eq!(cases[2].parties, "E Vs. F");
}

#[test]
fn fifth_cell_is_corrigendum() {
    let html = results_table(&[&["1", "LPA 7/2020", "09/09/2020", "X Vs. Y", "Corrigendum dated 10/09/2020"]]);

    let cases = parse_results_html(&html, NO_DATA_MARKER).into_cases().unwrap();

    assert_eq!(cases[0].corrigendum, "Corrigendum dated 10/09/2020");
}

#[test]
fn short_rows_are_skipped() {
    let html = results_table(&[
        &["1", "FAO 3/2019"],
        &["2", "FAO 4/2019", "11/11/2019", "P Vs. Q"],
    ]);

    let cases = parse_results_html(&html, NO_DATA_MARKER).into_cases().unwrap();

    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].serial_no, "2");
}

#[test]
fn cell_text_is_trimmed() {
    let html = results_table(&[&["  1 ", "\n MAT. 5/2018\n", " 02/03/2018", "<a href=\"#\"> R </a> Vs. S "]]);

    let cases = parse_results_html(&html, NO_DATA_MARKER).into_cases().unwrap();

    assert_eq!(cases[0].serial_no, "1");
    assert_eq!(cases[0].case_number_full, "MAT. 5/2018");
    assert_eq!(cases[0].parties, "R Vs. S");
}

#[test]
fn no_data_marker_wins_over_table() {
    assert_eq!(
        parse_results_html(&no_data_page(), NO_DATA_MARKER),
        ResultsPage::NoDataMarker
    );
}

#[test]
fn custom_marker_is_honoured() {
    let html = "<html><body><table><tr><th>#</th></tr></table><p>Nothing matched</p></body></html>";

    assert_eq!(parse_results_html(html, "Nothing matched"), ResultsPage::NoDataMarker);
    assert_eq!(parse_results_html(html, NO_DATA_MARKER), ResultsPage::NoRows);
}

#[test]
fn page_without_table() {
    let html = "<html><body><div class=\"alert\">Invalid captcha</div></body></html>";

    assert_eq!(parse_results_html(html, NO_DATA_MARKER), ResultsPage::NoTable);
    assert!(parse_results_html(html, NO_DATA_MARKER).into_cases().is_none());
}

#[test]
fn header_only_table_has_no_rows() {
    assert_eq!(
        parse_results_html(&results_table(&[]), NO_DATA_MARKER),
        ResultsPage::NoRows
    );
}

#[test]
fn only_first_table_is_read() {
    let html = format!(
        "{}<table><tr><th>h</th></tr><tr><td>9</td><td>x</td><td>y</td><td>z</td></tr></table>",
        results_table(&[&["1", "CA 1/2017", "01/01/2017", "M Vs. N"]])
    );

    let cases = parse_results_html(&html, NO_DATA_MARKER).into_cases().unwrap();

    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].serial_no, "1");
}
