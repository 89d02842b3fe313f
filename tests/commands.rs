//! End-to-end text command sessions checked against exact output.

use matchbook::{CsvParser, MatchingEngine};

fn run_session(lines: &[&str]) -> String {
    let mut engine = MatchingEngine::new();
    let mut parser = CsvParser::new(&mut engine);
    let mut out = Vec::new();
    for line in lines {
        parser.process_line(line, &mut out).unwrap();
    }
    String::from_utf8(out).unwrap()
}

const EMPTY_BOOK: &str = "\
=== ORDER BOOK ===
--- ASKS (lowest first) ---
--- SPREAD ---
--- BIDS (highest first) ---
==================
";

#[test]
fn scenario_simple_cross() {
    let out = run_session(&["LIMIT,SELL,100.00,100", "LIMIT,BUY,100.00,100", "PRINT"]);
    assert_eq!(out, format!("TRADE 2 1 100.00 100\n{EMPTY_BOOK}"));
}

#[test]
fn scenario_price_improvement() {
    let out = run_session(&["LIMIT,SELL,100.00,100", "LIMIT,BUY,101.00,100", "PRINT"]);
    assert_eq!(out, format!("TRADE 2 1 100.00 100\n{EMPTY_BOOK}"));
}

#[test]
fn scenario_multi_level_sweep() {
    let out = run_session(&[
        "LIMIT,SELL,100.00,50",
        "LIMIT,SELL,101.00,50",
        "LIMIT,BUY,101.00,100",
        "PRINT",
    ]);
    assert_eq!(
        out,
        format!("TRADE 3 1 100.00 50\nTRADE 3 2 101.00 50\n{EMPTY_BOOK}")
    );
}

#[test]
fn scenario_fifo_within_level() {
    let out = run_session(&[
        "LIMIT,SELL,100.00,100",
        "LIMIT,SELL,100.00,100",
        "LIMIT,BUY,100.00,100",
        "PRINT",
    ]);
    let expected = "\
TRADE 3 1 100.00 100
=== ORDER BOOK ===
--- ASKS (lowest first) ---
      100.00  |       100  (1 orders)
--- SPREAD ---
--- BIDS (highest first) ---
==================
";
    assert_eq!(out, expected);
}

#[test]
fn scenario_market_partial_then_discard() {
    let out = run_session(&["LIMIT,SELL,100.00,30", "MARKET,BUY,,100", "PRINT"]);
    assert_eq!(out, format!("TRADE 2 1 100.00 30\n{EMPTY_BOOK}"));
}

#[test]
fn scenario_cancel_then_reject() {
    let out = run_session(&[
        "LIMIT,BUY,100.00,100",
        "CANCEL,,,,1",
        "CANCEL,,,,1",
        "PRINT",
    ]);
    assert_eq!(
        out,
        format!("CANCELLED 1\nCANCEL_REJECT 1 (not found)\n{EMPTY_BOOK}")
    );
}

#[test]
fn session_mixed_flow_with_comments_and_errors() {
    let out = run_session(&[
        "# build a small book",
        "LIMIT,BUY,99.50,10",
        "LIMIT,SELL,100.50,10",
        "",
        "LIMIT,BUY,100.50,5",
        "BOGUS,BUY,1.00,1",
        "MARKET,SELL,,5",
        "CANCEL,,,,1",
    ]);
    let expected = "\
TRADE 3 2 100.50 5
ERROR: unknown command 'BOGUS'
TRADE 1 4 99.50 5
CANCELLED 1
";
    assert_eq!(out, expected);
}

#[test]
fn session_resting_partial_shows_reduced_depth() {
    let out = run_session(&[
        "LIMIT,SELL,100.00,10",
        "LIMIT,SELL,100.00,20",
        "LIMIT,BUY,100.00,10",
        "PRINT",
    ]);
    // The exact fill of the first order leaves the level total at 20
    let expected = "\
TRADE 3 1 100.00 10
=== ORDER BOOK ===
--- ASKS (lowest first) ---
      100.00  |        20  (1 orders)
--- SPREAD ---
--- BIDS (highest first) ---
==================
";
    assert_eq!(out, expected);
}
