//! Randomized round-trip and fuzz-style coverage.

use csvburst::{CsvConfig, RowParser};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Cursor;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFG 0123456789";

fn random_cell(rng: &mut StdRng) -> String {
    let len = rng.gen_range(0..12);
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

fn needs_quoting(cell: &str) -> bool {
    cell.contains(',') || cell.contains('"') || cell.contains('\n') || cell.contains('\r')
}

fn quote(cell: &str) -> String {
    if needs_quoting(cell) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn random_row(rng: &mut StdRng, cols: usize) -> Vec<String> {
    let mut cells: Vec<String> = (0..cols).map(|_| random_cell(rng)).collect();
    // Occasionally force a cell to require quoting, to exercise that path.
    if rng.gen_bool(0.3) && !cells.is_empty() {
        let idx = rng.gen_range(0..cells.len());
        cells[idx] = format!("{},with\"quote", cells[idx]);
    }
    cells
}

#[test]
fn random_rows_round_trip_through_decode() {
    let mut rng = StdRng::seed_from_u64(0xC5F_B0057);
    for _ in 0..200 {
        let rows_count = rng.gen_range(1..20);
        let cols = rng.gen_range(1..8);
        let rows: Vec<Vec<String>> = (0..rows_count).map(|_| random_row(&mut rng, cols)).collect();

        let mut text = String::new();
        for row in &rows {
            let serialized: Vec<String> = row.iter().map(|c| quote(c)).collect();
            text.push_str(&serialized.join(","));
            text.push('\n');
        }

        let mut parser = RowParser::from_reader(Cursor::new(text.into_bytes()), CsvConfig::new());
        for expected_row in &rows {
            assert!(parser.read_row(), "expected a row but parser yielded none");
            let decoded: Vec<String> = parser
                .row()
                .iter()
                .map(|c| c.try_as_str().unwrap().into_owned())
                .collect();
            assert_eq!(&decoded, expected_row);
        }
        assert!(!parser.read_row(), "parser yielded more rows than were written");
    }
}

#[test]
fn random_byte_streams_never_panic_and_consume_bounded_input() {
    let mut rng = StdRng::seed_from_u64(0x5EED_F00D);
    for _ in 0..500 {
        let len = rng.gen_range(0..256);
        let bytes: Vec<u8> = (0..len).map(|_| rng.gen::<u8>()).collect();

        let mut parser = RowParser::from_reader(Cursor::new(bytes.clone()), CsvConfig::new());
        let mut rows_seen = 0;
        while parser.read_row() {
            rows_seen += 1;
            for cell in parser.row().iter() {
                // Accessing the raw view and a best-effort numeric parse
                // must never panic, even on arbitrary bytes.
                let _ = cell.raw();
                let _ = cell.as_f64();
            }
            if rows_seen > len + 1 {
                panic!("parser looped without making progress on {bytes:?}");
            }
        }
    }
}

#[test]
fn yield_incomplete_row_is_consistent_under_randomized_input() {
    let mut rng = StdRng::seed_from_u64(0xABCD_1234);
    for _ in 0..100 {
        let cols = rng.gen_range(1..5);
        let row = random_row(&mut rng, cols);
        let serialized: Vec<String> = row.iter().map(|c| quote(c)).collect();
        let text = serialized.join(",");

        let dropped = RowParser::from_reader(Cursor::new(text.clone().into_bytes()), CsvConfig::new());
        let mut dropped = dropped;
        assert!(!dropped.read_row(), "row without a terminator must be dropped by default");

        let mut kept = RowParser::from_reader(
            Cursor::new(text.into_bytes()),
            CsvConfig::new().with_yield_incomplete_row(true),
        );
        assert!(kept.read_row(), "row without a terminator must be yielded when opted in");
        let decoded: Vec<String> = kept
            .row()
            .iter()
            .map(|c| c.try_as_str().unwrap().into_owned())
            .collect();
        assert_eq!(decoded, row);
    }
}
