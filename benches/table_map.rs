//! Benchmarks for table map construction and lookups
//!
//! Run with: cargo bench table_map

mod support;
use support::{make_spanning_table, make_table};

use tablegrip::TableMap;

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

// ============================================================================
// Construction
// ============================================================================

#[divan::bench(args = [4, 16, 64])]
fn build_square(bencher: divan::Bencher, size: usize) {
    let table = make_table(size, size);
    bencher.bench(|| TableMap::new(divan::black_box(&table)));
}

#[divan::bench(args = [4, 16, 64])]
fn build_spanning(bencher: divan::Bencher, size: usize) {
    let table = make_spanning_table(size, size);
    bencher.bench(|| TableMap::new(divan::black_box(&table)));
}

// ============================================================================
// Lookups
// ============================================================================

#[divan::bench(args = [16, 64])]
fn find_every_cell(bencher: divan::Bencher, size: usize) {
    let table = make_table(size, size);
    let map = TableMap::new(&table);
    let offsets: Vec<usize> = map.map.clone();
    bencher.bench(|| {
        for &offset in &offsets {
            divan::black_box(map.find_cell(offset));
        }
    });
}

#[divan::bench(args = [16, 64])]
fn trailing_column_last_row(bencher: divan::Bencher, size: usize) {
    let table = make_table(size, size);
    let map = TableMap::new(&table);
    let row_start = (size - 1) * map.width;
    let offsets: Vec<usize> = map.map[row_start..].to_vec();
    bencher.bench(|| {
        for &offset in &offsets {
            divan::black_box(map.trailing_column(offset, 1));
        }
    });
}
