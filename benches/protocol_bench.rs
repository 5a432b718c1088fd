//! Criterion benchmarks for sbeview
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sbeview::messages::{
    empty_book, snapshot_orders, IncrementalRefreshEmptyBook, MatchEventIndicator, MdEntryType,
    SnapshotFullRefreshOrders,
};
use sbeview::{Entry, Message, MessageHeader};

fn encode_empty_book(buf: &mut [u8], security_id: u64) -> usize {
    let len = buf.len();
    let mut msg = IncrementalRefreshEmptyBook::encode(buf, 0, len).unwrap();
    msg.set_security_id(security_id)
        .unwrap()
        .set_match_event_indicator(
            MatchEventIndicator::new()
                .with_last_trade_msg(true)
                .with_end_of_event(true),
        )
        .unwrap()
        .set_trade_date(Some(20_000))
        .unwrap()
        .set_rpt_seq(Some(1))
        .unwrap();
    MessageHeader::SIZE + msg.encoded_length()
}

fn encode_snapshot(buf: &mut [u8], entries: usize) -> usize {
    let len = buf.len();
    let mut msg = SnapshotFullRefreshOrders::encode(buf, 0, len).unwrap();
    msg.set_security_id(100_200)
        .unwrap()
        .set_last_rpt_seq(Some(9))
        .unwrap()
        .set_symbol("WINZ25")
        .unwrap()
        .set_price_band([-500, 500])
        .unwrap();
    {
        let mut group = msg.no_md_entries_count(entries).unwrap();
        for i in 0..entries {
            group.next().unwrap();
            group
                .md_entry_px()
                .unwrap()
                .set_mantissa(Some(250_000 + i as i64))
                .unwrap();
            group
                .set_md_entry_size(100)
                .unwrap()
                .set_order_id(Some(i as u64))
                .unwrap()
                .set_md_entry_type(if i % 2 == 0 { MdEntryType::Bid } else { MdEntryType::Offer })
                .unwrap()
                .set_entering_firm(Some(8))
                .unwrap()
                .set_md_entry_position_no(Some(i as u32))
                .unwrap();
        }
    }
    msg.set_memo("snapshot").unwrap();
    MessageHeader::SIZE + msg.encoded_length()
}

fn bench_empty_book(c: &mut Criterion) {
    let mut buf = vec![0u8; 64];

    c.bench_function("empty_book_encode", |b| {
        b.iter(|| {
            let size = encode_empty_book(black_box(&mut buf), black_box(991));
            black_box(size);
        });
    });

    let size = encode_empty_book(&mut buf, 991);
    let frame = buf[..size].to_vec();

    c.bench_function("empty_book_decode", |b| {
        b.iter(|| {
            let mut msg = IncrementalRefreshEmptyBook::decode(black_box(&frame[..]), 0, size).unwrap();
            black_box(msg.security_id().unwrap());
            black_box(msg.match_event_indicator().unwrap());
            black_box(msg.rpt_seq().unwrap());
        });
    });
}

fn bench_snapshot_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");
    let mut buf = vec![0u8; 16 * 1024];

    for entries in [1usize, 10, 100] {
        group.bench_with_input(BenchmarkId::new("encode", entries), &entries, |b, &entries| {
            b.iter(|| {
                let size = encode_snapshot(black_box(&mut buf), entries);
                black_box(size);
            });
        });

        let size = encode_snapshot(&mut buf, entries);
        let frame = buf[..size].to_vec();

        group.bench_with_input(BenchmarkId::new("decode", entries), &frame, |b, frame| {
            b.iter(|| {
                let mut msg = SnapshotFullRefreshOrders::decode(black_box(&frame[..]), 0, size).unwrap();
                let mut total = 0i64;
                {
                    let mut group = msg.no_md_entries().unwrap();
                    while group.has_next() {
                        group.next().unwrap();
                        total += group.md_entry_size().unwrap();
                    }
                }
                black_box(msg.memo().unwrap());
                black_box(total);
            });
        });

        group.bench_with_input(BenchmarkId::new("skip", entries), &frame, |b, frame| {
            b.iter(|| {
                let mut msg = Message::decode_with_header(
                    black_box(&frame[..]),
                    0,
                    size,
                    &snapshot_orders::DESCRIPTOR,
                )
                .unwrap();
                black_box(msg.skip().unwrap());
            });
        });
    }

    group.finish();
}

fn bench_dynamic_access(c: &mut Criterion) {
    let mut buf = vec![0u8; 64];
    let size = encode_empty_book(&mut buf, 991);

    c.bench_function("field_by_name", |b| {
        b.iter(|| {
            let mut msg = Message::decode_with_header(
                &buf[..],
                0,
                size,
                &empty_book::DESCRIPTOR,
            )
            .unwrap();
            if let Entry::Type(field) = msg.field_by_name(black_box("securityID")).unwrap() {
                black_box(field.value().unwrap());
            }
        });
    });

    c.bench_function("field_by_index", |b| {
        b.iter(|| {
            let mut msg = Message::decode_with_header(
                &buf[..],
                0,
                size,
                &empty_book::DESCRIPTOR,
            )
            .unwrap();
            if let Entry::Type(field) = msg.field(black_box(0)).unwrap() {
                black_box(field.value().unwrap());
            }
        });
    });
}

fn bench_batch_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_operations");

    for batch_size in [10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("empty_book_encode_batch", batch_size),
            batch_size,
            |b, &batch_size| {
                let mut buf = vec![0u8; 64];
                b.iter(|| {
                    for i in 0..batch_size {
                        let size = encode_empty_book(black_box(&mut buf), black_box(i as u64));
                        black_box(size);
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_empty_book,
    bench_snapshot_sizes,
    bench_dynamic_access,
    bench_batch_operations
);
criterion_main!(benches);
