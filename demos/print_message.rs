//! Generic message printer driven by descriptors only
//!
//! Encodes a short stream of messages back to back, then walks each frame
//! without knowing its type up front: the header selects the descriptor and
//! every field is reached through introspection.
//!
//! Run with: RUST_LOG=sbeview=trace cargo run --example print_message

use sbeview::messages::{
    self, IncrementalRefreshEmptyBook, MatchEventIndicator, MdEntryType,
    SnapshotFullRefreshOrders,
};
use sbeview::{Entry, Error, Message, MessageHeader, Value};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

fn print_entry<B: AsRef<[u8]>>(entry: Entry<'_, B>, depth: usize) -> Result<(), Error> {
    let indent = "  ".repeat(depth);
    match entry {
        Entry::Type(field) => {
            let name = field.name();
            let present = field.present()?;
            match field.value()? {
                _ if !present => println!("{indent}{name}: <null>"),
                Value::Scalar(scalar) => println!("{indent}{name}: {scalar:?}"),
                Value::Text(text) => {
                    println!("{indent}{name}: {:?}", String::from_utf8_lossy(text))
                }
                Value::Array(array) => {
                    let items: Vec<_> = array.iter().collect();
                    println!("{indent}{name}: {items:?}");
                }
            }
        }
        Entry::Enum(field) => match field.value_name()? {
            Some(value) => println!("{indent}{}: {value}", field.name()),
            None => println!("{indent}{}: <raw {}>", field.name(), field.raw()?),
        },
        Entry::Set(field) => {
            let set: Vec<_> = field
                .choices()?
                .filter(|(_, on)| *on)
                .map(|(name, _)| name)
                .collect();
            println!("{indent}{}: {{{}}}", field.name(), set.join(", "));
        }
        Entry::Composite(mut composite) => {
            println!("{indent}{}:", composite.name());
            for i in 0..composite.fields_count() {
                print_entry(composite.field(i)?, depth + 1)?;
            }
        }
        Entry::Group(mut group) => {
            println!("{indent}{} [{}]:", group.name(), group.count());
            while group.has_next() {
                group.next()?;
                println!("{indent}  #{}", group.index());
                for i in 0..group.fields_count() {
                    print_entry(group.field(i)?, depth + 2)?;
                }
            }
        }
        Entry::Data(data) => {
            let name = data.name();
            println!("{indent}{name}: {:?}", String::from_utf8_lossy(data.value()?));
        }
    }
    Ok(())
}

fn print_message<B: AsRef<[u8]>>(msg: &mut Message<B>) -> Result<(), Error> {
    println!(
        "{} (template {}, version {}, block {})",
        msg.name(),
        msg.id(),
        msg.acting_version(),
        msg.acting_block_length()
    );
    for i in 0..msg.fields_count() {
        print_entry(msg.field(i)?, 1)?;
    }
    Ok(())
}

fn encode_stream(buf: &mut [u8]) -> Result<usize, Error> {
    let len = buf.len();
    let mut offset = 0;

    let mut msg = IncrementalRefreshEmptyBook::encode(&mut *buf, offset, len)?;
    msg.set_security_id(991)?
        .set_match_event_indicator(
            MatchEventIndicator::new()
                .with_last_trade_msg(true)
                .with_end_of_event(true),
        )?
        .set_trade_date(None)?
        .set_rpt_seq(Some(3))?;
    offset += MessageHeader::SIZE + msg.encoded_length();

    let mut msg = SnapshotFullRefreshOrders::encode(&mut *buf, offset, len)?;
    msg.set_security_id(991)?
        .set_last_rpt_seq(Some(3))?
        .set_symbol("DOLF26")?
        .set_price_band([-2_000, 2_000])?;
    {
        let mut entries = msg.no_md_entries_count(2)?;
        entries.next()?;
        entries.md_entry_px()?.set_mantissa(Some(54_125_000))?;
        entries
            .set_md_entry_size(5)?
            .set_order_id(Some(77))?
            .set_md_entry_type(MdEntryType::ImpliedBid)?
            .set_entering_firm(Some(3))?
            .set_md_entry_position_no(Some(1))?;
        entries.next()?;
        entries.md_entry_px()?.set_mantissa(None)?;
        entries
            .set_md_entry_size(10)?
            .set_order_id(None)?
            .set_md_entry_type(MdEntryType::Offer)?
            .set_entering_firm(None)?
            .set_md_entry_position_no(Some(1))?;
    }
    msg.set_memo("end of day")?;
    offset += MessageHeader::SIZE + msg.encoded_length();

    Ok(offset)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_max_level(LevelFilter::TRACE)
        .init();

    let mut buf = vec![0u8; 512];
    let total = encode_stream(&mut buf)?;
    tracing::info!(total, "encoded stream");

    let mut offset = 0;
    while offset < total {
        let header = MessageHeader::decode(&buf[offset..total])?;
        let Some(descriptor) = messages::descriptor_for(header.template_id) else {
            tracing::warn!(template_id = header.template_id, "unknown template, stopping");
            break;
        };

        let mut msg = Message::decode_with_header(&buf[..], offset, total, descriptor)?;
        print_message(&mut msg)?;

        // Printing consumed every group and data field
        offset += MessageHeader::SIZE + msg.encoded_length();
        println!();
    }

    Ok(())
}
