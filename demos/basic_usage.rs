//! Basic usage example for sbeview
//!
//! Run with: cargo run --example basic_usage

use sbeview::messages::{
    snapshot_orders, IncrementalRefreshEmptyBook, MatchEventIndicator, MdEntryType,
    SnapshotFullRefreshOrders,
};
use sbeview::{Entry, Error, Message, MessageHeader};

fn main() -> Result<(), Error> {
    println!("sbeview Basic Usage Example");
    println!("===========================");

    // Example 1: fixed block only
    println!("\n1. Empty Book Message:");
    {
        let mut buf = [0u8; 64];
        let size = {
            let mut msg = IncrementalRefreshEmptyBook::encode(&mut buf[..], 0, 64)?;
            msg.set_security_id(991)?
                .set_match_event_indicator(
                    MatchEventIndicator::new()
                        .with_last_trade_msg(true)
                        .with_last_quote_msg(true),
                )?
                .set_trade_date(Some(20_100))?
                .set_rpt_seq(None)?;
            MessageHeader::SIZE + msg.encoded_length()
        };

        println!("  Encoded {} bytes: {:02x?}", size, &buf[..size]);

        let mut msg = IncrementalRefreshEmptyBook::decode(&buf[..], 0, size)?;
        let flags = msg.match_event_indicator()?;
        println!(
            "  Decoded: securityID={}, flags={:#04x} (trade={}, quote={}), tradeDate={:?}, rptSeq={:?}",
            msg.security_id()?,
            flags.raw(),
            flags.last_trade_msg(),
            flags.last_quote_msg(),
            msg.trade_date()?,
            msg.rpt_seq()?
        );
    }

    // Example 2: repeating group and variable-length data
    println!("\n2. Order Book Snapshot:");
    let mut buf = [0u8; 256];
    let size = {
        let mut msg = SnapshotFullRefreshOrders::encode(&mut buf[..], 0, 256)?;
        msg.set_security_id(42)?
            .set_last_rpt_seq(Some(7))?
            .set_symbol("PETR4")?
            .set_price_band([-100, 100])?;
        {
            let mut entries = msg.no_md_entries_count(2)?;
            entries.next()?;
            entries.md_entry_px()?.set_mantissa(Some(251_500))?;
            entries
                .set_md_entry_size(300)?
                .set_order_id(Some(1001))?
                .set_md_entry_type(MdEntryType::Bid)?
                .set_entering_firm(Some(8))?
                .set_md_entry_position_no(Some(1))?;

            entries.next()?;
            entries.md_entry_px()?.set_mantissa(Some(252_000))?;
            entries
                .set_md_entry_size(50)?
                .set_order_id(Some(1002))?
                .set_md_entry_type(MdEntryType::Offer)?
                .set_entering_firm(None)?
                .set_md_entry_position_no(Some(1))?;
        }
        msg.set_memo("opening auction")?;
        MessageHeader::SIZE + msg.encoded_length()
    };
    println!("  Encoded {} bytes", size);

    {
        let mut msg = SnapshotFullRefreshOrders::decode(&buf[..], 0, size)?;
        println!(
            "  securityID={}, symbol={}, exchange={}, band={:?}",
            msg.security_id()?,
            msg.symbol()?.to_owned(),
            msg.security_exchange()?.to_owned(),
            msg.price_band()?
        );
        {
            let mut entries = msg.no_md_entries()?;
            println!("  {} entries:", entries.count());
            while entries.has_next() {
                entries.next()?;
                let mut px = entries.md_entry_px()?;
                let exponent = px.exponent()? as i32;
                let price = px.mantissa()?.map(|m| m as f64 * 10f64.powi(exponent));
                println!(
                    "    {} {} @ {:?} (order {:?}, firm {:?})",
                    entries.md_entry_type()?,
                    entries.md_entry_size()?,
                    price,
                    entries.order_id()?,
                    entries.entering_firm()?
                );
            }
        }
        println!("  memo={:?}", std::str::from_utf8(msg.memo()?).unwrap_or("?"));
    }

    // Example 3: rewind and re-read the variable part
    println!("\n3. Rewind:");
    {
        let mut msg = SnapshotFullRefreshOrders::decode(&buf[..], 0, size)?;
        let skipped = msg.skip()?;
        println!("  Skipped to end: body is {} bytes", skipped);
        msg.rewind();
        println!("  Rewound to position {}", msg.position());
        let count = msg.no_md_entries()?.count();
        println!("  Re-read group count: {}", count);
    }

    // Example 4: introspection by name
    println!("\n4. Introspection:");
    {
        let mut msg = Message::decode_with_header(&buf[..], 0, size, &snapshot_orders::DESCRIPTOR)?;
        println!("  Message {} (template {})", msg.name(), msg.id());
        if let Entry::Type(field) = msg.field_by_name("symbol")? {
            println!("  symbol -> {:?}", field.value()?);
        }
    }

    // Example 5: error handling
    println!("\n5. Error Handling:");
    {
        let mut small = [0u8; 12];
        match IncrementalRefreshEmptyBook::encode(&mut small[..], 0, 12) {
            Ok(_) => println!("  Unexpected success"),
            Err(e) => println!("  Short buffer: {}", e),
        }

        match IncrementalRefreshEmptyBook::decode(&buf[..], 0, size) {
            Ok(_) => println!("  Unexpected success"),
            Err(e) => println!("  Wrong template: {}", e),
        }

        let mut msg = SnapshotFullRefreshOrders::decode(&buf[..], 0, size)?;
        let mut entries = msg.no_md_entries()?;
        entries.next()?;
        entries.next()?;
        match entries.next() {
            Ok(_) => println!("  Unexpected success"),
            Err(e) => println!("  Past the end: {}", e),
        }
    }

    println!("\nAll examples completed successfully!");
    Ok(())
}
