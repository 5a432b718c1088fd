//! JSON bridge built on the introspection API
//!
//! Exports any message to `serde_json::Value` by walking its descriptors,
//! then imports the JSON back into a fresh buffer and checks that the bytes
//! match.
//!
//! Run with: cargo run --example json_bridge

use serde_json::{json, Map, Value as Json};

use sbeview::messages::{self, MdEntryType, SnapshotFullRefreshOrders};
use sbeview::{
    ArrayView, BitSet, Entry, Error, Message, MessageHeader, PrimitiveType, Scalar, Value,
};

type BoxError = Box<dyn std::error::Error>;

fn scalar_to_json(scalar: Scalar) -> Json {
    match scalar {
        Scalar::Int(v) => json!(v),
        Scalar::UInt(v) => json!(v),
        Scalar::Float(v) => json!(v),
    }
}

fn json_to_scalar(json: &Json, primitive: PrimitiveType) -> Result<Scalar, BoxError> {
    let scalar = if primitive.is_float() {
        json.as_f64().map(Scalar::Float)
    } else if primitive.is_unsigned() {
        json.as_u64().map(Scalar::UInt)
    } else {
        json.as_i64().map(Scalar::Int)
    };
    scalar.ok_or_else(|| format!("expected {} number, got {json}", primitive.name()).into())
}

fn export_entry<B: AsRef<[u8]>>(entry: Entry<'_, B>) -> Result<Json, Error> {
    Ok(match entry {
        Entry::Type(field) => {
            if !field.present()? {
                return Ok(Json::Null);
            }
            match field.value()? {
                Value::Scalar(scalar) => scalar_to_json(scalar),
                Value::Text(text) => Json::String(String::from_utf8_lossy(text).into_owned()),
                Value::Array(array) => Json::Array(array.iter().map(scalar_to_json).collect()),
            }
        }
        Entry::Enum(field) => {
            if !field.present()? {
                return Ok(Json::Null);
            }
            match field.value_name()? {
                Some(name) => json!(name),
                None => json!(field.raw()?),
            }
        }
        Entry::Set(field) => Json::Array(
            field
                .choices()?
                .filter(|(_, on)| *on)
                .map(|(name, _)| json!(name))
                .collect(),
        ),
        Entry::Composite(mut composite) => {
            let mut object = Map::new();
            for i in 0..composite.fields_count() {
                let member = composite.field(i)?;
                let name = member.name();
                object.insert(name.to_string(), export_entry(member)?);
            }
            Json::Object(object)
        }
        Entry::Group(mut group) => {
            let mut elements = Vec::with_capacity(group.count());
            while group.has_next() {
                group.next()?;
                let mut object = Map::new();
                for i in 0..group.fields_count() {
                    let field = group.field(i)?;
                    let name = field.name();
                    object.insert(name.to_string(), export_entry(field)?);
                }
                elements.push(Json::Object(object));
            }
            Json::Array(elements)
        }
        Entry::Data(data) => Json::String(String::from_utf8_lossy(data.value()?).into_owned()),
    })
}

fn export_message<B: AsRef<[u8]>>(msg: &mut Message<B>) -> Result<Json, Error> {
    let mut object = Map::new();
    for i in 0..msg.fields_count() {
        let field = msg.field(i)?;
        let name = field.name();
        object.insert(name.to_string(), export_entry(field)?);
    }
    Ok(json!({ "template": msg.name(), "fields": object }))
}

fn import_entry<B>(entry: Entry<'_, B>, json: &Json) -> Result<(), BoxError>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    match entry {
        Entry::Type(field) => {
            let ty = field.type_descriptor()?;
            match json {
                Json::Null => field.reset()?,
                Json::String(text) => field.set_value(Value::Text(text.as_bytes()))?,
                Json::Array(items) => {
                    let mut bytes = vec![0u8; items.len() * ty.primitive.size()];
                    for (item, dst) in items.iter().zip(bytes.chunks_exact_mut(ty.primitive.size())) {
                        ty.primitive.write(dst, json_to_scalar(item, ty.primitive)?);
                    }
                    field.set_value(Value::Array(ArrayView::new(&bytes, ty.primitive)))?;
                }
                number => field.set_value(Value::Scalar(json_to_scalar(number, ty.primitive)?))?,
            }
        }
        Entry::Enum(mut field) => match json {
            Json::Null => field.reset()?,
            Json::String(name) => field.set_value_name(name)?,
            raw => field.set_raw(json_to_scalar(raw, PrimitiveType::UInt64)?.as_u64())?,
        },
        Entry::Set(mut field) => {
            let desc = field.set_descriptor()?;
            let mut set = BitSet::new(desc.encoding);
            for name in json.as_array().into_iter().flatten() {
                let choice = name
                    .as_str()
                    .and_then(|name| desc.choice(name))
                    .ok_or(Error::FieldNotFound)?;
                set.set(choice.bit)?;
            }
            field.set_value(set)?;
        }
        Entry::Composite(mut composite) => {
            for i in 0..composite.fields_count() {
                let member = composite.field(i)?;
                let name = member.name();
                import_entry(member, &json[name])?;
            }
        }
        Entry::Group(mut group) => {
            let elements = json.as_array().map(Vec::as_slice).unwrap_or_default();
            group.reset_count(elements.len())?;
            for element in elements {
                group.next()?;
                for i in 0..group.fields_count() {
                    let field = group.field(i)?;
                    let name = field.name();
                    import_entry(field, &element[name])?;
                }
            }
        }
        Entry::Data(data) => data.set_str(json.as_str().unwrap_or_default())?,
    }
    Ok(())
}

fn import_message(json: &Json, buf: &mut [u8]) -> Result<usize, BoxError> {
    let template = json["template"].as_str().unwrap_or_default();
    let descriptor = messages::MESSAGES
        .iter()
        .copied()
        .find(|m| m.name == template)
        .ok_or_else(|| format!("unknown template {template:?}"))?;

    let len = buf.len();
    let mut msg = Message::wrap_and_apply_header(buf, 0, len, descriptor)?;
    for i in 0..msg.fields_count() {
        let field = msg.field(i)?;
        let name = field.name();
        import_entry(field, &json["fields"][name])?;
    }
    Ok(MessageHeader::SIZE + msg.encoded_length())
}

fn main() -> Result<(), BoxError> {
    let mut original = vec![0u8; 256];
    let size = {
        let mut msg = SnapshotFullRefreshOrders::encode(&mut original[..], 0, 256)?;
        msg.set_security_id(42)?
            .set_last_rpt_seq(None)?
            .set_symbol("VALE3")?
            .set_price_band([-150, 150])?;
        {
            let mut entries = msg.no_md_entries_count(2)?;
            entries.next()?;
            entries.md_entry_px()?.set_mantissa(Some(612_300))?;
            entries
                .set_md_entry_size(400)?
                .set_order_id(Some(9))?
                .set_md_entry_type(MdEntryType::Bid)?
                .set_entering_firm(Some(72))?
                .set_md_entry_position_no(Some(1))?;
            entries.next()?;
            entries.md_entry_px()?.set_mantissa(None)?;
            entries
                .set_md_entry_size(100)?
                .set_order_id(None)?
                .set_md_entry_type(MdEntryType::Unknown(b'Z'))?
                .set_entering_firm(None)?
                .set_md_entry_position_no(None)?;
        }
        msg.set_memo("bridged")?;
        MessageHeader::SIZE + msg.encoded_length()
    };

    let descriptor = &messages::snapshot_orders::DESCRIPTOR;
    let mut msg = Message::decode_with_header(&original[..], 0, size, descriptor)?;
    let exported = export_message(&mut msg)?;
    println!("{}", serde_json::to_string_pretty(&exported)?);

    let mut imported = vec![0u8; 256];
    let imported_size = import_message(&exported, &mut imported)?;
    println!("\nOriginal {size} bytes, re-imported {imported_size} bytes");
    println!(
        "Byte-identical: {}",
        original[..size] == imported[..imported_size]
    );

    Ok(())
}
