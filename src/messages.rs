//! Sample market data schema
//!
//! Descriptors and typed wrappers for a small market data schema, written the
//! way a generator would emit them. The wrappers are thin: every accessor goes
//! through [`Message`], [`Group`] and [`Composite`], so the same buffers can be
//! walked dynamically through the descriptor tables.

use core::fmt;
use core::ops::{Deref, DerefMut};
use core::str::FromStr;

use crate::bitset::{BitSet, ChoiceSet};
use crate::composite::Composite;
use crate::enums::SbeEnum;
use crate::error::{Error, Result};
use crate::group::Group;
use crate::message::Message;
use crate::primitive::{Primitive, PrimitiveType, Scalar};
use crate::schema::{
    require_field, Choice, CompositeDescriptor, Constant, DataDescriptor, EnumDescriptor,
    FieldDescriptor, FieldKind, GroupDescriptor, MessageDescriptor, SchemaDescriptor,
    SetDescriptor, TypeDescriptor, ValidValue,
};
use crate::types::ScalarField;

/// Schema id and current version
pub const SCHEMA: SchemaDescriptor = SchemaDescriptor {
    package: "marketdata",
    id: 2,
    version: 2,
};

/// Primitive types used by the schema
pub mod types {
    use super::*;

    /// `uint8`
    pub const UINT8: TypeDescriptor = TypeDescriptor::new("uint8", PrimitiveType::UInt8, 1);
    /// `uint16`
    pub const UINT16: TypeDescriptor = TypeDescriptor::new("uint16", PrimitiveType::UInt16, 1);
    /// `uint32`
    pub const UINT32: TypeDescriptor = TypeDescriptor::new("uint32", PrimitiveType::UInt32, 1);
    /// `SecurityID`
    pub const SECURITY_ID: TypeDescriptor =
        TypeDescriptor::new("SecurityID", PrimitiveType::UInt64, 1);
    /// `LocalMktDate`, days since epoch
    pub const LOCAL_MKT_DATE: TypeDescriptor =
        TypeDescriptor::new("LocalMktDate", PrimitiveType::UInt16, 1);
    /// `SeqNum`, zero means absent
    pub const SEQ_NUM: TypeDescriptor = TypeDescriptor::new("SeqNum", PrimitiveType::UInt32, 1)
        .with_null(Scalar::UInt(0));
    /// `Symbol`
    pub const SYMBOL: TypeDescriptor = TypeDescriptor::new("Symbol", PrimitiveType::Char, 8);
    /// `PriceBand`, low and high limits in ticks
    pub const PRICE_BAND: TypeDescriptor =
        TypeDescriptor::new("PriceBand", PrimitiveType::Int32, 2);
    /// `SecurityExchange`
    pub const SECURITY_EXCHANGE: TypeDescriptor =
        TypeDescriptor::new("SecurityExchange", PrimitiveType::Char, 4);
    /// `Quantity`
    pub const QUANTITY: TypeDescriptor = TypeDescriptor::new("Quantity", PrimitiveType::Int64, 1);
    /// `OrderID`
    pub const ORDER_ID: TypeDescriptor = TypeDescriptor::new("OrderID", PrimitiveType::UInt64, 1);
    /// `Firm`
    pub const FIRM: TypeDescriptor = TypeDescriptor::new("Firm", PrimitiveType::UInt32, 1);
    /// `Int64` mantissa
    pub const MANTISSA: TypeDescriptor = TypeDescriptor::new("Int64", PrimitiveType::Int64, 1);
    /// `Int8` exponent
    pub const EXPONENT: TypeDescriptor = TypeDescriptor::new("Int8", PrimitiveType::Int8, 1);
    /// `varData` element
    pub const VAR_DATA: TypeDescriptor = TypeDescriptor::new("varData", PrimitiveType::Char, 0);
}

/// Composites used by the schema
pub mod composites {
    use super::*;

    const GROUP_SIZE_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("blockLength", 0, 0, FieldKind::Type(&types::UINT16)),
        FieldDescriptor::new("numInGroup", 0, 2, FieldKind::Type(&types::UINT8)),
    ];
    /// Group dimension: `uint16` block length, `uint8` count
    pub const GROUP_SIZE_ENCODING: CompositeDescriptor =
        CompositeDescriptor::new("groupSizeEncoding", GROUP_SIZE_FIELDS);

    const VAR_STRING8_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("length", 0, 0, FieldKind::Type(&types::UINT8)),
        FieldDescriptor::new("varData", 0, 1, FieldKind::Type(&types::VAR_DATA)),
    ];
    /// `uint8` length prefixed text
    pub const VAR_STRING8: CompositeDescriptor =
        CompositeDescriptor::new("varString8", VAR_STRING8_FIELDS);

    /// `PriceOptional` members
    pub const PRICE_OPTIONAL_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("mantissa", 0, 0, FieldKind::Type(&types::MANTISSA)).optional(),
        FieldDescriptor::new("exponent", 0, 8, FieldKind::Type(&types::EXPONENT))
            .constant(Constant::Scalar(Scalar::Int(-4))),
    ];
    /// Decimal price with four implied places, absent when the mantissa is null
    pub const PRICE_OPTIONAL: CompositeDescriptor =
        CompositeDescriptor::new("PriceOptional", PRICE_OPTIONAL_FIELDS);

    /// Index of `mantissa`
    pub const MANTISSA: usize = require_field(PRICE_OPTIONAL_FIELDS, "mantissa");
    /// Index of `exponent`
    pub const EXPONENT: usize = require_field(PRICE_OPTIONAL_FIELDS, "exponent");
}

const MATCH_EVENT_CHOICES: &[Choice] = &[
    Choice::new("LastTradeMsg", 0),
    Choice::new("LastVolumeMsg", 1),
    Choice::new("LastQuoteMsg", 2),
    Choice::new("LastStatsMsg", 3),
    Choice::new("LastImpliedMsg", 4),
    Choice::new("RecoveryMsg", 5),
    Choice::new("Reserved", 6),
    Choice::new("EndOfEvent", 7),
];

/// `MatchEventIndicator` set descriptor
pub const MATCH_EVENT_INDICATOR: SetDescriptor =
    SetDescriptor::new("MatchEventIndicator", PrimitiveType::UInt8, MATCH_EVENT_CHOICES);

/// Flags closing a matching event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchEventIndicator(BitSet);

impl Default for MatchEventIndicator {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! choices {
    ($($bit:literal => $get:ident, $with:ident;)*) => {
        impl MatchEventIndicator {
            $(
                #[doc = concat!("Whether bit ", stringify!($bit), " is set")]
                #[inline]
                pub const fn $get(&self) -> bool {
                    self.0.is_set($bit)
                }

                #[doc = concat!("Assign bit ", stringify!($bit))]
                #[inline]
                pub const fn $with(self, value: bool) -> Self {
                    Self(self.0.assign($bit, value))
                }
            )*
        }
    };
}

choices! {
    0 => last_trade_msg, with_last_trade_msg;
    1 => last_volume_msg, with_last_volume_msg;
    2 => last_quote_msg, with_last_quote_msg;
    3 => last_stats_msg, with_last_stats_msg;
    4 => last_implied_msg, with_last_implied_msg;
    5 => recovery_msg, with_recovery_msg;
    6 => reserved, with_reserved;
    7 => end_of_event, with_end_of_event;
}

impl MatchEventIndicator {
    /// No flags set
    #[inline]
    pub const fn new() -> Self {
        Self(BitSet::new(PrimitiveType::UInt8))
    }

    /// Raw encoded byte
    #[inline]
    pub const fn raw(&self) -> u8 {
        self.0.bits() as u8
    }
}

impl ChoiceSet for MatchEventIndicator {
    #[inline]
    fn from_set(set: BitSet) -> Self {
        Self(set)
    }

    #[inline]
    fn to_set(&self) -> BitSet {
        self.0
    }
}

const MD_ENTRY_TYPE_VALUES: &[ValidValue] = &[
    ValidValue::new("BID", b'0' as u64),
    ValidValue::new("OFFER", b'1' as u64),
    ValidValue::new("TRADE", b'2' as u64),
    ValidValue::new("OPENING_PRICE", b'4' as u64),
    ValidValue::new("SETTLEMENT_PRICE", b'6' as u64),
    ValidValue::new("IMPLIED_BID", b'E' as u64).since(2),
    ValidValue::new("IMPLIED_OFFER", b'F' as u64).since(2),
    ValidValue::new("EMPTY_BOOK", b'J' as u64),
];

/// `MDEntryType` enum descriptor
pub const MD_ENTRY_TYPE: EnumDescriptor =
    EnumDescriptor::new("MDEntryType", PrimitiveType::Char, MD_ENTRY_TYPE_VALUES);

/// Kind of market data entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MdEntryType {
    /// Bid
    Bid,
    /// Offer
    Offer,
    /// Trade
    Trade,
    /// Opening price
    OpeningPrice,
    /// Settlement price
    SettlementPrice,
    /// Implied bid
    ImpliedBid,
    /// Implied offer
    ImpliedOffer,
    /// Empty book
    EmptyBook,
    /// Null value
    NullVal,
    /// Value not declared by this schema version
    Unknown(u8),
}

impl SbeEnum for MdEntryType {
    fn from_raw(raw: u64) -> Self {
        match raw as u8 {
            b'0' => Self::Bid,
            b'1' => Self::Offer,
            b'2' => Self::Trade,
            b'4' => Self::OpeningPrice,
            b'6' => Self::SettlementPrice,
            b'E' => Self::ImpliedBid,
            b'F' => Self::ImpliedOffer,
            b'J' => Self::EmptyBook,
            0 => Self::NullVal,
            other => Self::Unknown(other),
        }
    }

    fn raw(self) -> u64 {
        let raw = match self {
            Self::Bid => b'0',
            Self::Offer => b'1',
            Self::Trade => b'2',
            Self::OpeningPrice => b'4',
            Self::SettlementPrice => b'6',
            Self::ImpliedBid => b'E',
            Self::ImpliedOffer => b'F',
            Self::EmptyBook => b'J',
            Self::NullVal => 0,
            Self::Unknown(raw) => raw,
        };
        raw as u64
    }
}

impl fmt::Display for MdEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullVal => f.write_str("NULL_VAL"),
            Self::Unknown(raw) => write!(f, "UNKNOWN({raw})"),
            known => f.write_str(MD_ENTRY_TYPE.name_of(known.raw()).unwrap_or("UNKNOWN")),
        }
    }
}

impl FromStr for MdEntryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "NULL_VAL" {
            return Ok(Self::NullVal);
        }
        MD_ENTRY_TYPE
            .value_of(s)
            .map(Self::from_raw)
            .ok_or(Error::UnknownEnumName {
                enumeration: MD_ENTRY_TYPE.name,
            })
    }
}

fn optional<B: AsRef<[u8]>, P: Primitive>(field: ScalarField<'_, B, P>) -> Result<Option<P>> {
    if field.present()? {
        field.value().map(Some)
    } else {
        Ok(None)
    }
}

fn set_optional<B, P>(mut field: ScalarField<'_, B, P>, value: Option<P>) -> Result<()>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
    P: Primitive,
{
    match value {
        Some(value) => field.set_value(value),
        None => field.reset(),
    }
}

macro_rules! message_wrapper {
    ($name:ident, $descriptor:ident) => {
        impl<B> $name<B> {
            /// Message descriptor
            pub const DESCRIPTOR: &'static MessageDescriptor = &$descriptor;

            /// Dynamic view of the message
            #[inline]
            pub fn into_message(self) -> Message<B> {
                self.0
            }
        }

        impl<B: AsRef<[u8]>> $name<B> {
            /// Read the message header at `offset` and wrap the body after it
            pub fn decode(buf: B, offset: usize, length: usize) -> Result<Self> {
                Message::decode_with_header(buf, offset, length, &$descriptor).map(Self)
            }

            /// Wrap a body whose header was already read
            pub fn wrap_for_decode(
                buf: B,
                offset: usize,
                length: usize,
                acting_block_length: usize,
                acting_version: u16,
            ) -> Result<Self> {
                Message::wrap_for_decode(
                    buf,
                    offset,
                    length,
                    acting_block_length,
                    acting_version,
                    &$descriptor,
                )
                .map(Self)
            }
        }

        impl<B: AsRef<[u8]> + AsMut<[u8]>> $name<B> {
            /// Write the message header at `offset` and wrap the body after it
            pub fn encode(buf: B, offset: usize, length: usize) -> Result<Self> {
                Message::wrap_and_apply_header(buf, offset, length, &$descriptor).map(Self)
            }

            /// Wrap `buf` to encode the body at `offset`, without a header
            pub fn wrap_for_encode(buf: B, offset: usize, length: usize) -> Result<Self> {
                Message::wrap_for_encode(buf, offset, length, &$descriptor).map(Self)
            }
        }

        impl<B> Deref for $name<B> {
            type Target = Message<B>;

            #[inline]
            fn deref(&self) -> &Message<B> {
                &self.0
            }
        }

        impl<B> DerefMut for $name<B> {
            #[inline]
            fn deref_mut(&mut self) -> &mut Message<B> {
                &mut self.0
            }
        }
    };
}

/// `IncrementalRefresh_EmptyBook` (template 9)
pub mod empty_book {
    use super::*;

    /// Fields in wire order
    pub const FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("securityID", 48, 0, FieldKind::Type(&types::SECURITY_ID)),
        FieldDescriptor::new("matchEventIndicator", 5799, 8, FieldKind::Set(&super::MATCH_EVENT_INDICATOR)),
        FieldDescriptor::new("tradeDate", 75, 10, FieldKind::Type(&types::LOCAL_MKT_DATE)).optional(),
        FieldDescriptor::new("rptSeq", 83, 12, FieldKind::Type(&types::SEQ_NUM))
            .optional()
            .since(2),
    ];

    /// Index of `securityID`
    pub const SECURITY_ID: usize = require_field(FIELDS, "securityID");
    /// Index of `matchEventIndicator`
    pub const MATCH_EVENT_INDICATOR: usize = require_field(FIELDS, "matchEventIndicator");
    /// Index of `tradeDate`
    pub const TRADE_DATE: usize = require_field(FIELDS, "tradeDate");
    /// Index of `rptSeq`
    pub const RPT_SEQ: usize = require_field(FIELDS, "rptSeq");

    /// Message descriptor
    pub const DESCRIPTOR: MessageDescriptor = MessageDescriptor {
        name: "IncrementalRefresh_EmptyBook",
        id: 9,
        block_length: 16,
        fields: FIELDS,
        schema: &SCHEMA,
    };
}

/// Book of one instrument was emptied
#[derive(Debug)]
pub struct IncrementalRefreshEmptyBook<B>(Message<B>);

message_wrapper!(IncrementalRefreshEmptyBook, EMPTY_BOOK);
use empty_book::DESCRIPTOR as EMPTY_BOOK;

impl<B: AsRef<[u8]>> IncrementalRefreshEmptyBook<B> {
    /// Instrument id
    pub fn security_id(&mut self) -> Result<u64> {
        let field = &empty_book::FIELDS[empty_book::SECURITY_ID];
        self.accessor(field).into_scalar::<u64>().value()
    }

    /// Event flags
    pub fn match_event_indicator(&mut self) -> Result<MatchEventIndicator> {
        let field = &empty_book::FIELDS[empty_book::MATCH_EVENT_INDICATOR];
        self.accessor(field).into_set::<MatchEventIndicator>().value()
    }

    /// Trade date, if sent
    pub fn trade_date(&mut self) -> Result<Option<u16>> {
        let field = &empty_book::FIELDS[empty_book::TRADE_DATE];
        optional(self.accessor(field).into_scalar::<u16>())
    }

    /// Sequence number, absent before version 2
    pub fn rpt_seq(&mut self) -> Result<Option<u32>> {
        let field = &empty_book::FIELDS[empty_book::RPT_SEQ];
        optional(self.accessor(field).into_scalar::<u32>())
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> IncrementalRefreshEmptyBook<B> {
    /// Set the instrument id
    pub fn set_security_id(&mut self, value: u64) -> Result<&mut Self> {
        let field = &empty_book::FIELDS[empty_book::SECURITY_ID];
        self.accessor(field).into_scalar::<u64>().set_value(value)?;
        Ok(self)
    }

    /// Set the event flags
    pub fn set_match_event_indicator(&mut self, value: MatchEventIndicator) -> Result<&mut Self> {
        let field = &empty_book::FIELDS[empty_book::MATCH_EVENT_INDICATOR];
        self.accessor(field).into_set().set_value(value)?;
        Ok(self)
    }

    /// Set or clear the trade date
    pub fn set_trade_date(&mut self, value: Option<u16>) -> Result<&mut Self> {
        let field = &empty_book::FIELDS[empty_book::TRADE_DATE];
        set_optional(self.accessor(field).into_scalar::<u16>(), value)?;
        Ok(self)
    }

    /// Set or clear the sequence number
    pub fn set_rpt_seq(&mut self, value: Option<u32>) -> Result<&mut Self> {
        let field = &empty_book::FIELDS[empty_book::RPT_SEQ];
        set_optional(self.accessor(field).into_scalar::<u32>(), value)?;
        Ok(self)
    }
}

/// `SnapshotFullRefresh_Orders` (template 71)
pub mod snapshot_orders {
    use super::*;

    /// Fields of one `noMDEntries` element
    pub const ENTRY_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("mDEntryPx", 270, 0, FieldKind::Composite(&composites::PRICE_OPTIONAL))
            .optional(),
        FieldDescriptor::new("mDEntrySize", 271, 8, FieldKind::Type(&types::QUANTITY)),
        FieldDescriptor::new("orderID", 37, 16, FieldKind::Type(&types::ORDER_ID)).optional(),
        FieldDescriptor::new("mDEntryType", 269, 24, FieldKind::Enum(&super::MD_ENTRY_TYPE)),
        FieldDescriptor::new("enteringFirm", 1003, 25, FieldKind::Type(&types::FIRM)).optional(),
        FieldDescriptor::new("mDEntryPositionNo", 290, 29, FieldKind::Type(&types::UINT32))
            .optional()
            .since(2),
    ];

    /// `noMDEntries` group descriptor
    pub const NO_MD_ENTRIES_GROUP: GroupDescriptor = GroupDescriptor::new(
        "noMDEntries",
        &composites::GROUP_SIZE_ENCODING,
        33,
        ENTRY_FIELDS,
    );

    /// `memo` data descriptor
    pub const MEMO_DATA: DataDescriptor = DataDescriptor::new("Memo", &composites::VAR_STRING8);

    /// Fields in wire order
    pub const FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("securityID", 48, 0, FieldKind::Type(&types::SECURITY_ID)),
        FieldDescriptor::new("lastRptSeq", 83, 8, FieldKind::Type(&types::SEQ_NUM)).optional(),
        FieldDescriptor::new("symbol", 55, 12, FieldKind::Type(&types::SYMBOL)).optional(),
        FieldDescriptor::new("priceBand", 1148, 20, FieldKind::Type(&types::PRICE_BAND)),
        FieldDescriptor::new("securityExchange", 207, 28, FieldKind::Type(&types::SECURITY_EXCHANGE))
            .constant(Constant::Text("BVMF")),
        FieldDescriptor::new("noMDEntries", 268, 0, FieldKind::Group(&NO_MD_ENTRIES_GROUP)),
        FieldDescriptor::new("memo", 5149, 0, FieldKind::Data(&MEMO_DATA)),
    ];

    /// Index of `securityID`
    pub const SECURITY_ID: usize = require_field(FIELDS, "securityID");
    /// Index of `lastRptSeq`
    pub const LAST_RPT_SEQ: usize = require_field(FIELDS, "lastRptSeq");
    /// Index of `symbol`
    pub const SYMBOL: usize = require_field(FIELDS, "symbol");
    /// Index of `priceBand`
    pub const PRICE_BAND: usize = require_field(FIELDS, "priceBand");
    /// Index of `securityExchange`
    pub const SECURITY_EXCHANGE: usize = require_field(FIELDS, "securityExchange");
    /// Index of `noMDEntries`
    pub const NO_MD_ENTRIES: usize = require_field(FIELDS, "noMDEntries");
    /// Index of `memo`
    pub const MEMO: usize = require_field(FIELDS, "memo");

    /// Index of `mDEntryPx`
    pub const MD_ENTRY_PX: usize = require_field(ENTRY_FIELDS, "mDEntryPx");
    /// Index of `mDEntrySize`
    pub const MD_ENTRY_SIZE: usize = require_field(ENTRY_FIELDS, "mDEntrySize");
    /// Index of `orderID`
    pub const ORDER_ID: usize = require_field(ENTRY_FIELDS, "orderID");
    /// Index of `mDEntryType`
    pub const MD_ENTRY_TYPE: usize = require_field(ENTRY_FIELDS, "mDEntryType");
    /// Index of `enteringFirm`
    pub const ENTERING_FIRM: usize = require_field(ENTRY_FIELDS, "enteringFirm");
    /// Index of `mDEntryPositionNo`
    pub const MD_ENTRY_POSITION_NO: usize = require_field(ENTRY_FIELDS, "mDEntryPositionNo");

    /// Message descriptor
    pub const DESCRIPTOR: MessageDescriptor = MessageDescriptor {
        name: "SnapshotFullRefresh_Orders_MBO",
        id: 71,
        block_length: 28,
        fields: FIELDS,
        schema: &SCHEMA,
    };
}

/// Full order book snapshot of one instrument
#[derive(Debug)]
pub struct SnapshotFullRefreshOrders<B>(Message<B>);

message_wrapper!(SnapshotFullRefreshOrders, SNAPSHOT_ORDERS);
use snapshot_orders::DESCRIPTOR as SNAPSHOT_ORDERS;

impl<B: AsRef<[u8]>> SnapshotFullRefreshOrders<B> {
    /// Instrument id
    pub fn security_id(&mut self) -> Result<u64> {
        let field = &snapshot_orders::FIELDS[snapshot_orders::SECURITY_ID];
        self.accessor(field).into_scalar::<u64>().value()
    }

    /// Last incremental sequence number applied, if any
    pub fn last_rpt_seq(&mut self) -> Result<Option<u32>> {
        let field = &snapshot_orders::FIELDS[snapshot_orders::LAST_RPT_SEQ];
        optional(self.accessor(field).into_scalar::<u32>())
    }

    /// Ticker, without NUL padding
    pub fn symbol(&mut self) -> Result<&str> {
        let field = &snapshot_orders::FIELDS[snapshot_orders::SYMBOL];
        self.accessor(field).into_text().value_str()
    }

    /// Low and high price limits
    pub fn price_band(&mut self) -> Result<[i32; 2]> {
        let field = &snapshot_orders::FIELDS[snapshot_orders::PRICE_BAND];
        let band = self.accessor(field).into_array::<i32>();
        Ok([band.get(0)?, band.get(1)?])
    }

    /// Exchange code, a schema constant
    pub fn security_exchange(&mut self) -> Result<&str> {
        let field = &snapshot_orders::FIELDS[snapshot_orders::SECURITY_EXCHANGE];
        self.accessor(field).into_text().value_str()
    }

    /// Order entries, read from the running position
    ///
    /// Must be visited before [`memo`](Self::memo), once per wrap or rewind.
    pub fn no_md_entries(&mut self) -> Result<NoMdEntries<'_, B>> {
        let field = &snapshot_orders::FIELDS[snapshot_orders::NO_MD_ENTRIES];
        self.accessor(field).into_group().map(NoMdEntries)
    }

    /// Free text following the entries
    pub fn memo(&mut self) -> Result<&[u8]> {
        let field = &snapshot_orders::FIELDS[snapshot_orders::MEMO];
        self.accessor(field).into_data()?.value()
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> SnapshotFullRefreshOrders<B> {
    /// Set the instrument id
    pub fn set_security_id(&mut self, value: u64) -> Result<&mut Self> {
        let field = &snapshot_orders::FIELDS[snapshot_orders::SECURITY_ID];
        self.accessor(field).into_scalar::<u64>().set_value(value)?;
        Ok(self)
    }

    /// Set or clear the last sequence number
    pub fn set_last_rpt_seq(&mut self, value: Option<u32>) -> Result<&mut Self> {
        let field = &snapshot_orders::FIELDS[snapshot_orders::LAST_RPT_SEQ];
        set_optional(self.accessor(field).into_scalar::<u32>(), value)?;
        Ok(self)
    }

    /// Set the ticker; shorter values are NUL padded
    pub fn set_symbol(&mut self, value: &str) -> Result<&mut Self> {
        let field = &snapshot_orders::FIELDS[snapshot_orders::SYMBOL];
        self.accessor(field).into_text().set_str(value)?;
        Ok(self)
    }

    /// Set the price limits
    pub fn set_price_band(&mut self, value: [i32; 2]) -> Result<&mut Self> {
        let field = &snapshot_orders::FIELDS[snapshot_orders::PRICE_BAND];
        self.accessor(field).into_array::<i32>().set_value(&value)?;
        Ok(self)
    }

    /// Write the entries count, then fill each element after `next`
    pub fn no_md_entries_count(&mut self, count: usize) -> Result<NoMdEntries<'_, B>> {
        let mut entries = self.no_md_entries()?;
        entries.reset_count(count)?;
        Ok(entries)
    }

    /// Write the memo after the entries
    pub fn set_memo(&mut self, value: &str) -> Result<&mut Self> {
        let field = &snapshot_orders::FIELDS[snapshot_orders::MEMO];
        self.accessor(field).into_data()?.set_str(value)?;
        Ok(self)
    }
}

/// Elements of `noMDEntries`
#[derive(Debug)]
pub struct NoMdEntries<'a, B>(Group<'a, B>);

impl<'a, B> NoMdEntries<'a, B> {
    /// Move to the next element
    pub fn next(&mut self) -> Result<&mut Self> {
        self.0.next()?;
        Ok(self)
    }
}

impl<'a, B: AsRef<[u8]>> NoMdEntries<'a, B> {
    /// Entry price
    pub fn md_entry_px(&mut self) -> Result<PriceOptional<'_, B>> {
        let field = &snapshot_orders::ENTRY_FIELDS[snapshot_orders::MD_ENTRY_PX];
        self.0.accessor(field)?.into_composite().map(PriceOptional)
    }

    /// Entry size
    pub fn md_entry_size(&mut self) -> Result<i64> {
        let field = &snapshot_orders::ENTRY_FIELDS[snapshot_orders::MD_ENTRY_SIZE];
        self.0.accessor(field)?.into_scalar::<i64>().value()
    }

    /// Order id, if sent
    pub fn order_id(&mut self) -> Result<Option<u64>> {
        let field = &snapshot_orders::ENTRY_FIELDS[snapshot_orders::ORDER_ID];
        optional(self.0.accessor(field)?.into_scalar::<u64>())
    }

    /// Entry kind
    pub fn md_entry_type(&mut self) -> Result<MdEntryType> {
        let field = &snapshot_orders::ENTRY_FIELDS[snapshot_orders::MD_ENTRY_TYPE];
        self.0.accessor(field)?.into_enum::<MdEntryType>().value()
    }

    /// Broker of the order, if sent
    pub fn entering_firm(&mut self) -> Result<Option<u32>> {
        let field = &snapshot_orders::ENTRY_FIELDS[snapshot_orders::ENTERING_FIRM];
        optional(self.0.accessor(field)?.into_scalar::<u32>())
    }

    /// Queue position, absent before version 2
    pub fn md_entry_position_no(&mut self) -> Result<Option<u32>> {
        let field = &snapshot_orders::ENTRY_FIELDS[snapshot_orders::MD_ENTRY_POSITION_NO];
        optional(self.0.accessor(field)?.into_scalar::<u32>())
    }
}

impl<'a, B: AsRef<[u8]> + AsMut<[u8]>> NoMdEntries<'a, B> {
    /// Set the entry size
    pub fn set_md_entry_size(&mut self, value: i64) -> Result<&mut Self> {
        let field = &snapshot_orders::ENTRY_FIELDS[snapshot_orders::MD_ENTRY_SIZE];
        self.0.accessor(field)?.into_scalar::<i64>().set_value(value)?;
        Ok(self)
    }

    /// Set or clear the order id
    pub fn set_order_id(&mut self, value: Option<u64>) -> Result<&mut Self> {
        let field = &snapshot_orders::ENTRY_FIELDS[snapshot_orders::ORDER_ID];
        set_optional(self.0.accessor(field)?.into_scalar::<u64>(), value)?;
        Ok(self)
    }

    /// Set the entry kind
    pub fn set_md_entry_type(&mut self, value: MdEntryType) -> Result<&mut Self> {
        let field = &snapshot_orders::ENTRY_FIELDS[snapshot_orders::MD_ENTRY_TYPE];
        self.0.accessor(field)?.into_enum().set_value(value)?;
        Ok(self)
    }

    /// Set or clear the broker
    pub fn set_entering_firm(&mut self, value: Option<u32>) -> Result<&mut Self> {
        let field = &snapshot_orders::ENTRY_FIELDS[snapshot_orders::ENTERING_FIRM];
        set_optional(self.0.accessor(field)?.into_scalar::<u32>(), value)?;
        Ok(self)
    }

    /// Set or clear the queue position
    pub fn set_md_entry_position_no(&mut self, value: Option<u32>) -> Result<&mut Self> {
        let field = &snapshot_orders::ENTRY_FIELDS[snapshot_orders::MD_ENTRY_POSITION_NO];
        set_optional(self.0.accessor(field)?.into_scalar::<u32>(), value)?;
        Ok(self)
    }
}

impl<'a, B> Deref for NoMdEntries<'a, B> {
    type Target = Group<'a, B>;

    #[inline]
    fn deref(&self) -> &Group<'a, B> {
        &self.0
    }
}

impl<'a, B> DerefMut for NoMdEntries<'a, B> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Group<'a, B> {
        &mut self.0
    }
}

/// Decimal price with a constant exponent of -4
#[derive(Debug)]
pub struct PriceOptional<'a, B>(Composite<'a, B>);

impl<'a, B: AsRef<[u8]>> PriceOptional<'a, B> {
    /// Mantissa, absent when null
    pub fn mantissa(&mut self) -> Result<Option<i64>> {
        let field = &composites::PRICE_OPTIONAL_FIELDS[composites::MANTISSA];
        optional(self.0.accessor(field).into_scalar::<i64>())
    }

    /// Exponent
    pub fn exponent(&mut self) -> Result<i8> {
        let field = &composites::PRICE_OPTIONAL_FIELDS[composites::EXPONENT];
        self.0.accessor(field).into_scalar::<i8>().value()
    }
}

impl<'a, B: AsRef<[u8]> + AsMut<[u8]>> PriceOptional<'a, B> {
    /// Set or clear the mantissa
    pub fn set_mantissa(&mut self, value: Option<i64>) -> Result<&mut Self> {
        let field = &composites::PRICE_OPTIONAL_FIELDS[composites::MANTISSA];
        set_optional(self.0.accessor(field).into_scalar::<i64>(), value)?;
        Ok(self)
    }
}

impl<'a, B> Deref for PriceOptional<'a, B> {
    type Target = Composite<'a, B>;

    #[inline]
    fn deref(&self) -> &Composite<'a, B> {
        &self.0
    }
}

impl<'a, B> DerefMut for PriceOptional<'a, B> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Composite<'a, B> {
        &mut self.0
    }
}

/// Every message of the schema
pub const MESSAGES: &[&MessageDescriptor] = &[&EMPTY_BOOK, &SNAPSHOT_ORDERS];

/// Descriptor of the message with `template_id`
pub fn descriptor_for(template_id: u16) -> Option<&'static MessageDescriptor> {
    MESSAGES.iter().copied().find(|m| m.id == template_id)
}
