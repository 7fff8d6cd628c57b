//! Decoding of raw event logs against event definitions

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use num_bigint::BigUint;
use tracing::{debug, warn};

use crate::address::Address;
use crate::error::{Result, TxWatcherError};
use crate::types::{
    DecodedEvent, DecodedValue, EventDefinition, EventFieldDefinition, FieldType, RawEvent,
    TransactionResponse,
};

/// Decode one top-level encoded value
pub fn decode_value(bytes: &[u8], field_type: FieldType) -> Result<DecodedValue> {
    let value = match field_type {
        FieldType::Address => DecodedValue::Address(Address::from_bytes(bytes)?),
        FieldType::U64 => {
            if bytes.is_empty() {
                DecodedValue::U64(0)
            } else {
                let v = u64::from_str_radix(&hex::encode(bytes), 16).map_err(|e| {
                    TxWatcherError::Decoding(format!("u64 out of range ({} bytes): {}", bytes.len(), e))
                })?;
                DecodedValue::U64(v)
            }
        }
        FieldType::BigUint => DecodedValue::BigUint(BigUint::from_bytes_be(bytes)),
        FieldType::String => DecodedValue::String(String::from_utf8_lossy(bytes).into_owned()),
        FieldType::U8 => DecodedValue::U8(bytes.first().copied().unwrap_or(0)),
        FieldType::Boolean => DecodedValue::Boolean(bytes.first() == Some(&1)),
        FieldType::Raw => DecodedValue::Hex(hex::encode(bytes)),
    };
    Ok(value)
}

fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(encoded)
        .map_err(|e| TxWatcherError::Decoding(format!("invalid base64 '{}': {}", encoded, e)))
}

fn decode_field(
    definition: &EventDefinition,
    field: &EventFieldDefinition,
    encoded: &str,
) -> Option<DecodedValue> {
    match decode_base64(encoded).and_then(|bytes| decode_value(&bytes, field.field_type)) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(
                "Skipping field {}.{}: {}",
                definition.identifier, field.name, e
            );
            None
        }
    }
}

/// Offset of the first indexed field within the topics, if the definition applies
fn topic_offset(event: &RawEvent, definition: &EventDefinition) -> Option<usize> {
    if event.identifier == definition.identifier {
        return Some(0);
    }
    let first = event.topics.first()?;
    let name = BASE64.decode(first).ok()?;
    (name == definition.identifier.as_bytes()).then_some(1)
}

/// Match one raw log entry against one definition.
///
/// Indexed fields are read from consecutive topics and silently omitted when
/// the topic is missing. Only a single non-indexed field can be read from the
/// data blob; with several declared, none of them is decoded.
pub fn decode_event(event: &RawEvent, definition: &EventDefinition) -> Option<DecodedEvent> {
    let offset = topic_offset(event, definition)?;
    let mut decoded = DecodedEvent::new(definition.identifier);

    for (i, field) in definition.indexed_fields().enumerate() {
        let Some(topic) = event.topics.get(offset + i) else {
            continue;
        };
        if let Some(value) = decode_field(definition, field, topic) {
            decoded.insert(field.name, value);
        }
    }

    let data_fields: Vec<_> = definition.data_fields().collect();
    match (data_fields.as_slice(), event.data.as_deref()) {
        ([field], Some(data)) => {
            if let Some(value) = decode_field(definition, field, data) {
                decoded.insert(field.name, value);
            }
        }
        ([], _) | ([_], None) => {}
        (fields, _) => {
            debug!(
                "{} declares {} data fields, splitting the data blob is not supported",
                definition.identifier,
                fields.len()
            );
        }
    }

    Some(decoded)
}

/// Decode every log entry of a transaction against every definition
pub fn decode_transaction_events(
    response: &TransactionResponse,
    definitions: &[&EventDefinition],
) -> Vec<DecodedEvent> {
    response
        .events()
        .iter()
        .flat_map(move |event| {
            definitions
                .iter()
                .filter_map(move |definition| decode_event(event, definition))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AUCTION_TOKEN_EVENT, BID_EVENT};
    use crate::types::{EventFieldDefinition as Field, TransactionLogs, TransactionStatus};

    fn b64(bytes: &[u8]) -> String {
        BASE64.encode(bytes)
    }

    fn bidder() -> Address {
        Address::from_bytes(&[0x42; 32]).unwrap()
    }

    fn bid_topics() -> Vec<String> {
        vec![
            b64(b"FRAME-a1b2c3"),
            b64(&[0x0c]),
            b64(&[0x01, 0x00]),
            b64(&[0x01]),
            b64(bidder().as_bytes()),
            b64(&[0x0d, 0xe0, 0xb6, 0xb3, 0xa7, 0x64, 0x00, 0x00]),
        ]
    }

    #[test]
    fn test_empty_buffers() {
        assert_eq!(decode_value(&[], FieldType::U64).unwrap(), DecodedValue::U64(0));
        assert_eq!(
            decode_value(&[], FieldType::BigUint).unwrap(),
            DecodedValue::BigUint(BigUint::from(0u32))
        );
        assert_eq!(decode_value(&[], FieldType::U8).unwrap(), DecodedValue::U8(0));
        assert_eq!(decode_value(&[], FieldType::Boolean).unwrap(), DecodedValue::Boolean(false));
        assert_eq!(decode_value(&[], FieldType::String).unwrap(), DecodedValue::String(String::new()));
    }

    #[test]
    fn test_scalar_values() {
        assert_eq!(decode_value(&[0x01, 0x2c], FieldType::U64).unwrap(), DecodedValue::U64(300));
        assert_eq!(decode_value(&[0x07, 0x09], FieldType::U8).unwrap(), DecodedValue::U8(7));
        assert_eq!(decode_value(&[0x01], FieldType::Boolean).unwrap(), DecodedValue::Boolean(true));
        assert_eq!(decode_value(&[0x02], FieldType::Boolean).unwrap(), DecodedValue::Boolean(false));
        assert_eq!(decode_value(&[0xca, 0xfe], FieldType::Raw).unwrap(), DecodedValue::Hex("cafe".into()));
        assert!(decode_value(&[1u8; 9], FieldType::U64).is_err());
        assert_eq!(
            decode_value(&[0u8, 0, 0, 0, 0, 0, 0, 0, 5], FieldType::U64).unwrap(),
            DecodedValue::U64(5)
        );
    }

    #[test]
    fn test_biguint_wider_than_u64() {
        let bytes = [0x01, 0, 0, 0, 0, 0, 0, 0, 0];
        let expected = BigUint::from(u64::MAX) + BigUint::from(1u32);
        assert_eq!(decode_value(&bytes, FieldType::BigUint).unwrap(), DecodedValue::BigUint(expected));
    }

    #[test]
    fn test_address_value_roundtrip() {
        let raw = [0x5a; 32];
        let DecodedValue::Address(address) = decode_value(&raw, FieldType::Address).unwrap() else {
            panic!("expected an address");
        };
        let reparsed: Address = address.to_string().parse().unwrap();
        assert_eq!(reparsed.as_bytes(), &raw);
        assert!(decode_value(&raw[..20], FieldType::Address).is_err());
    }

    #[test]
    fn test_identifier_match_uses_all_topics() {
        let event = RawEvent {
            identifier: "bid_event".to_string(),
            topics: bid_topics(),
            ..Default::default()
        };
        let decoded = decode_event(&event, &BID_EVENT).unwrap();
        assert_eq!(decoded.identifier, "bid_event");
        assert_eq!(decoded.len(), 6);
        assert_eq!(decoded.string("auction_token_id"), Some("FRAME-a1b2c3"));
        assert_eq!(decoded.u64("auctioned_token_nonce"), Some(12));
        assert_eq!(decoded.u64("auction_id"), Some(256));
        assert_eq!(decoded.address("bidder"), Some(&bidder()));
        assert_eq!(
            decoded.biguint("bid_amount"),
            Some(&BigUint::from(1_000_000_000_000_000_000u64))
        );
    }

    #[test]
    fn test_first_topic_match_shifts_offset() {
        let mut topics = vec![b64(b"bid_event")];
        topics.extend(bid_topics());
        let event = RawEvent {
            identifier: "bid".to_string(),
            topics,
            ..Default::default()
        };
        let decoded = decode_event(&event, &BID_EVENT).unwrap();
        assert_eq!(decoded.len(), 6);
        assert_eq!(decoded.string("auction_token_id"), Some("FRAME-a1b2c3"));
        assert_eq!(decoded.u64("auction_id"), Some(256));
    }

    #[test]
    fn test_no_match() {
        let event = RawEvent {
            identifier: "bid".to_string(),
            topics: vec![b64(b"end_auction_event")],
            ..Default::default()
        };
        assert!(decode_event(&event, &BID_EVENT).is_none());

        let untopical = RawEvent {
            identifier: "bid".to_string(),
            ..Default::default()
        };
        assert!(decode_event(&untopical, &BID_EVENT).is_none());
    }

    #[test]
    fn test_missing_topics_are_omitted() {
        let event = RawEvent {
            identifier: "bid_event".to_string(),
            topics: bid_topics()[..3].to_vec(),
            ..Default::default()
        };
        let decoded = decode_event(&event, &BID_EVENT).unwrap();
        assert_eq!(decoded.len(), 3);
        assert!(decoded.get("bidder").is_none());
    }

    #[test]
    fn test_bad_topic_is_skipped() {
        let mut topics = bid_topics();
        topics[4] = b64(&[1, 2, 3]);
        topics[1] = "%%%".to_string();
        let event = RawEvent {
            identifier: "bid_event".to_string(),
            topics,
            ..Default::default()
        };
        let decoded = decode_event(&event, &BID_EVENT).unwrap();
        assert_eq!(decoded.len(), 4);
        assert!(decoded.get("bidder").is_none());
        assert!(decoded.get("auctioned_token_nonce").is_none());
    }

    #[test]
    fn test_single_data_field() {
        let event = RawEvent {
            identifier: "auction_token_event".to_string(),
            topics: vec![b64(b"FRAME-a1b2c3"), b64(&[1]), b64(&[9])],
            data: Some(b64(&[0x03, 0xe8])),
            ..Default::default()
        };
        let decoded = decode_event(&event, &AUCTION_TOKEN_EVENT).unwrap();
        assert_eq!(decoded.u64("auction_id"), Some(9));
        assert_eq!(
            decoded.biguint("creator_royalties_percentage"),
            Some(&BigUint::from(1000u32))
        );
    }

    #[test]
    fn test_absent_data_omits_data_field() {
        let event = RawEvent {
            identifier: "auction_token_event".to_string(),
            topics: vec![b64(b"FRAME-a1b2c3"), b64(&[1]), b64(&[9])],
            data: None,
            ..Default::default()
        };
        let decoded = decode_event(&event, &AUCTION_TOKEN_EVENT).unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded.u64("auction_id"), Some(9));
        assert!(decoded.get("creator_royalties_percentage").is_none());
    }

    #[test]
    fn test_invalid_utf8_string_is_lossy() {
        let decoded = decode_value(&[b'F', 0xff, b'X'], FieldType::String).unwrap();
        assert_eq!(decoded, DecodedValue::String("F\u{fffd}X".to_string()));
    }

    #[test]
    fn test_several_data_fields_are_not_decoded() {
        const FIELDS: &[Field] = &[
            Field::indexed("id", FieldType::U64),
            Field::data("price", FieldType::BigUint),
            Field::data("note", FieldType::String),
        ];
        const SPLIT: EventDefinition = EventDefinition {
            identifier: "split_event",
            fields: FIELDS,
        };
        let event = RawEvent {
            identifier: "split_event".to_string(),
            topics: vec![b64(&[4])],
            data: Some(b64(b"whatever")),
            ..Default::default()
        };
        let decoded = decode_event(&event, &SPLIT).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.u64("id"), Some(4));
    }

    #[test]
    fn test_transaction_events() {
        let response = TransactionResponse {
            tx_hash: None,
            status: TransactionStatus::Success,
            logs: Some(TransactionLogs {
                events: vec![
                    RawEvent {
                        identifier: "ESDTNFTTransfer".to_string(),
                        topics: vec![b64(b"FRAME-a1b2c3")],
                        ..Default::default()
                    },
                    RawEvent {
                        identifier: "bid".to_string(),
                        topics: std::iter::once(b64(b"bid_event")).chain(bid_topics()).collect(),
                        ..Default::default()
                    },
                ],
            }),
        };
        let decoded = decode_transaction_events(&response, &[&AUCTION_TOKEN_EVENT, &BID_EVENT]);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].identifier, "bid_event");
    }
}
