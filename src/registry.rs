//! Known contract events
//!
//! The set of events is fixed by the deployed marketplace and lottery contracts.
//! Supporting a new event means adding a table entry here.

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::error::{Result, TxWatcherError};
use crate::types::{EventDefinition, EventFieldDefinition as Field, FieldType::*};

pub const AUCTION_TOKEN_EVENT: EventDefinition = EventDefinition {
    identifier: "auction_token_event",
    fields: &[
        Field::indexed("auction_token_id", String),
        Field::indexed("auctioned_token_nonce", U64),
        Field::indexed("auction_id", U64),
        Field::indexed("auctioned_token_amount", BigUint),
        Field::indexed("seller", Address),
        Field::indexed("min_bid", BigUint),
        Field::indexed("max_bid", BigUint),
        Field::indexed("start_time", U64),
        Field::indexed("deadline", U64),
        Field::indexed("accepted_payment_token", String),
        Field::indexed("accepted_payment_token_nonce", U64),
        Field::indexed("auction_type", U8),
        Field::data("creator_royalties_percentage", BigUint),
    ],
};

pub const BID_EVENT: EventDefinition = EventDefinition {
    identifier: "bid_event",
    fields: &[
        Field::indexed("auction_token_id", String),
        Field::indexed("auctioned_token_nonce", U64),
        Field::indexed("auction_id", U64),
        Field::indexed("nr_auctioned_tokens", BigUint),
        Field::indexed("bidder", Address),
        Field::indexed("bid_amount", BigUint),
    ],
};

pub const END_AUCTION_EVENT: EventDefinition = EventDefinition {
    identifier: "end_auction_event",
    fields: &[
        Field::indexed("auction_token_id", String),
        Field::indexed("auctioned_token_nonce", U64),
        Field::indexed("auction_id", U64),
        Field::indexed("nr_auctioned_tokens", BigUint),
        Field::indexed("auction_winner", Address),
        Field::indexed("winning_bid_amount", BigUint),
    ],
};

pub const BUY_SFT_EVENT: EventDefinition = EventDefinition {
    identifier: "buy_sft_event",
    fields: &[
        Field::indexed("auction_token_id", String),
        Field::indexed("auctioned_token_nonce", U64),
        Field::indexed("auction_id", U64),
        Field::indexed("nr_bought_tokens", BigUint),
        Field::indexed("buyer", Address),
        Field::indexed("bid_sft_amount", BigUint),
    ],
};

pub const WITHDRAW_EVENT: EventDefinition = EventDefinition {
    identifier: "withdraw_event",
    fields: &[
        Field::indexed("auction_token_id", String),
        Field::indexed("auctioned_token_nonce", U64),
        Field::indexed("auction_id", U64),
        Field::indexed("nr_auctioned_tokens", BigUint),
        Field::indexed("seller", Address),
    ],
};

pub const OFFER_TOKEN_EVENT: EventDefinition = EventDefinition {
    identifier: "offer_token_event",
    fields: &[
        Field::indexed("offer_token_id", String),
        Field::indexed("offer_token_nonce", U64),
        Field::indexed("offer_id", U64),
        Field::indexed("offer_token_amount", BigUint),
        Field::indexed("offerer", Address),
        Field::indexed("payment_token", String),
        Field::indexed("payment_token_nonce", U64),
        Field::indexed("payment_amount", BigUint),
        Field::indexed("deadline", U64),
    ],
};

pub const WITHDRAW_OFFER_TOKEN_EVENT: EventDefinition = EventDefinition {
    identifier: "withdraw_offer_token_event",
    fields: &[
        Field::indexed("offer_token_id", String),
        Field::indexed("offer_token_nonce", U64),
        Field::indexed("offer_id", U64),
        Field::indexed("offerer", Address),
    ],
};

pub const ACCEPT_OFFER_TOKEN_EVENT: EventDefinition = EventDefinition {
    identifier: "accept_offer_token_event",
    fields: &[
        Field::indexed("offer_token_id", String),
        Field::indexed("offer_token_nonce", U64),
        Field::indexed("offer_id", U64),
        Field::indexed("offer_token_amount", BigUint),
        Field::indexed("offerer", Address),
        Field::indexed("seller", Address),
        Field::indexed("payment_amount", BigUint),
    ],
};

pub const LOTTERY_CREATED: EventDefinition = EventDefinition {
    identifier: "lotteryCreated",
    fields: &[
        Field::indexed("lottery_id", U64),
        Field::indexed("creator", Address),
        Field::indexed("prize_token_id", String),
        Field::indexed("prize_token_nonce", U64),
        Field::indexed("ticket_token_id", String),
        Field::indexed("ticket_price", BigUint),
        Field::indexed("max_tickets", U64),
        Field::indexed("deadline", U64),
        Field::indexed("is_burnable", Boolean),
    ],
};

pub const LOTTERY_DRAWN: EventDefinition = EventDefinition {
    identifier: "lotteryDrawn",
    fields: &[
        Field::indexed("lottery_id", U64),
        Field::indexed("winner", Address),
        Field::indexed("winning_ticket", U64),
        Field::indexed("tickets_sold", U64),
    ],
};

pub static MARKETPLACE_EVENTS: &[EventDefinition] = &[
    AUCTION_TOKEN_EVENT,
    BID_EVENT,
    END_AUCTION_EVENT,
    BUY_SFT_EVENT,
    WITHDRAW_EVENT,
    OFFER_TOKEN_EVENT,
    WITHDRAW_OFFER_TOKEN_EVENT,
    ACCEPT_OFFER_TOKEN_EVENT,
];

pub static LOTTERY_EVENTS: &[EventDefinition] = &[LOTTERY_CREATED, LOTTERY_DRAWN];

lazy_static! {
    static ref BY_IDENTIFIER: HashMap<&'static str, &'static EventDefinition> = MARKETPLACE_EVENTS
        .iter()
        .chain(LOTTERY_EVENTS.iter())
        .map(|def| (def.identifier, def))
        .collect();
}

/// Look up a definition by event name
pub fn definition(identifier: &str) -> Option<&'static EventDefinition> {
    BY_IDENTIFIER.get(identifier).copied()
}

/// Every known definition, marketplace first
pub fn all() -> Vec<&'static EventDefinition> {
    MARKETPLACE_EVENTS.iter().chain(LOTTERY_EVENTS.iter()).collect()
}

pub fn marketplace() -> Vec<&'static EventDefinition> {
    MARKETPLACE_EVENTS.iter().collect()
}

pub fn lottery() -> Vec<&'static EventDefinition> {
    LOTTERY_EVENTS.iter().collect()
}

/// Resolve event names to definitions; an empty list selects every definition
pub fn resolve<S: AsRef<str>>(names: &[S]) -> Result<Vec<&'static EventDefinition>> {
    if names.is_empty() {
        return Ok(all());
    }
    names
        .iter()
        .map(|name| {
            definition(name.as_ref())
                .ok_or_else(|| TxWatcherError::UnknownEvent(name.as_ref().to_string()))
        })
        .collect()
}
